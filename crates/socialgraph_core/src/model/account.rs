//! Account domain model.
//!
//! # Responsibility
//! - Model users and admins as one account shape tagged by `Role`.
//! - Separate the credential-bearing record from its public projection.
//!
//! # Invariants
//! - `id` and `username` are unique within one role's collection only.
//! - `password_hash` never leaves the crate through a public read model.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for user and admin accounts.
///
/// Users and admins draw from the same id space but live in separate
/// collections, so an id alone does not tell the two apart.
pub type AccountId = Uuid;

/// Immutable account classification controlling operation access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary member of the social graph.
    User,
    /// Operator account; never a follow or post endpoint.
    Admin,
}

impl Role {
    /// Stable string id used in tokens, logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Backing table for this role's collection.
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Admin => "admins",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full account record including the stored password hash.
///
/// Only the credential store and the identity layer see this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub role: Role,
    pub username: String,
    pub email: String,
    /// PHC-format one-way hash.
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Account {
    /// Drops credential material, yielding the public projection.
    pub fn into_public(self) -> AccountPublic {
        AccountPublic {
            id: self.id,
            role: self.role,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Public account projection returned by every read operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPublic {
    pub id: AccountId,
    pub role: Role,
    pub username: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Compact user projection used by follower/following listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: AccountId,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::{Account, Role};
    use uuid::Uuid;

    #[test]
    fn into_public_strips_password_hash() {
        let account = Account {
            id: Uuid::new_v4(),
            role: Role::Admin,
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: 42,
        };

        let public = account.clone().into_public();
        assert_eq!(public.id, account.id);
        assert_eq!(public.role, Role::Admin);
        let json = serde_json::to_string(&public).expect("serialize public account");
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"admin\""));
    }

    #[test]
    fn roles_map_to_disjoint_tables() {
        assert_eq!(Role::User.table(), "users");
        assert_eq!(Role::Admin.table(), "admins");
        assert_eq!(Role::User.to_string(), "user");
    }
}
