//! Identity, session and authorization layer.
//!
//! # Responsibility
//! - Authenticate username+password against both account collections.
//! - Issue and verify signed, time-limited session tokens.
//! - Gate operations on an explicit role allow-list.
//!
//! # Invariants
//! - Missing account, wrong password and bad stored hash are one
//!   undifferentiated `InvalidCredentials`.
//! - Bad signature, malformed payload and expiry are one `InvalidSession`.
//! - Authorization runs only after successful authentication.

pub mod authorize;
pub mod identity;
pub mod password;
pub mod session;

use crate::model::account::Role;
use crate::repo::RepoError;
use crate::service::error::ErrorKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

/// Identity/session layer error.
#[derive(Debug)]
pub enum AuthError {
    /// Username/password did not match any account.
    InvalidCredentials,
    /// Token signature, payload or expiry check failed.
    InvalidSession,
    /// Caller role is not in the operation's allow-list.
    Forbidden {
        role: Role,
        allowed: &'static [Role],
    },
    /// Session/hasher setup rejected.
    InvalidConfig(String),
    /// Token encoding failed.
    TokenIssue(String),
    /// Persistence-layer failure during credential lookup.
    Repo(RepoError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials | Self::InvalidSession => ErrorKind::Unauthenticated,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidConfig(_) | Self::TokenIssue(_) => ErrorKind::Internal,
            Self::Repo(_) => ErrorKind::StorageUnavailable,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::InvalidSession => write!(f, "invalid or expired session"),
            Self::Forbidden { role, allowed } => {
                let allowed = allowed
                    .iter()
                    .map(|role| role.as_str())
                    .collect::<Vec<_>>()
                    .join("|");
                write!(f, "role `{role}` is not allowed; expected {allowed}")
            }
            Self::InvalidConfig(message) => write!(f, "invalid auth configuration: {message}"),
            Self::TokenIssue(message) => write!(f, "session token issue failed: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
