//! Credential authentication across both account collections.
//!
//! # Invariants
//! - Lookup order is users first, then admins; the first collection holding
//!   the username decides the outcome, even if the password would match the
//!   other collection's account.
//! - Callers never learn whether the username or the password was wrong.

use crate::auth::password::CredentialHasher;
use crate::auth::{AuthError, AuthResult};
use crate::model::account::{AccountId, Role};
use crate::repo::account_repo::AccountRepository;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Collections searched by `authenticate`, in order.
pub const LOOKUP_ORDER: [Role; 2] = [Role::User, Role::Admin];

/// Authenticated caller identity carried through every protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: AccountId,
    pub username: String,
    pub role: Role,
}

/// Username+password authenticator.
pub struct Authenticator<R: AccountRepository> {
    repo: R,
    hasher: CredentialHasher,
}

impl<R: AccountRepository> Authenticator<R> {
    pub fn new(repo: R, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }

    /// Resolves `username` + `raw_password` to an identity.
    ///
    /// # Errors
    /// - `InvalidCredentials` for unknown username or wrong password.
    /// - `Repo` when the store cannot be read.
    pub fn authenticate(&self, username: &str, raw_password: &str) -> AuthResult<Identity> {
        for role in LOOKUP_ORDER {
            let Some(account) = self.repo.find_by_username(role, username)? else {
                continue;
            };

            if self.hasher.verify(raw_password, &account.password_hash) {
                info!(
                    "event=login module=auth status=ok role={} account_id={}",
                    role, account.id
                );
                return Ok(Identity {
                    id: account.id,
                    username: account.username,
                    role,
                });
            }

            warn!("event=login module=auth status=denied role={role}");
            return Err(AuthError::InvalidCredentials);
        }

        self.hasher.verify_decoy(raw_password);
        warn!("event=login module=auth status=denied role=none");
        Err(AuthError::InvalidCredentials)
    }
}
