//! Credential store use-case service.
//!
//! # Responsibility
//! - Register users and admins into their separate collections.
//! - Provide id/username lookups with the hash stripped from public reads.
//!
//! # Invariants
//! - Raw passwords are hashed before reaching the repository.
//! - Validation failures persist nothing.

use crate::auth::password::CredentialHasher;
use crate::db::now_epoch_ms;
use crate::model::account::{Account, AccountId, AccountPublic, Role};
use crate::repo::account_repo::AccountRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::validation::{normalize_email, validate_password, validate_username};
use log::info;
use uuid::Uuid;

/// Registration input for either account collection.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Credential store facade over an account repository.
pub struct AccountService<R: AccountRepository> {
    repo: R,
    hasher: CredentialHasher,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }

    /// Creates one account in `role`'s collection.
    ///
    /// # Errors
    /// - `InvalidInput` when username/email/password fail validation.
    /// - `Conflict` when the username exists in the same collection.
    pub fn create_account(&self, role: Role, input: &NewAccount) -> ServiceResult<AccountPublic> {
        validate_username(&input.username)?;
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;

        let account = Account {
            id: Uuid::new_v4(),
            role,
            username: input.username.clone(),
            email,
            password_hash: self.hasher.hash(&input.password)?,
            created_at: now_epoch_ms(),
        };
        self.repo.create_account(&account)?;

        info!(
            "event=account_create module=account status=ok role={} account_id={}",
            role, account.id
        );
        Ok(account.into_public())
    }

    /// Full record including the hash. Absent is not an error.
    pub fn find_by_username(&self, role: Role, username: &str) -> ServiceResult<Option<Account>> {
        Ok(self.repo.find_by_username(role, username)?)
    }

    /// Public projection by id. Absent is not an error.
    pub fn find_by_id(&self, role: Role, id: AccountId) -> ServiceResult<Option<AccountPublic>> {
        Ok(self.repo.find_by_id(role, id)?.map(Account::into_public))
    }

    /// Public projection by id, failing with `AccountNotFound` when absent.
    pub fn get_profile(&self, role: Role, id: AccountId) -> ServiceResult<AccountPublic> {
        self.find_by_id(role, id)?
            .ok_or(ServiceError::AccountNotFound { role, id })
    }
}
