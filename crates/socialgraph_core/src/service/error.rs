//! Domain error taxonomy shared by all services.
//!
//! # Invariants
//! - Every error exposes one stable `ErrorKind`; callers branch on the kind,
//!   never on message text.
//! - "Already in desired state" outcomes of idempotent operations are not
//!   errors and have no kind.

use crate::auth::password::PasswordError;
use crate::model::account::{AccountId, Role};
use crate::model::post::PostId;
use crate::repo::RepoError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stable error category surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request input failed validation.
    InvalidInput,
    /// Bad credentials or invalid/expired session token.
    Unauthenticated,
    /// Authenticated, but the role is not allowed for the operation.
    Forbidden,
    /// Referenced account or post does not exist.
    NotFound,
    /// Username already registered in the target collection.
    Conflict,
    /// Follow target equals the actor.
    SelfReference,
    /// Store failure; distinct from every domain error.
    StorageUnavailable,
    /// Unexpected failure outside the store (e.g. credential hashing).
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::SelfReference => "self_reference",
            Self::StorageUnavailable => "storage_unavailable",
            Self::Internal => "internal",
        }
    }

    /// HTTP-equivalent status for transports that need one.
    pub fn status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::SelfReference => 422,
            Self::StorageUnavailable => 503,
            Self::Internal => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Service error for graph, content, feed and account use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before touching the store.
    InvalidInput { field: &'static str, reason: String },
    /// Username already exists in the role's collection.
    Conflict { role: Role, username: String },
    /// Referenced user does not exist.
    UserNotFound(AccountId),
    /// Referenced post does not exist.
    PostNotFound(PostId),
    /// Account lookup by id found nothing in the role's collection.
    AccountNotFound { role: Role, id: AccountId },
    /// Actor attempted to follow itself.
    SelfReference(AccountId),
    /// Password hashing failed.
    Credential(PasswordError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::UserNotFound(_) | Self::PostNotFound(_) | Self::AccountNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::SelfReference(_) => ErrorKind::SelfReference,
            Self::Credential(_) => ErrorKind::Internal,
            Self::Repo(_) => ErrorKind::StorageUnavailable,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::Conflict { role, username } => {
                write!(f, "{role} username already exists: {username}")
            }
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::AccountNotFound { role, id } => write!(f, "{role} not found: {id}"),
            Self::SelfReference(id) => write!(f, "user cannot follow itself: {id}"),
            Self::Credential(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credential(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateUsername { role, username } => Self::Conflict { role, username },
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::PostNotFound(id) => Self::PostNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Credential(value)
    }
}
