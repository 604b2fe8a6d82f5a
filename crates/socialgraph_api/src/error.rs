//! Surface error for the use-case API.
//!
//! # Invariants
//! - Every failure carries exactly one `ErrorKind`.
//! - `code()` and `status()` are stable for a given kind.
//! - Credential failures never reveal which part of the login was wrong.

use rusqlite::Error as SqliteError;
use serde::Serialize;
use socialgraph_core::db::DbError;
use socialgraph_core::{AuthError, ErrorKind, LoggingError, RepoError, ServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure returned by every API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self::new(value.kind(), value.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::new(ErrorKind::StorageUnavailable, value.to_string())
    }
}

impl From<SqliteError> for ApiError {
    fn from(value: SqliteError) -> Self {
        DbError::from(value).into()
    }
}

impl From<LoggingError> for ApiError {
    fn from(value: LoggingError) -> Self {
        let kind = match value {
            LoggingError::UnsupportedLevel(_) | LoggingError::InvalidDirectory(_) => {
                ErrorKind::InvalidInput
            }
            LoggingError::AlreadyInitialized { .. } => ErrorKind::Conflict,
            LoggingError::Backend(_) => ErrorKind::Internal,
        };
        Self::new(kind, value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use socialgraph_core::{AuthError, ErrorKind, LoggingError, RepoError, Role, ServiceError};
    use uuid::Uuid;

    #[test]
    fn service_errors_keep_their_kind() {
        let err = ApiError::from(ServiceError::SelfReference(Uuid::new_v4()));
        assert_eq!(err.kind, ErrorKind::SelfReference);
        assert_eq!(err.code(), "self_reference");
        assert_eq!(err.status(), 422);

        let err = ApiError::from(RepoError::DuplicateUsername {
            role: Role::User,
            username: "alice".to_string(),
        });
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).status(), 401);
        assert_eq!(ApiError::from(AuthError::InvalidSession).status(), 401);
        let forbidden = ApiError::from(AuthError::Forbidden {
            role: Role::Admin,
            allowed: &[Role::User],
        });
        assert_eq!(forbidden.code(), "forbidden");
        assert_eq!(forbidden.status(), 403);
    }

    #[test]
    fn logging_errors_split_by_cause() {
        let err = ApiError::from(LoggingError::UnsupportedLevel("loud".to_string()));
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        let err = ApiError::from(LoggingError::AlreadyInitialized {
            active: "info".to_string(),
            requested: "debug".to_string(),
        });
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[test]
    fn display_prefixes_code() {
        let err = ApiError::new(ErrorKind::NotFound, "post not found");
        assert_eq!(err.to_string(), "not_found: post not found");
    }
}
