//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for graph nodes/edges.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutation runs inside one `IMMEDIATE` transaction, and all
//!   existence checks for that mutation run inside the same transaction.
//! - Edge creation is insert-if-absent against the edge primary key.
//! - Repository APIs return semantic errors (`*NotFound`, `DuplicateUsername`)
//!   in addition to DB transport errors.

pub mod account_repo;
pub mod feed_repo;
pub mod follow_repo;
pub mod post_repo;

use crate::db::DbError;
use crate::model::account::{AccountId, Role};
use crate::model::post::PostId;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all graph persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Username already taken inside one role's collection.
    DuplicateUsername { role: Role, username: String },
    /// Referenced user account does not exist.
    UserNotFound(AccountId),
    /// Referenced post does not exist.
    PostNotFound(PostId),
    /// Persisted row cannot be converted into a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateUsername { role, username } => {
                write!(f, "{role} username already exists: {username}")
            }
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted graph data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::DuplicateUsername { .. } => None,
            Self::UserNotFound(_) => None,
            Self::PostNotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns true when `err` is a UNIQUE/PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn user_exists(conn: &Connection, user_id: AccountId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
        [user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn post_exists(conn: &Connection, post_id: PostId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1);",
        [post_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
