//! Core engine for the social graph backend.
//! This crate is the single source of truth for graph invariants: account
//! collections, follow edges, posts, likes, feed composition, and the
//! identity/session layer that gates them.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::authorize::{authorize, is_role_allowed, ADMIN_ONLY, ANY_ROLE, USER_ONLY};
pub use auth::identity::{Authenticator, Identity};
pub use auth::password::{CredentialHasher, PasswordError, PasswordHasherConfig};
pub use auth::session::{SessionManager, SessionToken, DEFAULT_SESSION_TTL};
pub use auth::{AuthError, AuthResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::account::{Account, AccountId, AccountPublic, Role, UserSummary};
pub use model::post::{PostId, PostView};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository};
pub use repo::feed_repo::{FeedRepository, SqliteFeedRepository};
pub use repo::follow_repo::{FollowCounts, FollowRepository, SqliteFollowRepository};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountService, NewAccount};
pub use service::content_service::ContentService;
pub use service::error::{ErrorKind, ServiceError, ServiceResult};
pub use service::feed_service::{FeedService, FEED_LIMIT};
pub use service::graph_service::GraphService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
