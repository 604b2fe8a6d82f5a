//! Use-case API for the social graph.
//!
//! # Responsibility
//! - Expose each request of the service surface as one synchronous call.
//! - Resolve bearer tokens into identities and enforce role allow-lists.
//!
//! # Invariants
//! - Authentication runs before authorization, which runs before any
//!   engine call.
//! - Every call opens its own connection; nothing is shared across calls
//!   except the immutable config, signer and hasher.
//! - Calls never panic; every failure is an `ApiError`.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use socialgraph_core::db::open_db;
use socialgraph_core::{
    authorize, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, AccountId, AccountPublic, AccountService, Authenticator, ContentService,
    CredentialHasher, ErrorKind, FeedService, FollowCounts, GraphService, Identity, NewAccount,
    PostId, PostView, Role, ServiceError, SessionManager, SqliteAccountRepository,
    SqliteFeedRepository, SqliteFollowRepository, SqlitePostRepository, UserSummary, ADMIN_ONLY,
    ANY_ROLE, USER_ONLY,
};
use std::time::Instant;

/// Token type reported by `login`.
pub const TOKEN_TYPE: &str = "Bearer";
const BEARER_PREFIX: &str = "Bearer ";

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Unix epoch seconds.
    pub expires_at: u64,
    pub identity: Identity,
}

/// Acknowledgement for idempotent graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

/// Request surface bound to one process configuration.
#[derive(Debug, Clone)]
pub struct SocialApi {
    config: ApiConfig,
    sessions: SessionManager,
    hasher: CredentialHasher,
}

impl SocialApi {
    /// Builds the API from `config`.
    ///
    /// # Errors
    /// - `Internal` when the session secret, ttl or hasher params are invalid.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let sessions = SessionManager::new(&config.jwt_secret, config.session_ttl)?;
        let hasher = CredentialHasher::new(config.hasher)
            .map_err(|err| ApiError::new(ErrorKind::Internal, err.to_string()))?;
        Ok(Self {
            config,
            sessions,
            hasher,
        })
    }

    /// Builds the API from `SOCIALGRAPH_*` environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Health check.
    pub fn ping(&self) -> String {
        ping_inner().to_owned()
    }

    pub fn core_version(&self) -> String {
        core_version_inner().to_owned()
    }

    /// Starts process file logging. Idempotent for the same arguments.
    pub fn init_logging(&self, level: &str, log_dir: &str) -> ApiResult<()> {
        Ok(init_logging_inner(level, log_dir)?)
    }

    pub fn register_user(&self, input: &NewAccount) -> ApiResult<AccountPublic> {
        self.register(Role::User, input)
    }

    pub fn register_admin(&self, input: &NewAccount) -> ApiResult<AccountPublic> {
        self.register(Role::Admin, input)
    }

    /// Exchanges username+password for a session token.
    ///
    /// Users are matched before admins.
    pub fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        observe("login", || {
            let conn = self.connect()?;
            let authenticator = Authenticator::new(
                SqliteAccountRepository::try_new(&conn)?,
                self.hasher.clone(),
            );
            let identity = authenticator.authenticate(username, password)?;
            let session = self.sessions.issue(&identity)?;
            Ok(LoginResponse {
                token: session.token,
                token_type: TOKEN_TYPE.to_string(),
                expires_at: session.expires_at,
                identity,
            })
        })
    }

    /// Profile of the caller, from the collection its role names.
    pub fn get_profile(&self, token: &str) -> ApiResult<AccountPublic> {
        observe("get_profile", || {
            let identity = self.resolve(token, ANY_ROLE)?;
            self.profile_of(&identity)
        })
    }

    pub fn get_admin_profile(&self, token: &str) -> ApiResult<AccountPublic> {
        observe("get_admin_profile", || {
            let identity = self.resolve(token, ADMIN_ONLY)?;
            self.profile_of(&identity)
        })
    }

    pub fn follow_user(&self, token: &str, target_id: AccountId) -> ApiResult<ActionResponse> {
        observe("follow_user", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            graph(&conn)?.follow(identity.id, target_id)?;
            Ok(ActionResponse::success("Followed."))
        })
    }

    pub fn unfollow_user(&self, token: &str, target_id: AccountId) -> ApiResult<ActionResponse> {
        observe("unfollow_user", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            graph(&conn)?.unfollow(identity.id, target_id)?;
            Ok(ActionResponse::success("Unfollowed."))
        })
    }

    pub fn list_followers(&self, token: &str, user_id: AccountId) -> ApiResult<Vec<UserSummary>> {
        observe("list_followers", || {
            self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            Ok(graph(&conn)?.list_followers(user_id)?)
        })
    }

    pub fn list_following(&self, token: &str, user_id: AccountId) -> ApiResult<Vec<UserSummary>> {
        observe("list_following", || {
            self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            Ok(graph(&conn)?.list_following(user_id)?)
        })
    }

    /// Whether the caller follows `target_id`.
    pub fn is_following(&self, token: &str, target_id: AccountId) -> ApiResult<bool> {
        observe("is_following", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            Ok(graph(&conn)?.is_following(identity.id, target_id)?)
        })
    }

    /// Public follower/following totals for `user_id`.
    pub fn get_follow_counts(&self, user_id: AccountId) -> ApiResult<FollowCounts> {
        observe("get_follow_counts", || {
            let conn = self.connect()?;
            Ok(graph(&conn)?.follow_counts(user_id)?)
        })
    }

    pub fn create_post(&self, token: &str, content: &str) -> ApiResult<PostView> {
        observe("create_post", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            Ok(content_service(&conn)?.create_post(identity.id, content)?)
        })
    }

    pub fn like_post(&self, token: &str, post_id: PostId) -> ApiResult<ActionResponse> {
        observe("like_post", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            content_service(&conn)?.like_post(identity.id, post_id)?;
            Ok(ActionResponse::success("Liked."))
        })
    }

    pub fn unlike_post(&self, token: &str, post_id: PostId) -> ApiResult<ActionResponse> {
        observe("unlike_post", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            content_service(&conn)?.unlike_post(identity.id, post_id)?;
            Ok(ActionResponse::success("Unliked."))
        })
    }

    /// Newest posts from everyone the caller follows.
    pub fn get_feed(&self, token: &str) -> ApiResult<Vec<PostView>> {
        observe("get_feed", || {
            let identity = self.resolve(token, USER_ONLY)?;
            let conn = self.connect()?;
            let feed = FeedService::new(SqliteFeedRepository::try_new(&conn)?);
            Ok(feed.get_feed(identity.id)?)
        })
    }

    pub fn get_user_posts(&self, user_id: AccountId) -> ApiResult<Vec<PostView>> {
        observe("get_user_posts", || {
            let conn = self.connect()?;
            Ok(content_service(&conn)?.get_user_posts(user_id)?)
        })
    }

    pub fn get_post(&self, post_id: PostId) -> ApiResult<PostView> {
        observe("get_post", || {
            let conn = self.connect()?;
            Ok(content_service(&conn)?.get_post_by_id(post_id)?)
        })
    }

    fn register(&self, role: Role, input: &NewAccount) -> ApiResult<AccountPublic> {
        let op = match role {
            Role::User => "register_user",
            Role::Admin => "register_admin",
        };
        observe(op, || {
            let conn = self.connect()?;
            let service =
                AccountService::new(SqliteAccountRepository::try_new(&conn)?, self.hasher.clone());
            Ok(service.create_account(role, input)?)
        })
    }

    fn profile_of(&self, identity: &Identity) -> ApiResult<AccountPublic> {
        let conn = self.connect()?;
        let service =
            AccountService::new(SqliteAccountRepository::try_new(&conn)?, self.hasher.clone());
        match service.get_profile(identity.role, identity.id) {
            Ok(profile) => Ok(profile),
            // Token outlived its account row, e.g. after a database reset.
            Err(ServiceError::AccountNotFound { .. }) => Err(ApiError::new(
                ErrorKind::Unauthenticated,
                "invalid or expired session",
            )),
            Err(err) => Err(err.into()),
        }
    }

    fn resolve(&self, token: &str, allowed: &'static [Role]) -> ApiResult<Identity> {
        let identity = self.sessions.verify(strip_bearer(token))?;
        authorize(&identity, allowed)?;
        Ok(identity)
    }

    fn connect(&self) -> ApiResult<Connection> {
        Ok(open_db(&self.config.db_path)?)
    }
}

fn graph(conn: &Connection) -> ApiResult<GraphService<SqliteFollowRepository<'_>>> {
    Ok(GraphService::new(SqliteFollowRepository::try_new(conn)?))
}

fn content_service(conn: &Connection) -> ApiResult<ContentService<SqlitePostRepository<'_>>> {
    Ok(ContentService::new(SqlitePostRepository::try_new(conn)?))
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim()
}

fn observe<T>(op: &'static str, call: impl FnOnce() -> ApiResult<T>) -> ApiResult<T> {
    let started_at = Instant::now();
    let result = call();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=api_call module=api status=ok op={op} duration_ms={duration_ms}"),
        Err(err) => warn!(
            "event=api_call module=api status=error op={op} duration_ms={duration_ms} error_code={}",
            err.code()
        ),
    }
    result
}
