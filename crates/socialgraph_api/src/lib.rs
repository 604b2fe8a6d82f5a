//! Synchronous use-case API over the social graph core.
//!
//! Every call opens its own connection, resolves the bearer token when the
//! operation is protected, checks the role allow-list, and maps failures to
//! one stable `ApiError`.

pub mod api;
pub mod config;
pub mod error;

pub use api::{ActionResponse, LoginResponse, SocialApi, TOKEN_TYPE};
pub use config::{
    default_db_path, secret_path, ApiConfig, DB_FILE_NAME, ENV_DB_PATH, ENV_JWT_SECRET,
    ENV_SESSION_TTL_SECS, SECRET_FILE_SUFFIX,
};
pub use error::{ApiError, ApiResult};
