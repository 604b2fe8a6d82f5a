//! Process configuration for the use-case API.
//!
//! # Responsibility
//! - Resolve database path, session secret and session lifetime from the
//!   environment, falling back to local-development defaults.
//! - Persist a generated session secret beside the database so tokens
//!   survive process restarts.
//!
//! # Invariants
//! - The session secret is never empty and never printed.
//! - All processes using one database without `SOCIALGRAPH_JWT_SECRET`
//!   share one generated secret.
//! - A set-but-invalid variable is an error, not a silent default.

use crate::error::{ApiError, ApiResult};
use log::{info, warn};
use socialgraph_core::{ErrorKind, PasswordHasherConfig, DEFAULT_SESSION_TTL};
use std::ffi::OsString;
use std::fmt::{Debug, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

pub const ENV_DB_PATH: &str = "SOCIALGRAPH_DB_PATH";
pub const ENV_JWT_SECRET: &str = "SOCIALGRAPH_JWT_SECRET";
pub const ENV_SESSION_TTL_SECS: &str = "SOCIALGRAPH_SESSION_TTL_SECS";
pub const DB_FILE_NAME: &str = "socialgraph.sqlite3";
/// Appended to the database file name to locate the generated secret.
pub const SECRET_FILE_SUFFIX: &str = ".jwt-secret";

/// Settings shared by every API call of one process.
#[derive(Clone)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub jwt_secret: Vec<u8>,
    pub session_ttl: Duration,
    pub hasher: PasswordHasherConfig,
}

impl Debug for ApiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("hasher", &self.hasher)
            .finish()
    }
}

impl ApiConfig {
    /// Config for `db_path` signed with `jwt_secret`, other fields default.
    pub fn new(db_path: impl Into<PathBuf>, jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            db_path: db_path.into(),
            jwt_secret: jwt_secret.into(),
            session_ttl: DEFAULT_SESSION_TTL,
            hasher: PasswordHasherConfig::default(),
        }
    }

    /// Resolves config from process environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup_with_db_path(None, |key| std::env::var(key).ok())
    }

    /// Like `from_env`, but `db_path` (when set) wins over `SOCIALGRAPH_DB_PATH`.
    pub fn from_env_with_db_path(db_path: Option<PathBuf>) -> ApiResult<Self> {
        Self::from_lookup_with_db_path(db_path, |key| std::env::var(key).ok())
    }

    /// Resolves config through `lookup`, which returns a variable's raw value.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        Self::from_lookup_with_db_path(None, lookup)
    }

    /// Resolves config through `lookup`, with an optional database path
    /// override.
    ///
    /// # Errors
    /// - `InvalidInput` for a malformed session ttl or an empty secret file.
    /// - `StorageUnavailable` when the secret file cannot be read or written.
    pub fn from_lookup_with_db_path(
        db_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ApiResult<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = db_path
            .or_else(|| read(ENV_DB_PATH).map(PathBuf::from))
            .unwrap_or_else(default_db_path);

        let jwt_secret = match read(ENV_JWT_SECRET) {
            Some(secret) => secret.into_bytes(),
            None => load_or_create_secret(&secret_path(&db_path))?,
        };

        let session_ttl = match read(ENV_SESSION_TTL_SECS) {
            Some(raw) => parse_ttl_secs(&raw)?,
            None => DEFAULT_SESSION_TTL,
        };

        Ok(Self {
            db_path,
            jwt_secret,
            session_ttl,
            hasher: PasswordHasherConfig::default(),
        })
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_hasher(mut self, hasher: PasswordHasherConfig) -> Self {
        self.hasher = hasher;
        self
    }
}

/// `socialgraph.sqlite3` under the system temp directory.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DB_FILE_NAME)
}

/// Location of the generated secret for the database at `db_path`.
pub fn secret_path(db_path: &Path) -> PathBuf {
    let mut name = db_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DB_FILE_NAME));
    name.push(SECRET_FILE_SUFFIX);
    db_path.with_file_name(name)
}

fn parse_ttl_secs(raw: &str) -> ApiResult<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ApiError::new(
            ErrorKind::InvalidInput,
            format!("{ENV_SESSION_TTL_SECS} must be a positive integer, got `{raw}`"),
        )),
    }
}

fn load_or_create_secret(path: &Path) -> ApiResult<Vec<u8>> {
    if let Some(secret) = read_secret(path)? {
        info!(
            "event=config_resolve module=api status=loaded key={} path={}",
            ENV_JWT_SECRET,
            path.display()
        );
        return Ok(secret);
    }

    // Written to a private temp file, then linked into place; the link
    // fails if another process won the race, and its secret is used.
    let secret = random_secret();
    let staging = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
    write_private(&staging, &secret).map_err(|err| secret_io_error(&staging, &err))?;
    let linked = fs::hard_link(&staging, path);
    let _ = fs::remove_file(&staging);

    match linked {
        Ok(()) => {
            warn!(
                "event=config_resolve module=api status=generated key={} path={}",
                ENV_JWT_SECRET,
                path.display()
            );
            Ok(secret)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => read_secret(path)?
            .ok_or_else(|| secret_io_error(path, &io::Error::from(io::ErrorKind::NotFound))),
        Err(err) => Err(secret_io_error(path, &err)),
    }
}

fn read_secret(path: &Path) -> ApiResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(secret) if secret.is_empty() => Err(ApiError::new(
            ErrorKind::InvalidInput,
            format!("secret file `{}` is empty", path.display()),
        )),
        Ok(secret) => Ok(Some(secret)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(secret_io_error(path, &err)),
    }
}

fn write_private(path: &Path, secret: &[u8]) -> io::Result<()> {
    let mut file = create_private(path)?;
    file.write_all(secret)?;
    file.sync_all()
}

#[cfg(unix)]
fn create_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn secret_io_error(path: &Path, err: &io::Error) -> ApiError {
    ApiError::new(
        ErrorKind::StorageUnavailable,
        format!("cannot access secret file `{}`: {err}", path.display()),
    )
}

fn random_secret() -> Vec<u8> {
    let mut secret = Vec::with_capacity(32);
    secret.extend_from_slice(Uuid::new_v4().as_bytes());
    secret.extend_from_slice(Uuid::new_v4().as_bytes());
    secret
}

#[cfg(test)]
mod tests {
    use super::{
        default_db_path, secret_path, ApiConfig, DB_FILE_NAME, ENV_DB_PATH, ENV_JWT_SECRET,
        ENV_SESSION_TTL_SECS,
    };
    use socialgraph_core::{ErrorKind, DEFAULT_SESSION_TTL};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn default_db_path_lives_in_temp_dir() {
        let path = default_db_path();
        assert!(path.ends_with(DB_FILE_NAME));
        assert!(path.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn secret_file_sits_beside_database() {
        let path = secret_path(&PathBuf::from("/var/lib/graph/main.sqlite3"));
        assert_eq!(path, PathBuf::from("/var/lib/graph/main.sqlite3.jwt-secret"));
    }

    #[test]
    fn generated_secret_is_persisted_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("graph.sqlite3");
        let db = db_path.to_str().unwrap();

        let first = ApiConfig::from_lookup(lookup(&[(ENV_DB_PATH, db)])).unwrap();
        let second = ApiConfig::from_lookup(lookup(&[(ENV_DB_PATH, db)])).unwrap();
        assert_eq!(first.jwt_secret.len(), 32);
        assert_eq!(first.jwt_secret, second.jwt_secret);
        assert_eq!(
            std::fs::read(secret_path(&db_path)).unwrap(),
            first.jwt_secret
        );
        assert_eq!(first.session_ttl, DEFAULT_SESSION_TTL);

        let other_dir = tempfile::tempdir().unwrap();
        let other = ApiConfig::from_lookup_with_db_path(
            Some(other_dir.path().join("graph.sqlite3")),
            lookup(&[]),
        )
        .unwrap();
        assert_ne!(other.jwt_secret, first.jwt_secret);
    }

    #[cfg(unix)]
    #[test]
    fn generated_secret_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("graph.sqlite3");
        ApiConfig::from_lookup_with_db_path(Some(db_path.clone()), lookup(&[])).unwrap();

        let mode = std::fs::metadata(secret_path(&db_path))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn empty_secret_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("graph.sqlite3");
        std::fs::write(secret_path(&db_path), b"").unwrap();

        let err = ApiConfig::from_lookup_with_db_path(Some(db_path), lookup(&[])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn explicit_values_are_used_and_no_secret_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("graph.sqlite3");
        let db = format!(" {} ", db_path.display());
        let config = ApiConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, db.as_str()),
            (ENV_JWT_SECRET, "s3cret"),
            (ENV_SESSION_TTL_SECS, "3600"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, db_path);
        assert_eq!(config.jwt_secret, b"s3cret".to_vec());
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert!(!secret_path(&db_path).exists());
    }

    #[test]
    fn db_path_override_beats_environment() {
        let dir = tempfile::tempdir().unwrap();
        let override_path = dir.path().join("override.sqlite3");
        let config = ApiConfig::from_lookup_with_db_path(
            Some(override_path.clone()),
            lookup(&[(ENV_DB_PATH, "/elsewhere/graph.sqlite3"), (ENV_JWT_SECRET, "s")]),
        )
        .unwrap();
        assert_eq!(config.db_path, override_path);
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        for raw in ["0", "-5", "soon"] {
            let err = ApiConfig::from_lookup(lookup(&[
                (ENV_JWT_SECRET, "s3cret"),
                (ENV_SESSION_TTL_SECS, raw),
            ]))
            .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = ApiConfig::new("/tmp/graph.sqlite3", "top-secret-value");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret-value"));
        assert!(rendered.contains("redacted"));
    }
}
