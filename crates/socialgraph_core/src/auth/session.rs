//! Signed session tokens.
//!
//! # Responsibility
//! - Encode `{sub, username, role, iat, exp}` as an HS256 JWT.
//! - Verify signature, algorithm and expiry, and decode back to `Identity`.
//!
//! # Invariants
//! - Sessions are stateless; expiry is the only revocation.
//! - Expiry is checked with zero leeway.

use crate::auth::identity::Identity;
use crate::auth::{AuthError, AuthResult};
use crate::model::account::Role;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Formatter;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Default session lifetime: one day.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    username: String,
    role: Role,
    iat: u64,
    exp: u64,
}

/// Issued token with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    /// Unix epoch seconds.
    pub expires_at: u64,
}

/// Issues and verifies session tokens with one shared secret.
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager for `secret` and token lifetime `ttl`.
    ///
    /// # Errors
    /// - `InvalidConfig` when the secret is empty or `ttl` is zero.
    pub fn new(secret: &[u8], ttl: Duration) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::InvalidConfig(
                "session secret must not be empty".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(AuthError::InvalidConfig(
                "session ttl must be positive".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `identity` starting now.
    pub fn issue(&self, identity: &Identity) -> AuthResult<SessionToken> {
        self.issue_at(identity, unix_now_secs())
    }

    /// Issues a token as if created at `issued_at` (Unix epoch seconds).
    pub fn issue_at(&self, identity: &Identity, issued_at: u64) -> AuthResult<SessionToken> {
        let expires_at = issued_at.saturating_add(self.ttl.as_secs());
        let claims = SessionClaims {
            sub: identity.id.to_string(),
            username: identity.username.clone(),
            role: identity.role,
            iat: issued_at,
            exp: expires_at,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::TokenIssue(err.to_string()))?;
        Ok(SessionToken { token, expires_at })
    }

    /// Verifies `token` and decodes the identity it carries.
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| {
                debug!("event=session_verify module=auth status=invalid reason={err}");
                AuthError::InvalidSession
            })?;

        let claims = data.claims;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSession)?;
        Ok(Identity {
            id,
            username: claims.username,
            role: claims.role,
        })
    }
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
