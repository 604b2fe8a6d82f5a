//! Input rules applied before any write reaches the store.

use crate::service::error::{ServiceError, ServiceResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;
/// Maximum post length in characters.
pub const POST_CONTENT_MAX_CHARS: usize = 5000;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub fn validate_username(username: &str) -> ServiceResult<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ServiceError::invalid(
            "username",
            "expected 3-32 characters from [A-Za-z0-9_.-]",
        ))
    }
}

/// Trims surrounding whitespace and checks the `local@domain.tld` shape.
pub fn normalize_email(email: &str) -> ServiceResult<String> {
    let trimmed = email.trim();
    if EMAIL_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ServiceError::invalid("email", "expected local@domain.tld"))
    }
}

pub fn validate_password(raw_password: &str) -> ServiceResult<()> {
    if raw_password.chars().count() >= PASSWORD_MIN_CHARS {
        Ok(())
    } else {
        Err(ServiceError::invalid(
            "password",
            format!("must be at least {PASSWORD_MIN_CHARS} characters"),
        ))
    }
}

/// Rejects blank or oversized post bodies. Content is stored verbatim.
pub fn validate_post_content(content: &str) -> ServiceResult<()> {
    if content.trim().is_empty() {
        return Err(ServiceError::invalid("content", "must not be blank"));
    }
    if content.chars().count() > POST_CONTENT_MAX_CHARS {
        return Err(ServiceError::invalid(
            "content",
            format!("must be at most {POST_CONTENT_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}
