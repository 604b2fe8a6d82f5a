//! Role allow-list gate.

use crate::auth::identity::Identity;
use crate::auth::{AuthError, AuthResult};
use crate::model::account::Role;

/// Operations open to ordinary users only.
pub const USER_ONLY: &[Role] = &[Role::User];
/// Operations open to administrators only.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
/// Operations open to any authenticated account.
pub const ANY_ROLE: &[Role] = &[Role::User, Role::Admin];

/// Pure allow-list check.
pub fn is_role_allowed(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Fails with `Forbidden` when the identity's role is not in `allowed`.
pub fn authorize(identity: &Identity, allowed: &'static [Role]) -> AuthResult<()> {
    if is_role_allowed(identity.role, allowed) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            role: identity.role,
            allowed,
        })
    }
}
