//! Access control gate — resolves a bearer token to an authenticated user.

use super::{AuthError, TokenIssuer};
use crate::db::Database;
use crate::models::User;

/// Resolve an `Authorization` header value into an authenticated user.
///
/// Missing header, wrong scheme, invalid or expired token and an unknown
/// subject all fail with the same `InvalidCredential`.
pub fn resolve_bearer(
    db: &Database,
    tokens: &TokenIssuer,
    header: Option<&str>,
) -> Result<User, AuthError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::InvalidCredential)?;

    let subject = tokens.validate(token)?;

    match db.get_user_by_username(&subject) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthError::InvalidCredential),
        Err(e) => {
            log::error!("User lookup failed during auth: {}", e);
            Err(AuthError::InvalidCredential)
        }
    }
}
