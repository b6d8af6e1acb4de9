//! Authorization predicates.
//!
//! Each check either hands back the current user or fails with the same
//! generic `Unauthorized`, whichever condition was missing. Checks compose by
//! conjunction; there is no role hierarchy beyond the admin flag.

use warden_core::error::CoreError;

use super::session::{AuthSession, CurrentUser};

fn denied() -> CoreError {
    CoreError::Unauthorized("Auth error".into())
}

/// Any authenticated caller.
pub fn require_authed(session: &AuthSession) -> Result<&CurrentUser, CoreError> {
    session.user().ok_or_else(denied)
}

/// A caller whose access token was still valid on arrival.
///
/// Rejects requests that were silently re-authenticated from the refresh
/// token on this very request.
pub fn require_fresh_auth(session: &AuthSession) -> Result<&CurrentUser, CoreError> {
    let user = require_authed(session)?;
    if user.access_updated {
        return Err(denied());
    }
    Ok(user)
}

/// An authenticated administrator.
pub fn require_admin(session: &AuthSession) -> Result<&CurrentUser, CoreError> {
    let user = require_authed(session)?;
    if !user.is_admin {
        return Err(denied());
    }
    Ok(user)
}
