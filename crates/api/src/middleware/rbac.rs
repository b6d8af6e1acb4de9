//! Authorization extractors.
//!
//! Each extractor reads the [`AuthSession`] resolved by the session
//! middleware and applies one predicate from [`crate::auth::gate`]. List
//! several in a handler signature to require all of them.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::gate;
use crate::auth::session::{AuthSession, CurrentUser};
use crate::error::AppError;

/// Requires any authenticated user. Rejects with 401 otherwise.
///
/// ```ignore
/// async fn any_authed(RequireAuth(user): RequireAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        Ok(RequireAuth(gate::require_authed(&session)?.clone()))
    }
}

/// Requires a caller whose access token was valid on arrival, i.e. one that
/// was not re-authenticated from its refresh token on this request.
pub struct RequireFreshAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireFreshAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        Ok(RequireFreshAuth(gate::require_fresh_auth(&session)?.clone()))
    }
}

/// Requires the admin flag. Rejects with 401 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        Ok(RequireAdmin(gate::require_admin(&session)?.clone()))
    }
}
