//! Handlers for the `/auth` resource (login, register, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use warden_core::error::CoreError;
use warden_db::models::user::CreateUser;

use crate::auth::cookies::SessionCookies;
use crate::auth::password::{hash_password, verify_login};
use crate::auth::session::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ClientFingerprint;
use crate::middleware::rbac::RequireAuth;
use crate::response::{DataResponse, Empty};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub pass: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub pass: String,
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Verify name + password, then issue a token pair bound to the caller's
/// fingerprint. Unknown names and wrong passwords are indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    ClientFingerprint(fingerprint): ClientFingerprint,
    Json(input): Json<LoginRequest>,
) -> AppResult<(SessionCookies, Json<Empty>)> {
    let user = state.store.find_user_by_name(&input.name).await?;

    // Unknown names still pay for an Argon2 verification.
    let digest = user.as_ref().map(|u| u.password_hash.as_str());
    let verified = verify_login(&input.pass, digest)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::info!(name = %input.name, "Rejected login");
            return Err(AppError::Core(CoreError::NotFound("User not found".into())));
        }
    };

    let pair = state.sessions().establish(user.id, &fingerprint).await?;
    let cookies = state
        .config
        .cookie_settings()
        .issue(&pair)
        .map_err(|e| AppError::InternalError(format!("Cookie encoding error: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok((cookies, Json(Empty::default())))
}

/// POST /api/v1/auth/register
///
/// Create a user. Does not log the new user in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<Empty>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if state.store.find_user_by_name(&input.name).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let password_hash = hash_password(&input.pass)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = state
        .store
        .create_user(&CreateUser {
            name: input.name,
            password_hash,
            is_admin: input.is_admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User registered");
    Ok(Json(Empty::default()))
}

/// POST /api/v1/auth/logout
///
/// Revoke the caller's session and clear the cookies. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<(SessionCookies, StatusCode)> {
    state.sessions().revoke(user.id).await?;
    let cookies = state
        .config
        .cookie_settings()
        .clear()
        .map_err(|e| AppError::InternalError(format!("Cookie encoding error: {e}")))?;
    Ok((cookies, StatusCode::NO_CONTENT))
}

/// GET /api/v1/auth/me
///
/// The caller's identity as resolved for this request.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<DataResponse<CurrentUser>> {
    Json(DataResponse { data: user })
}
