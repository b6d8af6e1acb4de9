//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use warden_core::error::CoreError;
use warden_core::types::UserId;
use warden_db::models::user::{UpdateUser, UserResponse};

use crate::auth::gate;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::AuthSession;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireFreshAuth};
use crate::response::{DataResponse, Empty};
use crate::state::AppState;

/// Request body for `PUT /users/{id}`. Everything is optional.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub pass: Option<String>,
    pub is_admin: Option<bool>,
}

/// Request body for `PUT /users/me/password`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub pass: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_pass: String,
}

fn user_not_found(id: UserId) -> AppError {
    AppError::Core(CoreError::NotFound(format!("User with id {id} not found")))
}

/// GET /api/v1/users
///
/// Administrators see every user; everyone else only sees non-admins.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = state.store.list_users(caller.is_admin).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let password_hash = input
        .pass
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let update = UpdateUser {
        name: input.name,
        password_hash,
        is_admin: input.is_admin,
    };

    let user = state
        .store
        .update_user(id, &update)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(user_id = %id, admin_id = %admin.id, "User updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Nobody may delete their own account, admin or not; deleting anyone else
/// requires the admin flag. The user's session goes with the account.
pub async fn delete_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<UserId>,
) -> AppResult<Json<Empty>> {
    let caller = gate::require_authed(&session)?;
    if caller.id == id {
        return Err(AppError::Core(CoreError::BadRequest("Cannot delete self".into())));
    }
    let admin = gate::require_admin(&session)?;

    if !state.store.delete_user(id).await? {
        return Err(user_not_found(id));
    }

    tracing::info!(user_id = %id, admin_id = %admin.id, "User deleted");
    Ok(Json(Empty::default()))
}

/// PUT /api/v1/users/me/password
///
/// Only accepted with a still-valid access token, never on a request that
/// was just re-authenticated from the refresh token.
pub async fn change_password(
    State(state): State<AppState>,
    RequireFreshAuth(caller): RequireFreshAuth,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<Empty>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state
        .store
        .find_user(caller.id)
        .await?
        .ok_or_else(|| user_not_found(caller.id))?;
    let verified = verify_password(&input.pass, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !verified {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    let password_hash = hash_password(&input.new_pass)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    state
        .store
        .update_user(
            caller.id,
            &UpdateUser {
                password_hash: Some(password_hash),
                ..UpdateUser::default()
            },
        )
        .await?
        .ok_or_else(|| user_not_found(caller.id))?;

    tracing::info!(user_id = %caller.id, "Password changed");
    Ok(Json(Empty::default()))
}
