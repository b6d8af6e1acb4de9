//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /              -> list_users (requires auth)
/// PUT    /me/password   -> change_password (requires fresh auth)
/// PUT    /{id}          -> update_user (requires admin)
/// DELETE /{id}          -> delete_user (requires admin, never self)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/me/password", put(users::change_password))
        .route("/{id}", put(users::update_user).delete(users::delete_user))
}
