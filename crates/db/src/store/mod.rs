//! The persistence contract the auth core depends on.
//!
//! The core only ever needs keyed single-row operations, so the contract is
//! kept small enough to be backed by anything reachable by primary key.

use async_trait::async_trait;
use warden_core::types::UserId;

use crate::error::StoreResult;
use crate::models::session::Session;
use crate::models::user::{CreateUser, UpdateUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Users and their single active session.
///
/// Implementations must guarantee:
///
/// - `upsert_session` is all-or-nothing and leaves at most one session per
///   user (last write wins);
/// - `delete_session` is idempotent;
/// - `delete_user` removes the user's session as well;
/// - `create_user` rejects duplicate names with [`crate::StoreError::Conflict`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_session(&self, user_id: UserId) -> StoreResult<Option<Session>>;

    async fn upsert_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        issued_to: &str,
    ) -> StoreResult<Session>;

    async fn delete_session(&self, user_id: UserId) -> StoreResult<()>;

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self, include_admins: bool) -> StoreResult<Vec<User>>;

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    /// Returns `None` if the user does not exist.
    async fn update_user(&self, id: UserId, input: &UpdateUser) -> StoreResult<Option<User>>;

    /// Returns `false` if the user did not exist.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    async fn health_check(&self) -> StoreResult<()>;
}
