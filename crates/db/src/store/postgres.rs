use async_trait::async_trait;
use warden_core::types::UserId;

use super::SessionStore;
use crate::error::StoreResult;
use crate::models::session::Session;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::{SessionRepo, UserRepo};
use crate::DbPool;

/// [`SessionStore`] backed by PostgreSQL through the sqlx repositories.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn find_session(&self, user_id: UserId) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::find_by_user(&self.pool, user_id).await?)
    }

    async fn upsert_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        issued_to: &str,
    ) -> StoreResult<Session> {
        let session = SessionRepo::upsert(&self.pool, user_id, token_hash, issued_to).await?;
        tracing::debug!(user_id = %user_id, "Session row written");
        Ok(session)
    }

    async fn delete_session(&self, user_id: UserId) -> StoreResult<()> {
        if SessionRepo::delete(&self.pool, user_id).await? {
            tracing::debug!(user_id = %user_id, "Session row deleted");
        }
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_name(&self.pool, name).await?)
    }

    async fn list_users(&self, include_admins: bool) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list(&self.pool, include_admins).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn update_user(&self, id: UserId, input: &UpdateUser) -> StoreResult<Option<User>> {
        Ok(UserRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let deleted = UserRepo::delete(&self.pool, id).await?;
        if deleted {
            tracing::debug!(user_id = %id, "User deleted, session cascaded");
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
