//! Repository for the `user_sessions` table.

use sqlx::PgPool;
use warden_core::types::UserId;

use crate::models::session::Session;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, token_hash, issued_to, created_at, updated_at";

/// Provides keyed access to the single session row per user.
pub struct SessionRepo;

impl SessionRepo {
    /// Find the session for a user.
    pub async fn find_by_user(pool: &PgPool, user_id: UserId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE user_id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the session for a user in a single statement.
    pub async fn upsert(
        pool: &PgPool,
        user_id: UserId,
        token_hash: &str,
        issued_to: &str,
    ) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, issued_to)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET
                token_hash = EXCLUDED.token_hash,
                issued_to = EXCLUDED.issued_to,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(issued_to)
            .fetch_one(pool)
            .await
    }

    /// Delete the session for a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
