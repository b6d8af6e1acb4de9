//! Session model: at most one row per user.

use sqlx::FromRow;
use warden_core::types::{Timestamp, UserId};

/// A row from the `user_sessions` table.
///
/// `token_hash` is the SHA-256 digest of the refresh token most recently
/// issued to the user and `issued_to` the fingerprint of the request that
/// received it.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub user_id: UserId,
    pub token_hash: String,
    pub issued_to: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
