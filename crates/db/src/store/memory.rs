use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use warden_core::types::UserId;

use super::SessionStore;
use crate::error::{StoreError, StoreResult};
use crate::models::session::Session;
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    sessions: HashMap<UserId, Session>,
}

/// In-process [`SessionStore`] with the same semantics as [`super::PgStore`].
///
/// Used by the test suites and by the server when no `DATABASE_URL` is set.
/// Data does not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a simulated backend outage. While unavailable every operation
    /// fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

fn name_taken(tables: &Tables, name: &str, except: Option<UserId>) -> bool {
    tables
        .users
        .values()
        .any(|u| u.name == name && Some(u.id) != except)
}

fn duplicate_name() -> StoreError {
    StoreError::Conflict("Duplicate value violates unique constraint: uq_users_name".into())
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find_session(&self, user_id: UserId) -> StoreResult<Option<Session>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.sessions.get(&user_id).cloned())
    }

    async fn upsert_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        issued_to: &str,
    ) -> StoreResult<Session> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::Unavailable(format!(
                "session references missing user {user_id}"
            )));
        }
        let now = Utc::now();
        let session = tables
            .sessions
            .entry(user_id)
            .and_modify(|s| {
                s.token_hash = token_hash.to_string();
                s.issued_to = issued_to.to_string();
                s.updated_at = now;
            })
            .or_insert_with(|| Session {
                user_id,
                token_hash: token_hash.to_string(),
                issued_to: issued_to.to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(session.clone())
    }

    async fn delete_session(&self, user_id: UserId) -> StoreResult<()> {
        self.ensure_available()?;
        self.tables.write().await.sessions.remove(&user_id);
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.name == name).cloned())
    }

    async fn list_users(&self, include_admins: bool) -> StoreResult<Vec<User>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| include_admins || !u.is_admin)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        if name_taken(&tables, &input.name, None) {
            return Err(duplicate_name());
        }
        let now = Utc::now();
        let user = User {
            id: UserId::now_v7(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            is_admin: input.is_admin,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: UserId, input: &UpdateUser) -> StoreResult<Option<User>> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        if let Some(name) = &input.name {
            if name_taken(&tables, name, Some(id)) {
                return Err(duplicate_name());
            }
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            user.name = name.clone();
        }
        if let Some(hash) = &input.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(is_admin) = input.is_admin {
            user.is_admin = is_admin;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        tables.sessions.remove(&id);
        Ok(tables.users.remove(&id).is_some())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.ensure_available()
    }
}
