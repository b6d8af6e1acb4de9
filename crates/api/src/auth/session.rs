//! Per-request session resolution and token rotation.
//!
//! Every request is resolved to an [`AuthSession`] by [`SessionEngine::resolve`]:
//!
//! 1. No auth cookies: anonymous.
//! 2. A valid access token: trusted without touching the session row.
//! 3. Otherwise a refresh token is checked against the stored digest and the
//!    fingerprint it was issued to. A match mints and persists a new pair; a
//!    mismatch deletes the session so the holder must log in again.
//!
//! Whenever the outcome is anonymous both cookies are cleared, so a
//! half-valid pair is never left on the client.

use serde::Serialize;
use warden_core::error::CoreError;
use warden_core::fingerprint::Fingerprint;
use warden_core::types::UserId;
use warden_db::models::user::User;
use warden_db::SessionStore;

use super::cookies::Credentials;
use super::jwt::{
    hash_refresh_token, issue_pair, verify_and_extract_id, JwtConfig, TokenKind, TokenPair,
};
use crate::error::AppResult;

/// Identity exposed to handlers once a request is authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub is_admin: bool,
    /// `true` when this request's tokens were just re-minted from the refresh
    /// token rather than accepted from a still-valid access token.
    pub access_updated: bool,
}

impl CurrentUser {
    fn from_user(user: User, access_updated: bool) -> Self {
        Self {
            id: user.id,
            name: user.name,
            is_admin: user.is_admin,
            access_updated,
        }
    }
}

/// Outcome of session resolution, stored in request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession(pub Option<CurrentUser>);

impl AuthSession {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.0.as_ref()
    }
}

/// What the response must do with the auth cookies.
#[derive(Debug, Clone)]
pub enum CookieAction {
    /// Leave the client's cookies alone.
    Keep,
    /// Deliver a newly minted pair.
    Issue(TokenPair),
    /// Expire both cookies.
    Clear,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub session: AuthSession,
    pub cookies: CookieAction,
}

impl Resolution {
    fn anonymous() -> Self {
        Self {
            session: AuthSession::anonymous(),
            cookies: CookieAction::Clear,
        }
    }
}

/// Rotation engine over a [`SessionStore`].
///
/// Holds no state of its own; build one per request from the shared store
/// and JWT configuration.
pub struct SessionEngine<'a> {
    store: &'a dyn SessionStore,
    jwt: &'a JwtConfig,
}

impl<'a> SessionEngine<'a> {
    pub fn new(store: &'a dyn SessionStore, jwt: &'a JwtConfig) -> Self {
        Self { store, jwt }
    }

    /// Resolve the presented credentials into a session.
    ///
    /// Token and fingerprint failures yield an anonymous resolution; only a
    /// store failure is an error.
    pub async fn resolve(
        &self,
        credentials: &Credentials,
        fingerprint: &Fingerprint,
    ) -> AppResult<Resolution> {
        if credentials.is_empty() {
            return Ok(Resolution::anonymous());
        }

        // Fast path: a live access token is trusted without a session lookup.
        if let Some(id) = credentials
            .access
            .as_deref()
            .and_then(|token| verify_and_extract_id(token, TokenKind::Access, self.jwt))
        {
            return Ok(match self.load_user(id).await? {
                Some(user) => Resolution {
                    session: AuthSession(Some(CurrentUser::from_user(user, false))),
                    cookies: CookieAction::Keep,
                },
                None => Resolution::anonymous(),
            });
        }

        // Slow path: an absent access token is handled like an invalid one.
        let Some(refresh) = credentials.refresh.as_deref() else {
            return Ok(Resolution::anonymous());
        };
        let Some(id) = verify_and_extract_id(refresh, TokenKind::Refresh, self.jwt) else {
            return Ok(Resolution::anonymous());
        };

        let presented = hash_refresh_token(refresh);
        let matches = self.store.find_session(id).await?.is_some_and(|session| {
            session.token_hash == presented && session.issued_to == fingerprint.as_str()
        });
        if !matches {
            tracing::warn!(user_id = %id, "Stale or foreign refresh token, revoking session");
            self.store.delete_session(id).await?;
            return Ok(Resolution::anonymous());
        }

        let Some(user) = self.load_user(id).await? else {
            return Ok(Resolution::anonymous());
        };
        let pair = self.establish(id, fingerprint).await?;
        tracing::debug!(user_id = %id, "Rotated session tokens");

        Ok(Resolution {
            session: AuthSession(Some(CurrentUser::from_user(user, true))),
            cookies: CookieAction::Issue(pair),
        })
    }

    /// Mint a new pair for `user_id` and make it the user's only session.
    ///
    /// Any previously issued refresh token stops matching the stored digest.
    pub async fn establish(&self, user_id: UserId, fingerprint: &Fingerprint) -> AppResult<TokenPair> {
        let pair = issue_pair(user_id, self.jwt)
            .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))?;
        self.store
            .upsert_session(user_id, &hash_refresh_token(&pair.refresh), fingerprint.as_str())
            .await?;
        Ok(pair)
    }

    /// Drop the user's session. Idempotent.
    pub async fn revoke(&self, user_id: UserId) -> AppResult<()> {
        self.store.delete_session(user_id).await?;
        Ok(())
    }

    /// Load the user behind a token; a vanished user also loses its session.
    async fn load_user(&self, id: UserId) -> AppResult<Option<User>> {
        let user = self.store.find_user(id).await?;
        if user.is_none() {
            tracing::warn!(user_id = %id, "Token refers to a missing user");
            self.store.delete_session(id).await?;
        }
        Ok(user)
    }
}
