//! Token codec: HS256 JWTs carrying a user id.
//!
//! Refresh and access tokens share one claim layout and differ in lifetime
//! and in the `kind` claim, which verification checks. Only the SHA-256
//! digest of a refresh token is ever stored server-side, so a database leak
//! does not hand out live sessions.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::hashing::sha256_hex;
use warden_core::types::UserId;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user the token was issued to.
    pub id: UserId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier, so two tokens minted in the same second differ.
    pub jti: String,
    /// Which cookie the token was minted for. A refresh token is never
    /// accepted where an access token is expected, and vice versa.
    pub kind: TokenKind,
}

/// Which lifetime a token is minted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// A freshly minted refresh/access pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 10).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 10;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `10`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }

    /// Build a config with the default lifetimes.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry_mins: DEFAULT_ACCESS_EXPIRY_MINS,
            refresh_token_expiry_days: DEFAULT_REFRESH_EXPIRY_DAYS,
        }
    }

    /// Lifetime of a token of the given kind.
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(self.access_token_expiry_mins),
            TokenKind::Refresh => Duration::days(self.refresh_token_expiry_days),
        }
    }
}

/// Sign a token for `user_id` that expires after the lifetime of `kind`.
pub fn issue_token(
    user_id: UserId,
    kind: TokenKind,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        id: user_id,
        exp: now + config.lifetime(kind).num_seconds(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
        kind,
    };
    encode_claims(&claims, config)
}

/// Mint a refresh token and an access token for `user_id`.
pub fn issue_pair(
    user_id: UserId,
    config: &JwtConfig,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        refresh: issue_token(user_id, TokenKind::Refresh, config)?,
        access: issue_token(user_id, TokenKind::Access, config)?,
    })
}

pub(crate) fn encode_claims(
    claims: &Claims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(), // HS256
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a token of the `expected` kind and return the user id it carries.
///
/// Returns `None` for a bad signature, a malformed token, a payload without a
/// valid `id` or `kind`, an expired token, or a token of the other kind. The
/// cause is logged but never surfaced: callers treat every failure as "not
/// authenticated".
pub fn verify_and_extract_id(
    token: &str,
    expected: TokenKind,
    config: &JwtConfig,
) -> Option<UserId> {
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp with the default leeway
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected token");
            return None;
        }
    };
    if claims.kind != expected {
        tracing::debug!(
            user_id = %claims.id,
            kind = ?claims.kind,
            "Rejected token of the wrong kind"
        );
        return None;
    }
    Some(claims.id)
}

/// Compute the SHA-256 hex digest of a refresh token.
///
/// Use this to compare an incoming refresh token against the stored hash.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
