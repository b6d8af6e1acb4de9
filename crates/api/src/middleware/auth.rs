//! Cookie session resolution for every API request.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use warden_core::fingerprint::Fingerprint;

use crate::auth::cookies::{CookiesWritten, Credentials};
use crate::auth::session::{AuthSession, CookieAction};
use crate::error::AppError;
use crate::state::AppState;

/// Fingerprint of the connecting client: its IP plus `User-Agent`.
///
/// The IP comes from [`ConnectInfo`], so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone)]
pub struct ClientFingerprint(pub Fingerprint);

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let remote_ip = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok());
        Ok(ClientFingerprint(Fingerprint::derive(remote_ip, user_agent)))
    }
}

/// The resolved session, as left in request extensions by [`resolve_session`].
///
/// Without the middleware every request reads as anonymous.
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Middleware resolving the auth cookies of every request.
///
/// Stores the [`AuthSession`] in request extensions for the extractors, runs
/// the handler, then sets rotated cookies or clears them on anonymous
/// outcomes. Handlers that write the cookies themselves (login, logout) win.
/// A store failure aborts the request with an internal error.
pub async fn resolve_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    let ClientFingerprint(fingerprint) =
        match ClientFingerprint::from_request_parts(&mut parts, &state).await {
            Ok(fp) => fp,
            Err(e) => return e.into_response(),
        };
    let credentials = Credentials::from_headers(&parts.headers);

    let resolution = match state.sessions().resolve(&credentials, &fingerprint).await {
        Ok(resolution) => resolution,
        Err(e) => return e.into_response(),
    };

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(resolution.session);
    let mut response = next.run(req).await;

    if response.extensions().get::<CookiesWritten>().is_some() {
        return response;
    }

    let settings = state.config.cookie_settings();
    let cookies = match resolution.cookies {
        CookieAction::Keep => return response,
        CookieAction::Issue(pair) => settings.issue(&pair),
        CookieAction::Clear => settings.clear(),
    };
    match cookies {
        Ok(cookies) => cookies.apply(&mut response),
        Err(e) => tracing::error!(error = %e, "Failed to encode auth cookies"),
    }
    response
}
