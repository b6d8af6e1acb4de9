//! Credential cookies.
//!
//! The refresh token travels in `token` and the access token in `aToken`.
//! Both are `HttpOnly; SameSite=Lax; Path=/`, plus `Secure` unless disabled
//! for plain-HTTP development.

use std::convert::Infallible;

use axum::http::header::{InvalidHeaderValue, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, Response, ResponseParts};

use super::jwt::TokenPair;

pub const REFRESH_COOKIE: &str = "token";
pub const ACCESS_COOKIE: &str = "aToken";

/// Raw tokens presented by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub refresh: Option<String>,
    pub access: Option<String>,
}

impl Credentials {
    /// Collect the auth cookies from every `Cookie` header. Empty values are
    /// treated as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut credentials = Self::default();
        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let Some((key, val)) = pair.trim().split_once('=') else {
                    continue;
                };
                let val = val.trim();
                if val.is_empty() {
                    continue;
                }
                match key.trim() {
                    REFRESH_COOKIE => credentials.refresh = Some(val.to_string()),
                    ACCESS_COOKIE => credentials.access = Some(val.to_string()),
                    _ => {}
                }
            }
        }
        credentials
    }

    pub fn is_empty(&self) -> bool {
        self.refresh.is_none() && self.access.is_none()
    }
}

/// Attributes applied to every auth cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub refresh_max_age_secs: i64,
    pub access_max_age_secs: i64,
}

impl CookieSettings {
    /// `Set-Cookie` headers delivering a new token pair.
    pub fn issue(&self, pair: &TokenPair) -> Result<SessionCookies, InvalidHeaderValue> {
        Ok(SessionCookies(vec![
            self.cookie(REFRESH_COOKIE, &pair.refresh, self.refresh_max_age_secs)?,
            self.cookie(ACCESS_COOKIE, &pair.access, self.access_max_age_secs)?,
        ]))
    }

    /// `Set-Cookie` headers expiring both auth cookies.
    pub fn clear(&self) -> Result<SessionCookies, InvalidHeaderValue> {
        Ok(SessionCookies(vec![
            self.cookie(REFRESH_COOKIE, "", 0)?,
            self.cookie(ACCESS_COOKIE, "", 0)?,
        ]))
    }

    fn cookie(&self, name: &str, value: &str, max_age: i64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Marker left in response extensions once a handler has written the auth
/// cookies itself, so the session middleware does not overwrite them.
#[derive(Debug, Clone, Copy)]
pub struct CookiesWritten;

/// A ready-to-send set of auth cookie headers.
#[derive(Debug, Clone)]
pub struct SessionCookies(Vec<HeaderValue>);

impl SessionCookies {
    /// Append the cookies to an already-built response.
    pub fn apply(self, response: &mut Response) {
        for value in self.0 {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response.extensions_mut().insert(CookiesWritten);
    }
}

impl IntoResponseParts for SessionCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for value in self.0 {
            res.headers_mut().append(SET_COOKIE, value);
        }
        res.extensions_mut().insert(CookiesWritten);
        Ok(res)
    }
}
