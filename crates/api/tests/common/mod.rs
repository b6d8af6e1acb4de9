#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE, USER_AGENT};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use warden_core::fingerprint::Fingerprint;
use warden_db::MemoryStore;

use warden_api::auth::jwt::JwtConfig;
use warden_api::config::ServerConfig;
use warden_api::router::build_app_router;
use warden_api::state::AppState;

/// User agent of the "usual" test client.
pub const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) warden-tests";
/// A second device, for replay/hijack scenarios.
pub const PHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) warden-tests";

const CLIENT_IP: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(production: bool) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        production,
        cookie_secure: true,
        jwt: JwtConfig::with_secret("integration-test-secret"),
    }
}

/// The full router over an in-memory store, plus a handle on that store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(false))
}

/// Uses the production middleware stack from `build_app_router`, with a
/// mocked peer address standing in for the TCP connection.
pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
    };
    let router = build_app_router(state)
        .layer(MockConnectInfo(SocketAddr::new(IpAddr::V4(CLIENT_IP), 40_000)));
    TestApp { router, store }
}

/// Fingerprint the server computes for requests sent with `agent`.
pub fn fingerprint(agent: &str) -> Fingerprint {
    Fingerprint::derive(Some(IpAddr::V4(CLIENT_IP)), Some(agent))
}

/// Minimal client-side cookie jar for the two auth cookies.
#[derive(Debug, Clone, Default)]
pub struct Jar {
    pub refresh: Option<String>,
    pub access: Option<String>,
}

impl Jar {
    /// Apply every `Set-Cookie` on the response, dropping expired cookies.
    pub fn absorb(&mut self, response: &Response) {
        for (name, value, max_age) in set_cookies(response) {
            let value = (max_age != 0 && !value.is_empty()).then_some(value);
            match name.as_str() {
                "token" => self.refresh = value,
                "aToken" => self.access = value,
                _ => {}
            }
        }
    }

    fn header(&self) -> Option<String> {
        let mut pairs = Vec::new();
        if let Some(refresh) = &self.refresh {
            pairs.push(format!("token={refresh}"));
        }
        if let Some(access) = &self.access {
            pairs.push(format!("aToken={access}"));
        }
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }
}

/// `(name, value, max_age)` for every `Set-Cookie` header.
pub fn set_cookies(response: &Response) -> Vec<(String, String, i64)> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| {
            let raw = v.to_str().unwrap();
            let mut attrs = raw.split(';').map(str::trim);
            let (name, value) = attrs.next().unwrap().split_once('=').unwrap();
            let max_age = attrs
                .find_map(|a| a.strip_prefix("Max-Age="))
                .map(|a| a.parse().unwrap())
                .unwrap_or(-1);
            (name.to_string(), value.to_string(), max_age)
        })
        .collect()
}

/// Build a request carrying the jar's cookies and the given user agent.
pub fn request(
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    jar: &Jar,
    agent: &str,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_AGENT, agent);
    if let Some(cookie) = jar.header() {
        builder = builder.header(COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str, jar: &Jar, agent: &str) -> Response {
    send(app, request(Method::GET, uri, None, jar, agent)).await
}

pub async fn post_json(
    app: &TestApp,
    uri: &str,
    body: serde_json::Value,
    jar: &Jar,
    agent: &str,
) -> Response {
    send(app, request(Method::POST, uri, Some(body), jar, agent)).await
}

pub async fn put_json(
    app: &TestApp,
    uri: &str,
    body: serde_json::Value,
    jar: &Jar,
    agent: &str,
) -> Response {
    send(app, request(Method::PUT, uri, Some(body), jar, agent)).await
}

pub async fn delete(app: &TestApp, uri: &str, jar: &Jar, agent: &str) -> Response {
    send(app, request(Method::DELETE, uri, None, jar, agent)).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user through the API and assert success.
pub async fn register(app: &TestApp, name: &str, pass: &str, is_admin: bool) {
    let body = serde_json::json!({ "name": name, "pass": pass, "isAdmin": is_admin });
    let response = post_json(app, "/api/v1/auth/register", body, &Jar::default(), DESKTOP).await;
    assert_eq!(response.status(), StatusCode::OK, "registration of {name} should succeed");
}

/// Log in through the API from `agent` and return the resulting cookies.
pub async fn login(app: &TestApp, name: &str, pass: &str, agent: &str) -> Jar {
    let body = serde_json::json!({ "name": name, "pass": pass });
    let response = post_json(app, "/api/v1/auth/login", body, &Jar::default(), agent).await;
    assert_eq!(response.status(), StatusCode::OK, "login of {name} should succeed");
    let mut jar = Jar::default();
    jar.absorb(&response);
    jar
}

/// Fetch `/auth/me` and return its JSON `data`, or `None` when unauthorized.
pub async fn whoami(app: &TestApp, jar: &mut Jar, agent: &str) -> Option<serde_json::Value> {
    let response = get(app, "/api/v1/auth/me", jar, agent).await;
    jar.absorb(&response);
    match response.status() {
        StatusCode::OK => Some(body_json(response).await["data"].clone()),
        StatusCode::UNAUTHORIZED => None,
        other => panic!("unexpected status from /auth/me: {other}"),
    }
}
