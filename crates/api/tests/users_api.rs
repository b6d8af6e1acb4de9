//! Integration tests for the `/users` endpoints and their guards.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use warden_db::SessionStore;

/// Registers `root` (admin), `alice` and `bob`, returning logged-in jars for
/// the first two.
async fn seed(app: &TestApp) -> (Jar, Jar) {
    register(app, "root", "rootpass", true).await;
    register(app, "alice", "secret1", false).await;
    register(app, "bob", "secret2", false).await;
    let admin = login(app, "root", "rootpass", DESKTOP).await;
    let alice = login(app, "alice", "secret1", PHONE).await;
    (admin, alice)
}

fn names(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admins_see_everyone_others_see_non_admins() {
    let app = build_test_app();
    let (admin, alice) = seed(&app).await;

    let response = get(&app, "/api/v1/users", &admin, DESKTOP).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(names(&body_json(response).await), ["alice", "bob", "root"]);

    let response = get(&app, "/api/v1/users", &alice, PHONE).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(names(&json), ["alice", "bob"]);
    assert_eq!(json["data"][0]["isAdmin"], false);
    assert!(json["data"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn listing_requires_a_session() {
    let app = build_test_app();
    seed(&app).await;

    let response = get(&app, "/api/v1/users", &Jar::default(), DESKTOP).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_can_update_users() {
    let app = build_test_app();
    let (admin, _) = seed(&app).await;
    let bob = app.store.find_user_by_name("bob").await.unwrap().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/users/{}", bob.id),
        json!({ "name": "robert", "isAdmin": true }),
        &admin,
        DESKTOP,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "robert");
    assert_eq!(json["data"]["isAdmin"], true);

    let stored = app.store.find_user(bob.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "robert");
    assert_eq!(stored.password_hash, bob.password_hash);
}

#[tokio::test]
async fn admin_password_reset_lets_user_log_in_with_new_password() {
    let app = build_test_app();
    let (admin, _) = seed(&app).await;
    let bob = app.store.find_user_by_name("bob").await.unwrap().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/users/{}", bob.id),
        json!({ "pass": "brandnew" }),
        &admin,
        DESKTOP,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "bob", "brandnew", DESKTOP).await;
}

#[tokio::test]
async fn non_admin_cannot_update_users() {
    let app = build_test_app();
    let (_, alice) = seed(&app).await;
    let bob = app.store.find_user_by_name("bob").await.unwrap().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/users/{}", bob.id),
        json!({ "isAdmin": true }),
        &alice,
        PHONE,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!app.store.find_user(bob.id).await.unwrap().unwrap().is_admin);
}

#[tokio::test]
async fn updating_missing_user_is_not_found() {
    let app = build_test_app();
    let (admin, _) = seed(&app).await;

    let response = put_json(
        &app,
        &format!("/api/v1/users/{}", uuid_v7()),
        json!({ "name": "ghost" }),
        &admin,
        DESKTOP,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nobody_can_delete_themselves() {
    let app = build_test_app();
    let (admin, alice) = seed(&app).await;
    let root = app.store.find_user_by_name("root").await.unwrap().unwrap();
    let alice_user = app.store.find_user_by_name("alice").await.unwrap().unwrap();

    let response = delete(&app, &format!("/api/v1/users/{}", root.id), &admin, DESKTOP).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Cannot delete self");

    let response = delete(&app, &format!("/api/v1/users/{}", alice_user.id), &alice, PHONE).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.store.find_user(root.id).await.unwrap().is_some());
    assert!(app.store.find_user(alice_user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn non_admin_cannot_delete_others() {
    let app = build_test_app();
    let (_, alice) = seed(&app).await;
    let bob = app.store.find_user_by_name("bob").await.unwrap().unwrap();

    let response = delete(&app, &format!("/api/v1/users/{}", bob.id), &alice, PHONE).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.store.find_user(bob.id).await.unwrap().is_some());
}

#[tokio::test]
async fn admin_delete_removes_user_and_session() {
    let app = build_test_app();
    let (admin, mut alice) = seed(&app).await;
    let alice_user = app.store.find_user_by_name("alice").await.unwrap().unwrap();
    assert!(app.store.find_session(alice_user.id).await.unwrap().is_some());

    let response = delete(&app, &format!("/api/v1/users/{}", alice_user.id), &admin, DESKTOP).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(app.store.find_user(alice_user.id).await.unwrap().is_none());
    assert!(app.store.find_session(alice_user.id).await.unwrap().is_none());
    assert!(whoami(&app, &mut alice, PHONE).await.is_none());

    let again = delete(&app, &format!("/api/v1/users/{}", alice_user.id), &admin, DESKTOP).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Change password (requires a fresh access token)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn change_password_with_access_token() {
    let app = build_test_app();
    let (_, alice) = seed(&app).await;

    let response = put_json(
        &app,
        "/api/v1/users/me/password",
        json!({ "pass": "secret1", "newPass": "secret9" }),
        &alice,
        PHONE,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "alice", "secret9", PHONE).await;
}

#[tokio::test]
async fn change_password_rejects_wrong_current_password() {
    let app = build_test_app();
    let (_, alice) = seed(&app).await;

    let response = put_json(
        &app,
        "/api/v1/users/me/password",
        json!({ "pass": "wrong12", "newPass": "secret9" }),
        &alice,
        PHONE,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Current password is incorrect");
}

#[tokio::test]
async fn change_password_refuses_just_rotated_session() {
    let app = build_test_app();
    let (_, alice) = seed(&app).await;
    let mut rotated = Jar {
        refresh: alice.refresh.clone(),
        access: None,
    };

    let response = put_json(
        &app,
        "/api/v1/users/me/password",
        json!({ "pass": "secret1", "newPass": "secret9" }),
        &rotated,
        PHONE,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The rotation itself still went through, so a retry with the new access
    // token succeeds.
    rotated.absorb(&response);
    assert!(rotated.access.is_some());
    let retry = put_json(
        &app,
        "/api/v1/users/me/password",
        json!({ "pass": "secret1", "newPass": "secret9" }),
        &rotated,
        PHONE,
    )
    .await;
    assert_eq!(retry.status(), StatusCode::OK);
}

fn uuid_v7() -> uuid::Uuid {
    uuid::Uuid::now_v7()
}
