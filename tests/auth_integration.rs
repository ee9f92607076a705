mod common;

use chirpy::auth::{issue_access_token, AccessToken};
use chrono::Duration;
use common::{spawn_app, JWT_SECRET};
use serde_json::{json, Value};
use uuid::Uuid;

// --- Registration Tests ---

#[tokio::test]
async fn create_user_returns_201_without_password() {
    let app = spawn_app();

    let user = app.create_user("saul@bettercall.com", "123456").await;

    assert_eq!(user["email"], "saul@bettercall.com");
    assert_eq!(user["is_chirpy_red"], false);
    assert!(user["id"].as_str().and_then(|id| Uuid::parse_str(id).ok()).is_some());
    assert!(user.get("password").is_none());
    assert!(user.get("hashed_password").is_none());
}

#[tokio::test]
async fn create_user_rejects_invalid_input() {
    let app = spawn_app();
    let test_cases = vec![
        (json!({"email": "", "password": "123456"}), "empty email"),
        (json!({"email": "not-an-email", "password": "123456"}), "invalid email"),
        (json!({"email": "saul@bettercall.com", "password": ""}), "empty password"),
        (json!({"email": "saul@bettercall.com"}), "missing password"),
        (
            json!({"email": "saul@bettercall.com", "password": "a".repeat(73)}),
            "password over 72 bytes",
        ),
    ];

    for (body, description) in test_cases {
        let response = app
            .client
            .post(app.url("/api/users"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(400, response.status().as_u16(), "Case failed: {}", description);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string(), "Case failed: {}", description);
    }
}

#[tokio::test]
async fn create_user_rejects_duplicate_email() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com", "123456").await;

    let response = app
        .client
        .post(app.url("/api/users"))
        .json(&json!({"email": "saul@bettercall.com", "password": "other"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(409, response.status().as_u16());
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_user_and_both_tokens() {
    let app = spawn_app();
    let user = app.create_user("saul@bettercall.com", "123456").await;

    let response = app.login("saul@bettercall.com", "123456").await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], user["id"]);
    assert_eq!(body["email"], "saul@bettercall.com");
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(body["refresh_token"].as_str().unwrap().len(), 64);

    let record = app
        .store
        .refresh_token(body["refresh_token"].as_str().unwrap())
        .expect("refresh token stored");
    assert!(record.revoked_at.is_none());
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let app = spawn_app();
    app.create_user("saul@bettercall.com", "123456").await;

    let wrong_password = app.login("saul@bettercall.com", "wrong").await;
    let unknown_email = app.login("kim@wexler.com", "123456").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_email: Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password["error"], "Incorrect email or password");
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn login_rejects_password_sharing_72_byte_prefix() {
    let app = spawn_app();
    let password = "a".repeat(72);
    app.create_user("saul@bettercall.com", &password).await;

    let response = app
        .login("saul@bettercall.com", &format!("{}attacker", password))
        .await;
    assert_eq!(401, response.status().as_u16());

    let response = app.login("saul@bettercall.com", &password).await;
    assert_eq!(200, response.status().as_u16());
}

// --- Update Tests ---

#[tokio::test]
async fn update_user_replaces_email_and_password() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(session["token"].as_str().unwrap())
        .json(&json!({"email": "jimmy@mcgill.com", "password": "654321"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "jimmy@mcgill.com");
    assert_eq!(body["id"], session["id"]);

    assert_eq!(401, app.login("saul@bettercall.com", "123456").await.status().as_u16());
    assert_eq!(200, app.login("jimmy@mcgill.com", "654321").await.status().as_u16());
}

#[tokio::test]
async fn update_user_requires_access_token() {
    let app = spawn_app();

    let response = app
        .client
        .put(app.url("/api/users"))
        .json(&json!({"email": "jimmy@mcgill.com", "password": "654321"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
}

// --- Refresh / Revoke Tests ---

#[tokio::test]
async fn refresh_returns_new_access_token() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    let response = app
        .post_with_bearer("/api/refresh", session["refresh_token"].as_str().unwrap())
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let token = AccessToken::from_bearer(body["token"].as_str().unwrap().to_string());
    let user_id = chirpy::auth::validate_access_token(&token, JWT_SECRET).unwrap();
    assert_eq!(user_id.to_string(), session["id"].as_str().unwrap());
}

#[tokio::test]
async fn refresh_fails_after_revoke() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let response = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());
    assert!(app.store.refresh_token(refresh_token).unwrap().revoked_at.is_some());

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn access_token_is_rejected_as_refresh_token() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;

    let response = app
        .post_with_bearer("/api/refresh", session["token"].as_str().unwrap())
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_and_revoke_require_bearer_header() {
    let app = spawn_app();

    for path in ["/api/refresh", "/api/revoke"] {
        let response = app
            .client
            .post(app.url(path))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(401, response.status().as_u16(), "Case failed: {}", path);
    }
}

#[tokio::test]
async fn revoke_unknown_token_fails() {
    let app = spawn_app();

    let response = app.post_with_bearer("/api/revoke", "deadbeef").await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;
    let user_id = Uuid::parse_str(session["id"].as_str().unwrap()).unwrap();
    let expired = issue_access_token(user_id, JWT_SECRET, Duration::seconds(-60)).unwrap();

    let response = app
        .client
        .post(app.url("/api/chirps"))
        .bearer_auth(expired.as_str())
        .json(&json!({"body": "I'm the one who knocks!"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let app = spawn_app();
    let session = app.signed_in_user("saul@bettercall.com", "123456").await;
    let user_id = Uuid::parse_str(session["id"].as_str().unwrap()).unwrap();
    let forged = issue_access_token(user_id, "not-the-secret", Duration::hours(1)).unwrap();

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(forged.as_str())
        .json(&json!({"email": "mallory@evil.com", "password": "pwned"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
}
