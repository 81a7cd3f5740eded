use axum::{http::StatusCode, Router};
use chrono::{Duration, Utc};
use serde_json::json;
use std::env;
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_router_with_stores;
use volunteers_shared::models::{now_str, Session};
use volunteers_shared::store::{AuthCodeStore, SessionStore};
use volunteers_shared::test_utils::http_test_utils::{create_test_request, response_to_json};
use volunteers_shared::test_utils::mock_stores::{MockAuthCodeStore, MockSessionStore};
use volunteers_shared::test_utils::test_logging::init_test_logging;

fn create_test_app() -> (Router, Arc<MockAuthCodeStore>, Arc<MockSessionStore>) {
    init_test_logging();

    // Skip actual SES sends and pin the admin allow-list for every test.
    env::set_var("TEST_EMAIL", "true");
    env::set_var("ADMIN_EMAILS", "admin@example.org");

    let codes = Arc::new(MockAuthCodeStore::new());
    let sessions = Arc::new(MockSessionStore::new());
    let app = create_router_with_stores(codes.clone(), sessions.clone(), "");
    (app, codes, sessions)
}

fn seed_session(token: &str, email: &str, expires_at: String) -> Session {
    Session {
        session_token: token.to_string(),
        session_id: "sess-test".to_string(),
        email: email.to_string(),
        created_at: now_str(),
        expires_at,
        last_accessed: None,
    }
}

#[tokio::test]
async fn send_code_requires_email() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(create_test_request("POST", "/auth/send-code", Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn send_code_rejects_malformed_email() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/send-code",
            Some(json!({"email": "not-an-email"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_code_stores_a_six_digit_code() {
    let (app, codes, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/send-code",
            Some(json!({"email": "  A@B.com "})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["success"], true);

    // Email is normalized before it becomes a key.
    let stored = codes.get_code("a@b.com").await.unwrap().unwrap();
    assert_eq!(stored.validation_code.len(), 6);
    assert!(stored.validation_code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(stored.attempts, 0);
}

#[tokio::test]
async fn verify_code_rejects_wrong_code() {
    let (app, codes, _) = create_test_app();

    app.clone()
        .oneshot(create_test_request(
            "POST",
            "/auth/send-code",
            Some(json!({"email": "a@b.com"})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/verify-code",
            Some(json!({"email": "a@b.com", "validation_code": "000000x"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body["message"], "Invalid validation code");

    // Wrong guesses are counted against the code.
    let stored = codes.get_code("a@b.com").await.unwrap().unwrap();
    assert_eq!(stored.attempts, 1);
}

#[tokio::test]
async fn verify_code_rejects_expired_code() {
    let (app, codes, _) = create_test_app();

    codes
        .put_code(volunteers_shared::models::AuthCode {
            email: "a@b.com".to_string(),
            validation_code: "123456".to_string(),
            created_at: now_str(),
            expiration_time: (Utc::now() - Duration::minutes(1)).to_rfc3339(),
            attempts: 0,
        })
        .await
        .unwrap();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/verify-code",
            Some(json!({"email": "a@b.com", "validation_code": "123456"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body["message"], "Validation code has expired");
}

#[tokio::test]
async fn full_login_flow_then_expiry() {
    let (app, codes, sessions) = create_test_app();

    // Request a code.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/auth/send-code",
            Some(json!({"email": "a@b.com"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let issued = codes.get_code("a@b.com").await.unwrap().unwrap();

    // Verify it: a fresh session comes back.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/auth/verify-code",
            Some(json!({"email": "a@b.com", "validation_code": issued.validation_code})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "a@b.com");
    let token = body["session_token"].as_str().unwrap().to_string();

    // The used code is gone.
    assert!(codes.get_code("a@b.com").await.unwrap().is_none());

    // The token validates and resolves to the email.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/auth/validate-session",
            Some(json!({"session_token": token})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["is_admin"], false);

    // Force the session past its expiry: validation now fails.
    let mut session = sessions.get_session(&token).await.unwrap().unwrap();
    session.expires_at = (Utc::now() - Duration::hours(1)).to_rfc3339();
    sessions.put_session(session).await.unwrap();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/validate-session",
            Some(json!({"session_token": token})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validate_session_touches_last_accessed() {
    let (app, _, sessions) = create_test_app();

    let token = "tok-touch";
    sessions
        .put_session(seed_session(
            token,
            "a@b.com",
            (Utc::now() + Duration::hours(24)).to_rfc3339(),
        ))
        .await
        .unwrap();

    let before = now_str();
    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/validate-session",
            Some(json!({"session_token": token})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let session = sessions.get_session(token).await.unwrap().unwrap();
    let last_accessed = session.last_accessed.unwrap();
    assert!(last_accessed.as_str() >= before.as_str());
}

#[tokio::test]
async fn validate_session_reports_admin_flag() {
    let (app, _, sessions) = create_test_app();

    sessions
        .put_session(seed_session(
            "tok-admin",
            "admin@example.org",
            (Utc::now() + Duration::hours(24)).to_rfc3339(),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/validate-session",
            Some(json!({"session_token": "tok-admin"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/validate-session",
            Some(json!({"session_token": "nope"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_to_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn logout_terminates_the_session() {
    let (app, _, sessions) = create_test_app();

    sessions
        .put_session(seed_session(
            "tok-logout",
            "a@b.com",
            (Utc::now() + Duration::hours(24)).to_rfc3339(),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/auth/logout",
            Some(json!({"session_token": "tok-logout"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The session is terminal: the token never validates again.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/auth/validate-session",
            Some(json!({"session_token": "tok-logout"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logout is idempotent.
    let response = app
        .oneshot(create_test_request(
            "POST",
            "/auth/logout",
            Some(json!({"session_token": "tok-logout"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
