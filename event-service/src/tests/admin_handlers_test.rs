use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::{create_test_app, login, seed_event};
use volunteers_shared::models::RsvpStatus;
use volunteers_shared::store::RsvpStore;
use volunteers_shared::test_utils::http_test_utils::{create_test_request, response_to_json};

async fn register(app: &axum::Router, token: &str, event_id: &str, name: &str) {
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/rsvp/submit",
            Some(json!({
                "session_token": token,
                "event_id": event_id,
                "first_name": name,
                "last_name": "Volunteer",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_endpoints_reject_non_admins() {
    let (app, stores) = create_test_app();
    let token = login(&stores, "volunteer@example.org").await;

    for (path, payload) in [
        ("/admin/rsvps", json!({"session_token": token, "event_id": "evt-1"})),
        (
            "/admin/attendance",
            json!({
                "session_token": token,
                "event_id": "evt-1",
                "attendee_id": "someone@example.org",
                "status": "attended",
            }),
        ),
    ] {
        let response = app
            .clone()
            .oneshot(create_test_request("POST", path, Some(payload)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response_to_json(response).await;
        assert_eq!(body["message"], "Admin access required");
    }
}

#[tokio::test]
async fn admin_lists_every_rsvp_for_an_event() {
    let (app, stores) = create_test_app();
    let admin_token = login(&stores, "admin@example.org").await;
    let token_a = login(&stores, "a@example.org").await;
    let token_b = login(&stores, "b@example.org").await;
    seed_event(&stores, "evt-1", None);
    seed_event(&stores, "evt-2", None);

    register(&app, &token_a, "evt-1", "Ada").await;
    register(&app, &token_b, "evt-1", "Ben").await;
    register(&app, &token_a, "evt-2", "Ada").await;

    // One cancellation; it still shows on the admin list.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/rsvp/cancel",
            Some(json!({
                "session_token": token_b,
                "event_id": "evt-1",
                "attendee_id": "b@example.org",
                "attendee_type": "volunteer",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/admin/rsvps",
            Some(json!({"session_token": admin_token, "event_id": "evt-1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["active_count"], 1);

    let statuses: Vec<&str> = body["rsvps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"active") && statuses.contains(&"cancelled"));
}

#[tokio::test]
async fn attendance_marking_transitions_active_rsvps() {
    let (app, stores) = create_test_app();
    let admin_token = login(&stores, "admin@example.org").await;
    let token = login(&stores, "a@example.org").await;
    seed_event(&stores, "evt-1", None);
    register(&app, &token, "evt-1", "Ada").await;

    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/admin/attendance",
            Some(json!({
                "session_token": admin_token,
                "event_id": "evt-1",
                "attendee_id": "a@example.org",
                "status": "attended",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rsvp = stores
        .rsvps
        .get_rsvp("evt-1", "a@example.org")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rsvp.status, RsvpStatus::Attended);
    assert!(rsvp.attendance_marked_at.is_some());
}

#[tokio::test]
async fn attendance_rejects_bad_statuses_and_cancelled_rsvps() {
    let (app, stores) = create_test_app();
    let admin_token = login(&stores, "admin@example.org").await;
    let token = login(&stores, "a@example.org").await;
    seed_event(&stores, "evt-1", None);
    register(&app, &token, "evt-1", "Ada").await;

    // Unknown status value.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/admin/attendance",
            Some(json!({
                "session_token": admin_token,
                "event_id": "evt-1",
                "attendee_id": "a@example.org",
                "status": "present",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown RSVP.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/admin/attendance",
            Some(json!({
                "session_token": admin_token,
                "event_id": "evt-1",
                "attendee_id": "ghost@example.org",
                "status": "no_show",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A cancelled RSVP can't be marked.
    let response = app
        .clone()
        .oneshot(create_test_request(
            "POST",
            "/rsvp/cancel",
            Some(json!({
                "session_token": token,
                "event_id": "evt-1",
                "attendee_id": "a@example.org",
                "attendee_type": "volunteer",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(create_test_request(
            "POST",
            "/admin/attendance",
            Some(json!({
                "session_token": admin_token,
                "event_id": "evt-1",
                "attendee_id": "a@example.org",
                "status": "no_show",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_to_json(response).await;
    assert_eq!(body["message"], "Cannot mark a cancelled RSVP");
}
