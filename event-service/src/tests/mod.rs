mod admin_handlers_test;

use axum::Router;
use chrono::{Duration, Utc};
use std::env;
use std::sync::Arc;

use crate::routes::create_router_with_stores;
use volunteers_shared::models::{now_str, Event, Minor, Session};
use volunteers_shared::store::{MinorStore, SessionStore};
use volunteers_shared::test_utils::mock_stores::{
    MockEventStore, MockMinorStore, MockRsvpStore, MockSessionStore,
};
use volunteers_shared::test_utils::test_logging::init_test_logging;

pub struct TestStores {
    pub sessions: Arc<MockSessionStore>,
    pub events: Arc<MockEventStore>,
    pub rsvps: Arc<MockRsvpStore>,
    pub minors: Arc<MockMinorStore>,
}

pub fn create_test_app() -> (Router, TestStores) {
    init_test_logging();
    env::set_var("ADMIN_EMAILS", "admin@example.org");

    let stores = TestStores {
        sessions: Arc::new(MockSessionStore::new()),
        events: Arc::new(MockEventStore::new()),
        rsvps: Arc::new(MockRsvpStore::new()),
        minors: Arc::new(MockMinorStore::new()),
    };

    let app = create_router_with_stores(
        stores.sessions.clone(),
        stores.events.clone(),
        stores.rsvps.clone(),
        stores.minors.clone(),
        "",
    );
    (app, stores)
}

/// Seeds a live 24-hour session and returns its token.
pub async fn login(stores: &TestStores, email: &str) -> String {
    let token = format!("tok-{}", email);
    stores
        .sessions
        .put_session(Session {
            session_token: token.clone(),
            session_id: format!("sess-{}", email),
            email: email.to_string(),
            created_at: now_str(),
            expires_at: (Utc::now() + Duration::hours(24)).to_rfc3339(),
            last_accessed: None,
        })
        .await
        .unwrap();
    token
}

/// Seeds an event starting in a week with the given cap.
pub fn seed_event(stores: &TestStores, event_id: &str, attendance_cap: Option<u32>) {
    stores.events.insert_event(Event {
        event_id: event_id.to_string(),
        title: format!("Cleanup {}", event_id),
        description: None,
        start_time: Some((Utc::now() + Duration::days(7)).to_rfc3339()),
        end_time: None,
        location: None,
        status: "active".to_string(),
        attendance_cap,
    });
}

pub async fn seed_minor(stores: &TestStores, guardian_email: &str, minor_id: &str) {
    stores
        .minors
        .put_minor(Minor {
            guardian_email: guardian_email.to_string(),
            minor_id: minor_id.to_string(),
            first_name: "Sam".to_string(),
            last_name: "Rivera".to_string(),
            date_of_birth: "2016-05-09".to_string(),
            age: 10,
            email: None,
            created_at: now_str(),
            updated_at: now_str(),
        })
        .await
        .unwrap();
}
