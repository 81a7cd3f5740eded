
use axum::Router;
use chrono::{Duration, Utc};
use std::env;
use std::sync::Arc;

use crate::routes::create_router_with_stores;
use volunteers_shared::models::{now_str, Session};
use volunteers_shared::store::SessionStore;
use volunteers_shared::test_utils::mock_stores::{
    MockEventStore, MockMinorStore, MockRsvpStore, MockSessionStore, MockWaiverStore,
};
use volunteers_shared::test_utils::test_logging::init_test_logging;

pub struct TestStores {
    pub sessions: Arc<MockSessionStore>,
    pub minors: Arc<MockMinorStore>,
    pub waivers: Arc<MockWaiverStore>,
    pub events: Arc<MockEventStore>,
    pub rsvps: Arc<MockRsvpStore>,
}

pub fn create_test_app() -> (Router, TestStores) {
    init_test_logging();
    env::set_var("ADMIN_EMAILS", "admin@example.org");

    let stores = TestStores {
        sessions: Arc::new(MockSessionStore::new()),
        minors: Arc::new(MockMinorStore::new()),
        waivers: Arc::new(MockWaiverStore::new()),
        events: Arc::new(MockEventStore::new()),
        rsvps: Arc::new(MockRsvpStore::new()),
    };

    let app = create_router_with_stores(
        stores.sessions.clone(),
        stores.minors.clone(),
        stores.waivers.clone(),
        stores.events.clone(),
        stores.rsvps.clone(),
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

/// A YYYY-MM-DD date exactly `years` years before today.
pub fn years_ago(years: i32) -> String {
    use chrono::Datelike;
    let today = Utc::now().date_naive();
    today
        .with_year(today.year() - years)
        .unwrap_or_else(|| today - Duration::days(365 * years as i64))
        .format("%Y-%m-%d")
        .to_string()
}
