use axum::{extract::Request, middleware, routing::post, Router};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::admin_handlers::{list_event_rsvps, mark_attendance};
use crate::handlers::rsvp_handlers::{cancel_rsvp, check_rsvp, submit_rsvp};
use crate::handlers::AppState;
use volunteers_shared::store::dynamo::{
    DynamoEventStore, DynamoMinorStore, DynamoRsvpStore, DynamoSessionStore,
};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore};

/// Creates a router with the default stores
pub async fn create_router() -> Router {
    info!("Creating router with DynamoDB stores");

    let sessions = Arc::new(DynamoSessionStore::new().await);
    let events = Arc::new(DynamoEventStore::new().await);
    let rsvps = Arc::new(DynamoRsvpStore::new().await);
    let minors = Arc::new(DynamoMinorStore::new().await);

    // Check if we should remove the base path prefix
    let remove_base_path = std::env::var("REMOVE_BASE_PATH")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    let prefix = if remove_base_path { "" } else { "/Prod" };
    info!("Using API route prefix: {}", prefix);

    create_router_with_stores(sessions, events, rsvps, minors, prefix)
}

/// Creates a router with the given store implementations
pub fn create_router_with_stores<SS, ES, RS, MS>(
    sessions: Arc<SS>,
    events: Arc<ES>,
    rsvps: Arc<RS>,
    minors: Arc<MS>,
    prefix: &str,
) -> Router
where
    SS: SessionStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
    MS: MinorStore + 'static,
{
    info!("Setting up event API routes with prefix: '{}'", prefix);

    // Permissive CORS; the OPTIONS preflight is answered here with a 200.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let state = Arc::new(AppState {
        sessions,
        events,
        rsvps,
        minors,
    });

    let api_routes = Router::new()
        .route("/rsvp/submit", post(submit_rsvp))
        .route("/rsvp/cancel", post(cancel_rsvp))
        .route("/rsvp/check", post(check_rsvp))
        .route("/admin/rsvps", post(list_event_rsvps))
        .route("/admin/attendance", post(mark_attendance))
        .with_state(state);

    let router = if prefix.is_empty() {
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            axum::http::StatusCode::NOT_FOUND,
            "The requested resource was not found".to_string(),
        )
    })
}
