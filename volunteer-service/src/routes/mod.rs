use axum::{extract::Request, middleware, routing::post, Router};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::admin_handlers::admin_volunteers;
use crate::handlers::dashboard::get_dashboard;
use crate::handlers::minor_handlers::{add_minor, delete_minor, list_minors, update_minor};
use crate::handlers::waiver_handlers::{check_waiver, submit_waiver};
use crate::handlers::AppState;
use volunteers_shared::store::dynamo::{
    DynamoEventStore, DynamoMinorStore, DynamoRsvpStore, DynamoSessionStore, DynamoWaiverStore,
};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};

/// Creates a router with the default stores
pub async fn create_router() -> Router {
    info!("Creating router with DynamoDB stores");

    let sessions = Arc::new(DynamoSessionStore::new().await);
    let minors = Arc::new(DynamoMinorStore::new().await);
    let waivers = Arc::new(DynamoWaiverStore::new().await);
    let events = Arc::new(DynamoEventStore::new().await);
    let rsvps = Arc::new(DynamoRsvpStore::new().await);

    // Check if we should remove the base path prefix
    let remove_base_path = std::env::var("REMOVE_BASE_PATH")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    let prefix = if remove_base_path { "" } else { "/Prod" };
    info!("Using API route prefix: {}", prefix);

    create_router_with_stores(sessions, minors, waivers, events, rsvps, prefix)
}

/// Creates a router with the given store implementations
pub fn create_router_with_stores<SS, MS, WS, ES, RS>(
    sessions: Arc<SS>,
    minors: Arc<MS>,
    waivers: Arc<WS>,
    events: Arc<ES>,
    rsvps: Arc<RS>,
    prefix: &str,
) -> Router
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    info!("Setting up volunteer API routes with prefix: '{}'", prefix);

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
        minors,
        waivers,
        events,
        rsvps,
    });

    let api_routes = Router::new()
        .route("/minors/add", post(add_minor))
        .route("/minors/update", post(update_minor))
        .route("/minors/delete", post(delete_minor))
        .route("/minors/list", post(list_minors))
        .route("/waiver/submit", post(submit_waiver))
        .route("/waiver/check", post(check_waiver))
        .route("/dashboard", post(get_dashboard))
        .route("/admin/volunteers", post(admin_volunteers))
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
