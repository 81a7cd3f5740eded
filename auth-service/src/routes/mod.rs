use axum::{extract::Request, middleware, routing::post, Router};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::auth_handlers::{
    logout, send_code, validate_session_handler, verify_code, AppState,
};
use volunteers_shared::store::dynamo::{DynamoAuthCodeStore, DynamoSessionStore};
use volunteers_shared::store::{AuthCodeStore, SessionStore};

/// Creates a router with the default stores
pub async fn create_router() -> Router {
    info!("Creating router with DynamoDB stores");

    let codes = Arc::new(DynamoAuthCodeStore::new().await);
    let sessions = Arc::new(DynamoSessionStore::new().await);

    // Check if we should remove the base path prefix
    let remove_base_path = std::env::var("REMOVE_BASE_PATH")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    let prefix = if remove_base_path { "" } else { "/Prod" };
    info!("Using API route prefix: {}", prefix);

    create_router_with_stores(codes, sessions, prefix)
}

/// Creates a router with the given store implementations
pub fn create_router_with_stores<CS, SS>(
    codes: Arc<CS>,
    sessions: Arc<SS>,
    prefix: &str,
) -> Router
where
    CS: AuthCodeStore + 'static,
    SS: SessionStore + 'static,
{
    info!("Setting up auth API routes with prefix: '{}'", prefix);

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

    let state = Arc::new(AppState { codes, sessions });

    let api_routes = Router::new()
        .route("/auth/send-code", post(send_code))
        .route("/auth/verify-code", post(verify_code))
        .route("/auth/validate-session", post(validate_session_handler))
        .route("/auth/logout", post(logout))
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
