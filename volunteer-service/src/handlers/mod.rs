pub mod admin_handlers;
pub mod dashboard;
pub mod minor_handlers;
pub mod waiver_handlers;

use std::sync::Arc;

use volunteers_shared::error::{AppError, Result};

pub struct AppState<SS, MS, WS, ES, RS> {
    pub sessions: Arc<SS>,
    pub minors: Arc<MS>,
    pub waivers: Arc<WS>,
    pub events: Arc<ES>,
    pub rsvps: Arc<RS>,
}

/// Pulls the session token out of a request body; its absence is a 401, not a
/// 400, because the caller isn't authenticated at all.
pub fn require_token(token: &Option<String>) -> Result<&str> {
    token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthenticated("Session token is required".to_string()))
}
