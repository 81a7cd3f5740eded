pub mod admin_handlers;
pub mod rsvp_handlers;

use std::sync::Arc;

use volunteers_shared::error::{AppError, Result};

pub struct AppState<SS, ES, RS, MS> {
    pub sessions: Arc<SS>,
    pub events: Arc<ES>,
    pub rsvps: Arc<RS>,
    pub minors: Arc<MS>,
}

/// Pulls the session token out of a request body; its absence is a 401, not a
/// 400, because the caller isn't authenticated at all.
pub fn require_token(token: &Option<String>) -> Result<&str> {
    token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthenticated("Session token is required".to_string()))
}
