use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use thiserror::Error;

/// Failures inside a store adapter. Never shown to callers directly; they are
/// logged and converted to a generic internal error at the handler boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Application-level error, rendered as the uniform failure envelope
/// `{"success": false, "message": ...}` with the matching HTTP status.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing, unknown or otherwise unusable session token (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Token resolved to a session past its expiry (401 externally, kept
    /// separate from Unauthenticated for logging).
    #[error("{0}")]
    SessionExpired(String),

    /// Valid session, but not the owner of the resource / not an admin (403).
    #[error("{0}")]
    Forbidden(String),

    /// Malformed input or a domain-rule violation (400).
    #[error("{0}")]
    Validation(String),

    /// Resource key did not resolve (404).
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure (500). Detail is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn unauthenticated(message: String) -> Self {
        AppError::Unauthenticated(message)
    }

    pub fn forbidden(message: String) -> Self {
        AppError::Forbidden(message)
    }

    pub fn validation(message: String) -> Self {
        AppError::Validation(message)
    }

    pub fn not_found(message: String) -> Self {
        AppError::NotFound(message)
    }

    pub fn internal_server_error(message: String) -> Self {
        AppError::Internal(message)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) | AppError::SessionExpired(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            AppError::SessionExpired(msg) => {
                warn!("Rejected expired session");
                msg.clone()
            }
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "message": message,
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Internal(other.to_string()),
        }
    }
}
