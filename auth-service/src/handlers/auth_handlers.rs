use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use log::{error, info, warn};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use volunteers_shared::auth::validate_session;
use volunteers_shared::config;
use volunteers_shared::error::{AppError, Result};
use volunteers_shared::models::{now_str, AuthCode, Session};
use volunteers_shared::store::{AuthCodeStore, SessionStore};
use volunteers_shared::validation::is_valid_email;

use crate::handlers::email::send_verification_email;
use crate::models::{SendCodeRequest, SessionTokenRequest, VerifyCodeRequest};

/// Verification codes are good for 15 minutes.
const CODE_TTL_MINUTES: i64 = 15;
/// Sessions are good for 24 hours; re-authentication mints a fresh token.
const SESSION_TTL_HOURS: i64 = 24;
/// A code is invalidated after this many wrong guesses.
const MAX_CODE_ATTEMPTS: u32 = 5;

pub struct AppState<CS, SS> {
    pub codes: Arc<CS>,
    pub sessions: Arc<SS>,
}

// POST /auth/send-code
pub async fn send_code<CS, SS>(
    State(state): State<Arc<AppState<CS, SS>>>,
    Json(request): Json<SendCodeRequest>,
) -> Result<Json<serde_json::Value>>
where
    CS: AuthCodeStore + 'static,
    SS: SessionStore + 'static,
{
    let email = request
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("Missing required parameter: email".to_string()))?;

    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email format".to_string()));
    }

    // Generate the code before any await; the RNG guard is not Send.
    let validation_code: String = {
        let mut rng = rand::thread_rng();
        (0..6).map(|_| rng.gen_range(0..10).to_string()).collect()
    };

    let expiration_time = (Utc::now() + Duration::minutes(CODE_TTL_MINUTES)).to_rfc3339();

    state
        .codes
        .put_code(AuthCode {
            email: email.clone(),
            validation_code: validation_code.clone(),
            created_at: now_str(),
            expiration_time,
            attempts: 0,
        })
        .await?;

    // Email delivery is best-effort: the code is stored either way, so a
    // transient SES failure must not turn into a 500 for the caller.
    if let Err(e) = send_verification_email(&email, &validation_code).await {
        error!("Failed to send verification email: {}", e);
    } else {
        info!("Validation code sent");
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Validation code sent successfully"
    })))
}

// POST /auth/verify-code
pub async fn verify_code<CS, SS>(
    State(state): State<Arc<AppState<CS, SS>>>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<serde_json::Value>>
where
    CS: AuthCodeStore + 'static,
    SS: SessionStore + 'static,
{
    let (email, submitted_code) = match (&request.email, &request.validation_code) {
        (Some(email), Some(code)) if !email.trim().is_empty() && !code.is_empty() => {
            (email.trim().to_lowercase(), code.clone())
        }
        _ => {
            return Err(AppError::validation(
                "Missing required parameters: email, validation_code".to_string(),
            ))
        }
    };

    let mut code_record = state
        .codes
        .get_code(&email)
        .await?
        .ok_or_else(|| AppError::validation("Invalid or expired validation code".to_string()))?;

    if code_record.validation_code != submitted_code {
        code_record.attempts += 1;
        if code_record.attempts >= MAX_CODE_ATTEMPTS {
            warn!("Validation code invalidated after too many attempts");
            state.codes.delete_code(&email).await?;
            return Err(AppError::validation(
                "Too many incorrect attempts. Please request a new code.".to_string(),
            ));
        }
        state.codes.put_code(code_record).await?;
        return Err(AppError::validation("Invalid validation code".to_string()));
    }

    let expired = chrono::DateTime::parse_from_rfc3339(&code_record.expiration_time)
        .map(|t| t <= Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(AppError::validation(
            "Validation code has expired".to_string(),
        ));
    }

    // Mint a fresh session. Tokens are never reused across logins.
    let session_token = Uuid::new_v4().to_string();
    let expires_at = (Utc::now() + Duration::hours(SESSION_TTL_HOURS)).to_rfc3339();
    let session = Session {
        session_token: session_token.clone(),
        session_id: Uuid::new_v4().to_string(),
        email: email.clone(),
        created_at: now_str(),
        expires_at: expires_at.clone(),
        last_accessed: None,
    };

    state.sessions.put_session(session).await?;
    state.codes.delete_code(&email).await?;

    info!("Authentication successful, session created");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Authentication successful",
        "session_token": session_token,
        "expires_at": expires_at,
        "email": email
    })))
}

// POST /auth/validate-session
pub async fn validate_session_handler<CS, SS>(
    State(state): State<Arc<AppState<CS, SS>>>,
    Json(request): Json<SessionTokenRequest>,
) -> Result<Json<serde_json::Value>>
where
    CS: AuthCodeStore + 'static,
    SS: SessionStore + 'static,
{
    let token = request.session_token.as_deref().ok_or_else(|| {
        AppError::validation("Missing required parameter: session_token".to_string())
    })?;

    let identity = validate_session(&*state.sessions, token).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "valid": true,
        "email": identity.email,
        "expires_at": identity.expires_at,
        "is_admin": config::is_admin(&identity.email)
    })))
}

// POST /auth/logout
pub async fn logout<CS, SS>(
    State(state): State<Arc<AppState<CS, SS>>>,
    Json(request): Json<SessionTokenRequest>,
) -> Result<Json<serde_json::Value>>
where
    CS: AuthCodeStore + 'static,
    SS: SessionStore + 'static,
{
    let token = request.session_token.as_deref().ok_or_else(|| {
        AppError::validation("Missing required parameter: session_token".to_string())
    })?;

    // Idempotent: logging out an already-terminal session is still a success.
    state.sessions.delete_session(token).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}
