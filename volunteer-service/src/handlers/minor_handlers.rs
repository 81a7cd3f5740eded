use axum::{extract::State, Json};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use volunteers_shared::auth::validate_session;
use volunteers_shared::error::{AppError, Result};
use volunteers_shared::models::{now_str, Minor, RsvpStatus};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};
use volunteers_shared::validation::{
    age_on, check_minor_eligibility, is_valid_email, parse_birth_date, require_fields,
};

use crate::handlers::{require_token, AppState};
use crate::models::{AddMinorRequest, DeleteMinorRequest, SessionTokenRequest, UpdateMinorRequest};

fn minor_json(minor: &Minor) -> serde_json::Value {
    serde_json::json!({
        "minor_id": minor.minor_id,
        "first_name": minor.first_name,
        "last_name": minor.last_name,
        "date_of_birth": minor.date_of_birth,
        "age": minor.age,
        "email": minor.email,
    })
}

/// Cleans up an optional email field: blank clears it, anything else must
/// look like an email and is lowercased.
fn normalize_optional_email(email: &Option<String>) -> Result<Option<String>> {
    match email.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            if !is_valid_email(value) {
                return Err(AppError::validation("Invalid email format".to_string()));
            }
            Ok(Some(value.to_lowercase()))
        }
    }
}

// POST /minors/add
pub async fn add_minor<SS, MS, WS, ES, RS>(
    State(state): State<Arc<AppState<SS, MS, WS, ES, RS>>>,
    Json(request): Json<AddMinorRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;

    require_fields(&[
        ("first_name", request.first_name.as_deref()),
        ("last_name", request.last_name.as_deref()),
        ("date_of_birth", request.date_of_birth.as_deref()),
    ])?;

    let date_of_birth = request.date_of_birth.as_deref().unwrap();
    let dob = parse_birth_date(date_of_birth)?;
    let age = check_minor_eligibility(dob, Utc::now().date_naive())?;

    let email = normalize_optional_email(&request.email)?;

    info!("Adding minor for guardian account");

    let created_at = now_str();
    let minor = Minor {
        guardian_email: identity.email,
        minor_id: Uuid::new_v4().to_string(),
        first_name: request.first_name.unwrap(),
        last_name: request.last_name.unwrap(),
        date_of_birth: date_of_birth.to_string(),
        age,
        email,
        created_at: created_at.clone(),
        updated_at: created_at,
    };

    state.minors.put_minor(minor.clone()).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Minor added successfully",
        "minor": minor_json(&minor),
    })))
}

// POST /minors/update
pub async fn update_minor<SS, MS, WS, ES, RS>(
    State(state): State<Arc<AppState<SS, MS, WS, ES, RS>>>,
    Json(request): Json<UpdateMinorRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;

    require_fields(&[("minor_id", request.minor_id.as_deref())])?;
    let minor_id = request.minor_id.as_deref().unwrap();

    // The key is scoped by the session's guardian email, so another
    // guardian's minor is simply not found here.
    let mut minor = state
        .minors
        .get_minor(&identity.email, minor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Minor not found".to_string()))?;

    if let Some(first_name) = request.first_name.filter(|v| !v.trim().is_empty()) {
        minor.first_name = first_name;
    }
    if let Some(last_name) = request.last_name.filter(|v| !v.trim().is_empty()) {
        minor.last_name = last_name;
    }
    if let Some(date_of_birth) = request.date_of_birth.filter(|v| !v.trim().is_empty()) {
        parse_birth_date(&date_of_birth)?;
        minor.date_of_birth = date_of_birth;
    }
    if request.email.is_some() {
        minor.email = normalize_optional_email(&request.email)?;
    }

    // Eligibility holds on the record as updated, whether or not the birth
    // date changed.
    let dob = parse_birth_date(&minor.date_of_birth)?;
    minor.age = check_minor_eligibility(dob, Utc::now().date_naive())?;
    minor.updated_at = now_str();

    state.minors.put_minor(minor.clone()).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Minor updated successfully",
        "minor": minor_json(&minor),
    })))
}

// POST /minors/delete
pub async fn delete_minor<SS, MS, WS, ES, RS>(
    State(state): State<Arc<AppState<SS, MS, WS, ES, RS>>>,
    Json(request): Json<DeleteMinorRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;

    require_fields(&[("minor_id", request.minor_id.as_deref())])?;
    let minor_id = request.minor_id.as_deref().unwrap();

    let minor = state
        .minors
        .get_minor(&identity.email, minor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Minor not found".to_string()))?;

    state
        .minors
        .delete_minor(&identity.email, &minor.minor_id)
        .await?;

    // Cancel the minor's registrations for events that haven't happened yet.
    // Best-effort: a failure here doesn't undo the deletion.
    let cancelled = cancel_future_rsvps(&state, &minor.minor_id).await;

    info!("Minor deleted; cancelled {} future RSVP(s)", cancelled);

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Minor deleted successfully",
        "cancelled_rsvps": cancelled,
    })))
}

async fn cancel_future_rsvps<SS, MS, WS, ES, RS>(
    state: &AppState<SS, MS, WS, ES, RS>,
    attendee_id: &str,
) -> usize
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    let rsvps = match state.rsvps.get_rsvps_by_attendee(attendee_id).await {
        Ok(rsvps) => rsvps,
        Err(e) => {
            warn!("Failed to look up RSVPs for deleted minor: {}", e);
            return 0;
        }
    };

    let now = Utc::now();
    let mut cancelled = 0;
    for mut rsvp in rsvps.into_iter().filter(|r| r.is_active()) {
        let starts_in_future = match state.events.get_event(&rsvp.event_id).await {
            Ok(Some(event)) => event
                .start_time
                .as_deref()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|start| start.with_timezone(&Utc) > now)
                .unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to fetch event {} during cascade: {}", rsvp.event_id, e);
                false
            }
        };
        if !starts_in_future {
            continue;
        }

        rsvp.status = RsvpStatus::Cancelled;
        rsvp.cancelled_at = Some(now_str());
        rsvp.updated_at = now_str();
        match state.rsvps.put_rsvp(rsvp).await {
            Ok(()) => cancelled += 1,
            Err(e) => warn!("Failed to cancel RSVP during cascade: {}", e),
        }
    }
    cancelled
}

// POST /minors/list
pub async fn list_minors<SS, MS, WS, ES, RS>(
    State(state): State<Arc<AppState<SS, MS, WS, ES, RS>>>,
    Json(request): Json<SessionTokenRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;

    let mut minors = state.minors.get_minors_by_guardian(&identity.email).await?;

    // Ages are derived data; recompute on every read.
    let today = Utc::now().date_naive();
    for minor in &mut minors {
        if let Ok(dob) = parse_birth_date(&minor.date_of_birth) {
            let age = age_on(dob, today);
            if age >= 0 {
                minor.age = age as u32;
            }
        }
    }

    minors.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    let listed: Vec<_> = minors.iter().map(minor_json).collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "minors": listed,
        "total": listed.len(),
    })))
}
