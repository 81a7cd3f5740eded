use axum::{extract::State, Json};
use log::info;
use std::sync::Arc;

use volunteers_shared::auth::{require_admin, validate_session};
use volunteers_shared::error::{AppError, Result};
use volunteers_shared::models::{now_str, RsvpStatus};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore};
use volunteers_shared::validation::require_fields;

use crate::handlers::{require_token, AppState};
use crate::models::{ListRsvpsRequest, MarkAttendanceRequest};

// POST /admin/rsvps
//
// Every RSVP for an event, cancelled ones included, for the coordinator's
// roll sheet.
pub async fn list_event_rsvps<SS, ES, RS, MS>(
    State(state): State<Arc<AppState<SS, ES, RS, MS>>>,
    Json(request): Json<ListRsvpsRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
    MS: MinorStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;
    require_admin(&identity)?;

    require_fields(&[("event_id", request.event_id.as_deref())])?;
    let event_id = request.event_id.as_deref().unwrap();

    let mut rsvps = state.rsvps.get_rsvps_by_event(event_id).await?;
    rsvps.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let active_count = rsvps.iter().filter(|r| r.is_active()).count();
    let listed: Vec<serde_json::Value> = rsvps
        .iter()
        .map(|r| {
            serde_json::json!({
                "attendee_id": r.attendee_id,
                "attendee_type": r.attendee_type,
                "email": r.email,
                "guardian_email": r.guardian_email,
                "first_name": r.first_name,
                "last_name": r.last_name,
                "age": r.age,
                "status": r.status,
                "created_at": r.created_at,
                "cancelled_at": r.cancelled_at,
                "additional_comments": r.additional_comments,
                "attendance_marked_at": r.attendance_marked_at,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "event_id": event_id,
        "rsvps": listed,
        "total": listed.len(),
        "active_count": active_count,
    })))
}

// POST /admin/attendance
pub async fn mark_attendance<SS, ES, RS, MS>(
    State(state): State<Arc<AppState<SS, ES, RS, MS>>>,
    Json(request): Json<MarkAttendanceRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
    MS: MinorStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;
    require_admin(&identity)?;

    require_fields(&[
        ("event_id", request.event_id.as_deref()),
        ("attendee_id", request.attendee_id.as_deref()),
        ("status", request.status.as_deref()),
    ])?;
    let event_id = request.event_id.as_deref().unwrap();
    let attendee_id = request.attendee_id.as_deref().unwrap();

    let status = match request.status.as_deref().unwrap() {
        "attended" => RsvpStatus::Attended,
        "no_show" => RsvpStatus::NoShow,
        _ => {
            return Err(AppError::validation(
                "status must be 'attended' or 'no_show'".to_string(),
            ))
        }
    };

    let mut rsvp = state
        .rsvps
        .get_rsvp(event_id, attendee_id)
        .await?
        .ok_or_else(|| AppError::not_found("RSVP not found".to_string()))?;

    if rsvp.status == RsvpStatus::Cancelled {
        return Err(AppError::validation(
            "Cannot mark a cancelled RSVP".to_string(),
        ));
    }

    rsvp.status = status;
    rsvp.attendance_marked_at = Some(now_str());
    rsvp.updated_at = now_str();
    state.rsvps.put_rsvp(rsvp).await?;

    info!(
        "Attendance marked as {} for event {}",
        status, event_id
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Attendance recorded",
        "status": status,
    })))
}
