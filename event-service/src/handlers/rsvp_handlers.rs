//! RSVP submission, cancellation and the public registration check.
//!
//! The duplicate and capacity checks are read-then-write over store state
//! with no conditional writes, so two simultaneous submissions can both pass.
//! Acceptable for this workload; the counts are advisory, not reservations.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

use volunteers_shared::auth::{require_owner, validate_session};
use volunteers_shared::error::{AppError, Result};
use volunteers_shared::models::{now_str, AttendeeType, Event, Rsvp, RsvpStatus};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore};
use volunteers_shared::validation::require_fields;

use crate::handlers::{require_token, AppState};
use crate::models::{CancelRsvpRequest, CheckRsvpRequest, SubmitRsvpRequest};

/// Fallback cap for events stored without an explicit `attendance_cap`.
pub const DEFAULT_ATTENDANCE_CAP: u32 = 15;

fn event_start(event: &Event) -> Option<DateTime<Utc>> {
    event
        .start_time
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn attendee_json(rsvp: &Rsvp) -> serde_json::Value {
    serde_json::json!({
        "attendee_id": rsvp.attendee_id,
        "attendee_type": rsvp.attendee_type,
        "first_name": rsvp.first_name,
        "last_name": rsvp.last_name,
        "age": rsvp.age,
        "status": rsvp.status,
        "created_at": rsvp.created_at,
    })
}

// POST /rsvp/submit
pub async fn submit_rsvp<SS, ES, RS, MS>(
    State(state): State<Arc<AppState<SS, ES, RS, MS>>>,
    Json(request): Json<SubmitRsvpRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
    MS: MinorStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;

    require_fields(&[("event_id", request.event_id.as_deref())])?;
    let event_id = request.event_id.as_deref().unwrap();

    let event = state
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found".to_string()))?;

    // Resolve the attendee first: the volunteer themself, or one of their
    // minors when minor_id is present.
    let (attendee_id, attendee_type, first_name, last_name, age, guardian_email) =
        match request.minor_id.as_deref().filter(|m| !m.trim().is_empty()) {
            Some(minor_id) => {
                let minor = state
                    .minors
                    .get_minor(&identity.email, minor_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Minor not found".to_string()))?;
                (
                    minor.minor_id,
                    AttendeeType::Minor,
                    minor.first_name,
                    minor.last_name,
                    Some(minor.age),
                    Some(identity.email.clone()),
                )
            }
            None => {
                require_fields(&[
                    ("first_name", request.first_name.as_deref()),
                    ("last_name", request.last_name.as_deref()),
                ])?;
                (
                    identity.email.clone(),
                    AttendeeType::Volunteer,
                    request.first_name.unwrap(),
                    request.last_name.unwrap(),
                    None,
                    None,
                )
            }
        };

    // Re-registering over a cancelled RSVP is allowed; only an active one
    // blocks.
    if let Some(existing) = state.rsvps.get_rsvp(event_id, &attendee_id).await? {
        if existing.is_active() {
            let message = match attendee_type {
                AttendeeType::Volunteer => "You have already registered for this event",
                AttendeeType::Minor => "This minor is already registered for this event",
            };
            return Err(AppError::validation(message.to_string()));
        }
    }

    let cap = event.attendance_cap.unwrap_or(DEFAULT_ATTENDANCE_CAP);
    let active_count = state
        .rsvps
        .get_rsvps_by_event(event_id)
        .await?
        .iter()
        .filter(|r| r.is_active())
        .count();
    if active_count as u32 >= cap {
        return Err(AppError::validation(
            "This event has reached its maximum capacity".to_string(),
        ));
    }

    let created_at = now_str();
    let rsvp = Rsvp {
        event_id: event_id.to_string(),
        attendee_id,
        attendee_type,
        email: identity.email,
        guardian_email,
        first_name,
        last_name,
        age,
        status: RsvpStatus::Active,
        created_at: created_at.clone(),
        updated_at: created_at,
        additional_comments: request
            .additional_comments
            .filter(|c| !c.trim().is_empty()),
        cancelled_at: None,
        hours_before_event: None,
        attendance_marked_at: None,
    };
    state.rsvps.put_rsvp(rsvp).await?;

    info!(
        "RSVP recorded for event {}; {} of {} spots now taken",
        event_id,
        active_count + 1,
        cap
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "RSVP submitted successfully",
        "rsvp_count": active_count + 1,
        "attendance_cap": cap,
    })))
}

// POST /rsvp/cancel
pub async fn cancel_rsvp<SS, ES, RS, MS>(
    State(state): State<Arc<AppState<SS, ES, RS, MS>>>,
    Json(request): Json<CancelRsvpRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
    MS: MinorStore + 'static,
{
    let token = require_token(&request.session_token)?;
    let identity = validate_session(&*state.sessions, token).await?;

    require_fields(&[
        ("event_id", request.event_id.as_deref()),
        ("attendee_id", request.attendee_id.as_deref()),
        ("attendee_type", request.attendee_type.as_deref()),
    ])?;
    let event_id = request.event_id.as_deref().unwrap();
    let attendee_id = request.attendee_id.as_deref().unwrap();
    let attendee_type = request.attendee_type.as_deref().unwrap();

    if attendee_type != "volunteer" && attendee_type != "minor" {
        return Err(AppError::validation(
            "attendee_type must be 'volunteer' or 'minor'".to_string(),
        ));
    }

    let mut rsvp = state
        .rsvps
        .get_rsvp(event_id, attendee_id)
        .await?
        .ok_or_else(|| AppError::not_found("RSVP not found".to_string()))?;

    // Ownership: a volunteer RSVP belongs to the email it was made under; a
    // minor RSVP belongs to the guardian who registered them.
    match rsvp.attendee_type {
        AttendeeType::Volunteer => {
            require_owner(&identity, &rsvp.attendee_id, "You can only cancel your own RSVP")?;
        }
        AttendeeType::Minor => {
            let guardian = rsvp.guardian_email.as_deref().unwrap_or_default();
            require_owner(
                &identity,
                guardian,
                "You can only cancel RSVPs for your own minors",
            )?;
        }
    }

    if !rsvp.is_active() {
        return Err(AppError::validation(
            "This RSVP has already been cancelled".to_string(),
        ));
    }

    let now = Utc::now();
    let hours_before_event = state
        .events
        .get_event(event_id)
        .await?
        .as_ref()
        .and_then(event_start)
        .map(|start| {
            let hours = (start - now).num_minutes() as f64 / 60.0;
            (hours * 10.0).round() / 10.0
        });

    rsvp.status = RsvpStatus::Cancelled;
    rsvp.cancelled_at = Some(now_str());
    rsvp.updated_at = now_str();
    rsvp.hours_before_event = hours_before_event;
    state.rsvps.put_rsvp(rsvp).await?;

    info!("RSVP cancelled for event {}", event_id);

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "RSVP cancelled successfully",
        "hours_before_event": hours_before_event,
    })))
}

// POST /rsvp/check
//
// Public: the registration form calls this before login to show which of an
// email's attendees are already signed up.
pub async fn check_rsvp<SS, ES, RS, MS>(
    State(state): State<Arc<AppState<SS, ES, RS, MS>>>,
    Json(request): Json<CheckRsvpRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
    MS: MinorStore + 'static,
{
    require_fields(&[
        ("event_id", request.event_id.as_deref()),
        ("email", request.email.as_deref()),
    ])?;
    let event_id = request.event_id.as_deref().unwrap();
    let email = request.email.as_deref().unwrap().trim().to_lowercase();

    let attendees: Vec<serde_json::Value> = state
        .rsvps
        .get_rsvps_by_event(event_id)
        .await?
        .iter()
        .filter(|r| {
            r.is_active()
                && (r.email.eq_ignore_ascii_case(&email)
                    || r.guardian_email
                        .as_deref()
                        .is_some_and(|g| g.eq_ignore_ascii_case(&email)))
        })
        .map(attendee_json)
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "is_registered": !attendees.is_empty(),
        "attendees": attendees,
    })))
}
