use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

use volunteers_shared::auth::validate_session;
use volunteers_shared::error::Result;
use volunteers_shared::models::{Event, Rsvp};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};
use volunteers_shared::validation::{waiver_expiration, waiver_expiring_soon, waiver_is_valid};

use crate::handlers::waiver_handlers::latest_waiver;
use crate::handlers::{require_token, AppState};
use crate::models::SessionTokenRequest;

// POST /dashboard
//
// One call that gathers everything the logged-in volunteer's home screen
// needs: waiver standing plus their registrations (their own and their
// minors'), grouped per event.
pub async fn get_dashboard<SS, MS, WS, ES, RS>(
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

    let waiver = waiver_summary(&*state.waivers, &identity.email).await?;
    let rsvps = rsvp_groups(&state, &identity.email).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "email": identity.email,
        "waiver": waiver,
        "rsvps": rsvps,
    })))
}

async fn waiver_summary<WS: WaiverStore + ?Sized>(
    waivers: &WS,
    email: &str,
) -> Result<serde_json::Value> {
    let records = waivers.get_waivers_by_email(email).await?;
    let latest = latest_waiver(records);

    let valid = latest.as_ref().and_then(|w| {
        let submitted = DateTime::parse_from_rfc3339(&w.submission_date)
            .ok()?
            .with_timezone(&Utc);
        waiver_is_valid(submitted, Utc::now()).then_some((w, submitted))
    });

    let Some((waiver, submitted)) = valid else {
        return Ok(serde_json::json!({ "has_waiver": false }));
    };

    Ok(serde_json::json!({
        "has_waiver": true,
        "waiver_id": waiver.waiver_id,
        "submission_date": waiver.submission_date,
        "expiration_date": waiver_expiration(submitted).format("%Y-%m-%d").to_string(),
        "full_legal_name": waiver.full_legal_name,
        "expiring_soon": waiver_expiring_soon(submitted, Utc::now()),
    }))
}

fn attendee_json(rsvp: &Rsvp) -> serde_json::Value {
    serde_json::json!({
        "attendee_id": rsvp.attendee_id,
        "attendee_type": rsvp.attendee_type,
        "first_name": rsvp.first_name,
        "last_name": rsvp.last_name,
        "age": rsvp.age,
        "created_at": rsvp.created_at,
    })
}

fn event_start(event: &Event) -> Option<DateTime<Utc>> {
    event
        .start_time
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Active RSVPs for this account, joined with their events and grouped per
/// event. Upcoming events come first in ascending start order, then past
/// events most-recent-first.
async fn rsvp_groups<SS, MS, WS, ES, RS>(
    state: &AppState<SS, MS, WS, ES, RS>,
    email: &str,
) -> Result<Vec<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    let records = state.rsvps.get_rsvps_by_email(email).await?;

    let mut by_event: BTreeMap<String, Vec<Rsvp>> = BTreeMap::new();
    for rsvp in records.into_iter().filter(Rsvp::is_active) {
        by_event.entry(rsvp.event_id.clone()).or_default().push(rsvp);
    }

    let now = Utc::now();
    let mut upcoming: Vec<(DateTime<Utc>, serde_json::Value)> = Vec::new();
    let mut past: Vec<(Option<DateTime<Utc>>, serde_json::Value)> = Vec::new();

    for (event_id, mut attendees) in by_event {
        // An RSVP pointing at a deleted event has nothing to show.
        let event = match state.events.get_event(&event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!("Failed to fetch event {} for dashboard: {}", event_id, e);
                continue;
            }
        };

        attendees.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let start = event_start(&event);
        let group = serde_json::json!({
            "event_id": event.event_id,
            "title": event.title,
            "description": event.description,
            "start_time": event.start_time,
            "end_time": event.end_time,
            "location": event.location,
            "attendees": attendees.iter().map(attendee_json).collect::<Vec<_>>(),
        });

        match start {
            Some(start) if start > now => upcoming.push((start, group)),
            _ => past.push((start, group)),
        }
    }

    upcoming.sort_by_key(|(start, _)| *start);
    past.sort_by(|(a, _), (b, _)| b.cmp(a));

    Ok(upcoming
        .into_iter()
        .map(|(_, g)| g)
        .chain(past.into_iter().map(|(_, g)| g))
        .collect())
}
