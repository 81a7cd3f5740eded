use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use volunteers_shared::auth::{require_admin, validate_session};
use volunteers_shared::error::Result;
use volunteers_shared::models::{Minor, Waiver};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};
use volunteers_shared::validation::{age_on, parse_birth_date, waiver_expiration, waiver_is_valid};

use crate::handlers::{require_token, AppState};
use crate::models::SessionTokenRequest;

// POST /admin/volunteers
//
// Full roster for coordinators: every account that has ever submitted a
// waiver or registered a minor, with current waiver standing.
pub async fn admin_volunteers<SS, MS, WS, ES, RS>(
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
    require_admin(&identity)?;

    let waivers = state.waivers.list_waivers().await?;
    let minors = state.minors.list_minors().await?;

    let mut waivers_by_email: BTreeMap<String, Vec<Waiver>> = BTreeMap::new();
    for waiver in waivers {
        waivers_by_email
            .entry(waiver.email.clone())
            .or_default()
            .push(waiver);
    }

    let mut minors_by_guardian: BTreeMap<String, Vec<Minor>> = BTreeMap::new();
    for minor in minors {
        minors_by_guardian
            .entry(minor.guardian_email.clone())
            .or_default()
            .push(minor);
    }

    let mut emails: Vec<String> = waivers_by_email.keys().cloned().collect();
    emails.extend(minors_by_guardian.keys().cloned());
    emails.sort();
    emails.dedup();

    let today = Utc::now().date_naive();
    let volunteers: Vec<serde_json::Value> = emails
        .iter()
        .map(|email| {
            let latest = waivers_by_email.get(email).and_then(|records| {
                records
                    .iter()
                    .max_by(|a, b| a.submission_date.cmp(&b.submission_date))
            });

            let standing = latest.and_then(|w| {
                let submitted = DateTime::parse_from_rfc3339(&w.submission_date)
                    .ok()?
                    .with_timezone(&Utc);
                Some((w, submitted, waiver_is_valid(submitted, Utc::now())))
            });

            let minors: Vec<serde_json::Value> = minors_by_guardian
                .get(email)
                .map(|records| {
                    records
                        .iter()
                        .map(|m| {
                            let age = parse_birth_date(&m.date_of_birth)
                                .map(|dob| age_on(dob, today))
                                .unwrap_or(m.age as i32);
                            serde_json::json!({
                                "minor_id": m.minor_id,
                                "first_name": m.first_name,
                                "last_name": m.last_name,
                                "date_of_birth": m.date_of_birth,
                                "age": age,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            match standing {
                Some((waiver, submitted, valid)) => serde_json::json!({
                    "email": email,
                    "full_legal_name": waiver.full_legal_name,
                    "has_valid_waiver": valid,
                    "waiver_expiration": waiver_expiration(submitted)
                        .format("%Y-%m-%d")
                        .to_string(),
                    "minors": minors,
                }),
                None => serde_json::json!({
                    "email": email,
                    "full_legal_name": serde_json::Value::Null,
                    "has_valid_waiver": false,
                    "waiver_expiration": serde_json::Value::Null,
                    "minors": minors,
                }),
            }
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "volunteers": volunteers,
        "total": volunteers.len(),
    })))
}
