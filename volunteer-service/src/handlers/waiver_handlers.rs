use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use volunteers_shared::error::{AppError, Result};
use volunteers_shared::models::{now_str, Waiver};
use volunteers_shared::store::{EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};
use volunteers_shared::validation::{
    age_on, is_valid_email, parse_birth_date, require_fields, waiver_expiration, waiver_is_valid,
    ADULT_AGE,
};

use crate::handlers::AppState;
use crate::models::{CheckWaiverRequest, SubmitWaiverRequest};

/// The waiver form posts checkboxes as "on"; accept that, booleans, or
/// "true".
fn is_checked(value: &Option<serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "on" || s == "true",
        _ => false,
    }
}

/// Picks the most recent waiver by submission date. Timestamps are uniform
/// RFC 3339 strings, so lexicographic order is chronological order.
pub fn latest_waiver(mut waivers: Vec<Waiver>) -> Option<Waiver> {
    waivers.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));
    waivers.into_iter().next()
}

// POST /waiver/submit
//
// The waiver form is public: it's filled in before an account or session
// exists.
pub async fn submit_waiver<SS, MS, WS, ES, RS>(
    State(state): State<Arc<AppState<SS, MS, WS, ES, RS>>>,
    Json(request): Json<SubmitWaiverRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    require_fields(&[
        ("email", request.email.as_deref()),
        ("full_legal_name", request.full_legal_name.as_deref()),
        ("phone_number", request.phone_number.as_deref()),
        ("date_of_birth", request.date_of_birth.as_deref()),
    ])?;

    if !is_checked(&request.waiver_acknowledgement) {
        return Err(AppError::validation(
            "Missing required fields: waiver_acknowledgement".to_string(),
        ));
    }

    let email = request.email.as_deref().unwrap().trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email format".to_string()));
    }

    let dob = parse_birth_date(request.date_of_birth.as_deref().unwrap())?;
    let age = age_on(dob, Utc::now().date_naive());
    let is_adult = age >= ADULT_AGE;
    info!("Processing waiver submission, is_adult={}", is_adult);

    if is_adult {
        require_fields(&[
            ("adult_signature", request.adult_signature.as_deref()),
            ("adult_todays_date", request.adult_todays_date.as_deref()),
        ])
        .map_err(|_| {
            AppError::validation(
                "Missing required adult fields: adult_signature, adult_todays_date".to_string(),
            )
        })?;
    } else {
        let guardian_ok = require_fields(&[
            ("guardian_name", request.guardian_name.as_deref()),
            ("guardian_email", request.guardian_email.as_deref()),
            ("relationship_type", request.relationship_type.as_deref()),
            ("minor_todays_date", request.minor_todays_date.as_deref()),
        ])
        .is_ok();
        if !guardian_ok || !is_checked(&request.guardian_consent) {
            return Err(AppError::validation(
                "Missing required guardian fields: guardian_name, guardian_email, \
                 relationship_type, guardian_consent, minor_todays_date"
                    .to_string(),
            ));
        }
    }

    let waiver = Waiver {
        email,
        waiver_id: Uuid::new_v4().to_string(),
        submission_date: now_str(),
        full_legal_name: request.full_legal_name.unwrap(),
        phone_number: request.phone_number.unwrap(),
        date_of_birth: request.date_of_birth.unwrap(),
        is_adult,
        waiver_acknowledged: true,
        adult_signature: if is_adult { request.adult_signature } else { None },
        signature_date: if is_adult { request.adult_todays_date } else { None },
        guardian_name: if is_adult { None } else { request.guardian_name },
        guardian_email: if is_adult {
            None
        } else {
            request.guardian_email.map(|e| e.trim().to_lowercase())
        },
        guardian_relationship: if is_adult { None } else { request.relationship_type },
        guardian_consent: if is_adult { None } else { Some(true) },
        consent_date: if is_adult { None } else { request.minor_todays_date },
    };

    state.waivers.put_waiver(waiver.clone()).await?;
    info!("Waiver record saved successfully");

    let expiration_date = waiver_expiration(Utc::now()).format("%Y-%m-%d").to_string();

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Waiver submitted successfully",
        "waiver_id": waiver.waiver_id,
        "expiration_date": expiration_date,
    })))
}

// POST /waiver/check
//
// Also public: the RSVP form asks before the volunteer logs in.
pub async fn check_waiver<SS, MS, WS, ES, RS>(
    State(state): State<Arc<AppState<SS, MS, WS, ES, RS>>>,
    Json(request): Json<CheckWaiverRequest>,
) -> Result<Json<serde_json::Value>>
where
    SS: SessionStore + 'static,
    MS: MinorStore + 'static,
    WS: WaiverStore + 'static,
    ES: EventStore + 'static,
    RS: RsvpStore + 'static,
{
    require_fields(&[("email", request.email.as_deref())])?;
    let email = request.email.as_deref().unwrap().trim().to_lowercase();

    let waivers = state.waivers.get_waivers_by_email(&email).await?;
    let Some(latest) = latest_waiver(waivers) else {
        return Ok(Json(serde_json::json!({
            "success": true,
            "has_waiver": false,
            "message": "No waiver found for this email",
        })));
    };

    let Ok(submitted) = DateTime::parse_from_rfc3339(&latest.submission_date) else {
        return Ok(Json(serde_json::json!({
            "success": true,
            "has_waiver": false,
            "message": "No valid waiver found for this email",
        })));
    };
    let submitted = submitted.with_timezone(&Utc);

    if waiver_is_valid(submitted, Utc::now()) {
        let expiration_date = waiver_expiration(submitted).format("%Y-%m-%d").to_string();
        Ok(Json(serde_json::json!({
            "success": true,
            "has_waiver": true,
            "message": format!("User has a valid waiver until {}", expiration_date),
            "expiration_date": expiration_date,
            "submission_date": latest.submission_date,
        })))
    } else {
        Ok(Json(serde_json::json!({
            "success": true,
            "has_waiver": false,
            "message": "Previous waiver has expired, a new one is required",
            "previous_waiver_date": latest.submission_date,
        })))
    }
}
