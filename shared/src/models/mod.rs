use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Returns the current UTC time as an RFC 3339 string, the timestamp format
/// used for every created/updated/expires field in the data model.
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// A live login session. Keyed by the opaque `session_token`; one token
/// resolves to at most one session.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Session {
    pub session_token: String,
    pub session_id: String,
    pub email: String,
    pub created_at: String,
    pub expires_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<String>,
}

/// A pending email verification code. Keyed by email; replaced wholesale when
/// a new code is requested.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AuthCode {
    pub email: String,
    pub validation_code: String,
    pub created_at: String,
    pub expiration_time: String,
    #[serde(default)]
    pub attempts: u32,
}

/// A minor attached to a guardian's account. Keyed by
/// `(guardian_email, minor_id)`. The stored `age` is a snapshot; readers
/// recompute it from `date_of_birth`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Minor {
    pub guardian_email: String,
    pub minor_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A signed liability waiver. Keyed by `(email, waiver_id)`; multiple waivers
/// may exist per email and the most recent by `submission_date` is the one
/// that counts. Expiration is always derived from `submission_date`, never
/// stored.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Waiver {
    pub email: String,
    pub waiver_id: String,
    pub submission_date: String,
    pub full_legal_name: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub is_adult: bool,
    pub waiver_acknowledged: bool,
    // Adult-only fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adult_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_date: Option<String>,
    // Minor-only fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_relationship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_consent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_date: Option<String>,
}

/// A cleanup event. Owned by the events subsystem; read here for capacity,
/// scheduling and dashboard joins.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Event {
    pub event_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
    #[serde(default = "default_event_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_cap: Option<u32>,
}

fn default_event_status() -> String {
    "active".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeType {
    Volunteer,
    Minor,
}

impl std::fmt::Display for AttendeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendeeType::Volunteer => write!(f, "volunteer"),
            AttendeeType::Minor => write!(f, "minor"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Active,
    Cancelled,
    NoShow,
    Attended,
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RsvpStatus::Active => write!(f, "active"),
            RsvpStatus::Cancelled => write!(f, "cancelled"),
            RsvpStatus::NoShow => write!(f, "no_show"),
            RsvpStatus::Attended => write!(f, "attended"),
        }
    }
}

/// An event registration. Keyed by `(event_id, attendee_id)`; the attendee is
/// either a volunteer (attendee_id = email) or a minor (attendee_id =
/// minor_id, `guardian_email` set). `email` is always the account email the
/// registration belongs to, so the email index covers both cases.
///
/// Cancellation is a status transition, not a delete: a registration never
/// returns to not-existing, which is what makes the duplicate check meaningful.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Rsvp {
    pub event_id: String,
    pub attendee_id: String,
    pub attendee_type: AttendeeType,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub status: RsvpStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_before_event: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_marked_at: Option<String>,
}

impl Rsvp {
    pub fn is_active(&self) -> bool {
        self.status == RsvpStatus::Active
    }
}
