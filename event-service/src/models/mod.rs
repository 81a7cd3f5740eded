use serde::Deserialize;

// Request DTOs. Fields are optional so missing input surfaces as a 400 with
// a field-by-field message instead of a deserialization rejection.

#[derive(Deserialize, Debug)]
pub struct SubmitRsvpRequest {
    pub session_token: Option<String>,
    pub event_id: Option<String>,
    /// Present when registering one of the account's minors; absent when the
    /// volunteer registers themself.
    pub minor_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub additional_comments: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CancelRsvpRequest {
    pub session_token: Option<String>,
    pub event_id: Option<String>,
    pub attendee_id: Option<String>,
    pub attendee_type: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CheckRsvpRequest {
    pub event_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ListRsvpsRequest {
    pub session_token: Option<String>,
    pub event_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct MarkAttendanceRequest {
    pub session_token: Option<String>,
    pub event_id: Option<String>,
    pub attendee_id: Option<String>,
    pub status: Option<String>,
}
