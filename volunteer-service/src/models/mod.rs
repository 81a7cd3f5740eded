use serde::Deserialize;

// Request DTOs. Fields are optional so missing input surfaces as a 400 with
// a field-by-field message instead of a deserialization rejection.

#[derive(Deserialize, Debug)]
pub struct SessionTokenRequest {
    pub session_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AddMinorRequest {
    pub session_token: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateMinorRequest {
    pub session_token: Option<String>,
    pub minor_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct DeleteMinorRequest {
    pub session_token: Option<String>,
    pub minor_id: Option<String>,
}

/// The waiver form posts checkbox fields as "on", so acknowledgement and
/// consent arrive as either booleans or strings.
#[derive(Deserialize, Debug)]
pub struct SubmitWaiverRequest {
    pub email: Option<String>,
    pub full_legal_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub waiver_acknowledgement: Option<serde_json::Value>,
    // Adult branch
    pub adult_signature: Option<String>,
    pub adult_todays_date: Option<String>,
    // Minor branch
    pub guardian_name: Option<String>,
    pub guardian_email: Option<String>,
    pub relationship_type: Option<String>,
    pub guardian_consent: Option<serde_json::Value>,
    pub minor_todays_date: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CheckWaiverRequest {
    pub email: Option<String>,
}
