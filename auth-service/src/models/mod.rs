use serde::Deserialize;

// Request DTOs. Fields are optional so missing input surfaces as a 400 with
// a helpful message instead of a deserialization rejection.

#[derive(Deserialize, Debug)]
pub struct SendCodeRequest {
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub validation_code: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SessionTokenRequest {
    pub session_token: Option<String>,
}
