//! Store traits the handlers program against. Each resource gets a narrow
//! trait with exactly the access patterns the handlers need; the DynamoDB
//! implementations live in [`dynamo`], and in-memory mocks for tests live in
//! `test_utils` behind the `test_utils` feature.
//!
//! Query-by-partition-key returns items in unspecified order; callers that
//! care sort for themselves.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{AuthCode, Event, Minor, Rsvp, Session, Waiver};

pub mod dynamo;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put_session(&self, session: Session) -> Result<(), StoreError>;
    async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError>;
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;
    /// Updates `last_accessed` only. Callers treat failures as non-fatal.
    async fn touch_session(&self, token: &str, last_accessed: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AuthCodeStore: Send + Sync {
    async fn put_code(&self, code: AuthCode) -> Result<(), StoreError>;
    async fn get_code(&self, email: &str) -> Result<Option<AuthCode>, StoreError>;
    async fn delete_code(&self, email: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MinorStore: Send + Sync {
    async fn put_minor(&self, minor: Minor) -> Result<(), StoreError>;
    async fn get_minor(
        &self,
        guardian_email: &str,
        minor_id: &str,
    ) -> Result<Option<Minor>, StoreError>;
    async fn delete_minor(&self, guardian_email: &str, minor_id: &str) -> Result<(), StoreError>;
    async fn get_minors_by_guardian(&self, guardian_email: &str)
        -> Result<Vec<Minor>, StoreError>;
    /// Full listing for the admin roster.
    async fn list_minors(&self) -> Result<Vec<Minor>, StoreError>;
}

#[async_trait]
pub trait WaiverStore: Send + Sync {
    async fn put_waiver(&self, waiver: Waiver) -> Result<(), StoreError>;
    async fn get_waivers_by_email(&self, email: &str) -> Result<Vec<Waiver>, StoreError>;
    /// Full listing for the admin roster.
    async fn list_waivers(&self) -> Result<Vec<Waiver>, StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError>;
}

#[async_trait]
pub trait RsvpStore: Send + Sync {
    /// Inserts or replaces the registration at `(event_id, attendee_id)`.
    async fn put_rsvp(&self, rsvp: Rsvp) -> Result<(), StoreError>;
    async fn get_rsvp(
        &self,
        event_id: &str,
        attendee_id: &str,
    ) -> Result<Option<Rsvp>, StoreError>;
    async fn get_rsvps_by_event(&self, event_id: &str) -> Result<Vec<Rsvp>, StoreError>;
    /// All registrations belonging to an account email (the volunteer's own
    /// plus their minors'), via the email index.
    async fn get_rsvps_by_email(&self, email: &str) -> Result<Vec<Rsvp>, StoreError>;
    /// All registrations for a single attendee across events, via the
    /// attendee index. Used for the minor-deletion cascade.
    async fn get_rsvps_by_attendee(&self, attendee_id: &str) -> Result<Vec<Rsvp>, StoreError>;
}
