//! In-memory store implementations for handler tests. Plain mutex-guarded
//! maps; query order is insertion order, which matches the "unspecified
//! unless documented" contract of the real adapters.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::models::{AuthCode, Event, Minor, Rsvp, Session, Waiver};
use crate::store::{AuthCodeStore, EventStore, MinorStore, RsvpStore, SessionStore, WaiverStore};

#[derive(Default)]
pub struct MockSessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn put_session(&self, session: Session) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.session_token.clone(), session);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    async fn touch_session(&self, token: &str, last_accessed: &str) -> Result<(), StoreError> {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(token) {
            session.last_accessed = Some(last_accessed.to_string());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockAuthCodeStore {
    codes: Mutex<HashMap<String, AuthCode>>,
}

impl MockAuthCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthCodeStore for MockAuthCodeStore {
    async fn put_code(&self, code: AuthCode) -> Result<(), StoreError> {
        self.codes.lock().unwrap().insert(code.email.clone(), code);
        Ok(())
    }

    async fn get_code(&self, email: &str) -> Result<Option<AuthCode>, StoreError> {
        Ok(self.codes.lock().unwrap().get(email).cloned())
    }

    async fn delete_code(&self, email: &str) -> Result<(), StoreError> {
        self.codes.lock().unwrap().remove(email);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockMinorStore {
    minors: Mutex<HashMap<(String, String), Minor>>,
}

impl MockMinorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MinorStore for MockMinorStore {
    async fn put_minor(&self, minor: Minor) -> Result<(), StoreError> {
        self.minors
            .lock()
            .unwrap()
            .insert((minor.guardian_email.clone(), minor.minor_id.clone()), minor);
        Ok(())
    }

    async fn get_minor(
        &self,
        guardian_email: &str,
        minor_id: &str,
    ) -> Result<Option<Minor>, StoreError> {
        Ok(self
            .minors
            .lock()
            .unwrap()
            .get(&(guardian_email.to_string(), minor_id.to_string()))
            .cloned())
    }

    async fn delete_minor(&self, guardian_email: &str, minor_id: &str) -> Result<(), StoreError> {
        self.minors
            .lock()
            .unwrap()
            .remove(&(guardian_email.to_string(), minor_id.to_string()));
        Ok(())
    }

    async fn get_minors_by_guardian(
        &self,
        guardian_email: &str,
    ) -> Result<Vec<Minor>, StoreError> {
        Ok(self
            .minors
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.guardian_email == guardian_email)
            .cloned()
            .collect())
    }

    async fn list_minors(&self) -> Result<Vec<Minor>, StoreError> {
        Ok(self.minors.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MockWaiverStore {
    waivers: Mutex<HashMap<(String, String), Waiver>>,
}

impl MockWaiverStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WaiverStore for MockWaiverStore {
    async fn put_waiver(&self, waiver: Waiver) -> Result<(), StoreError> {
        self.waivers
            .lock()
            .unwrap()
            .insert((waiver.email.clone(), waiver.waiver_id.clone()), waiver);
        Ok(())
    }

    async fn get_waivers_by_email(&self, email: &str) -> Result<Vec<Waiver>, StoreError> {
        Ok(self
            .waivers
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.email == email)
            .cloned()
            .collect())
    }

    async fn list_waivers(&self) -> Result<Vec<Waiver>, StoreError> {
        Ok(self.waivers.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MockEventStore {
    events: Mutex<HashMap<String, Event>>,
}

impl MockEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an event for tests; the events subsystem owns writes in
    /// production so the trait itself is read-only.
    pub fn insert_event(&self, event: Event) {
        self.events
            .lock()
            .unwrap()
            .insert(event.event_id.clone(), event);
    }
}

#[async_trait]
impl EventStore for MockEventStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.lock().unwrap().get(event_id).cloned())
    }
}

#[derive(Default)]
pub struct MockRsvpStore {
    rsvps: Mutex<HashMap<(String, String), Rsvp>>,
}

impl MockRsvpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RsvpStore for MockRsvpStore {
    async fn put_rsvp(&self, rsvp: Rsvp) -> Result<(), StoreError> {
        self.rsvps
            .lock()
            .unwrap()
            .insert((rsvp.event_id.clone(), rsvp.attendee_id.clone()), rsvp);
        Ok(())
    }

    async fn get_rsvp(
        &self,
        event_id: &str,
        attendee_id: &str,
    ) -> Result<Option<Rsvp>, StoreError> {
        Ok(self
            .rsvps
            .lock()
            .unwrap()
            .get(&(event_id.to_string(), attendee_id.to_string()))
            .cloned())
    }

    async fn get_rsvps_by_event(&self, event_id: &str) -> Result<Vec<Rsvp>, StoreError> {
        Ok(self
            .rsvps
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn get_rsvps_by_email(&self, email: &str) -> Result<Vec<Rsvp>, StoreError> {
        Ok(self
            .rsvps
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.email == email)
            .cloned()
            .collect())
    }

    async fn get_rsvps_by_attendee(&self, attendee_id: &str) -> Result<Vec<Rsvp>, StoreError> {
        Ok(self
            .rsvps
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.attendee_id == attendee_id)
            .cloned()
            .collect())
    }
}
