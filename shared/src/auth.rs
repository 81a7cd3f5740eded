//! Session validation and the authorization guard. Every authenticated
//! handler funnels through [`validate_session`] so the token rules live in
//! exactly one place, and through [`require_owner`]/[`require_admin`] when a
//! request touches another entity's sub-resource.

use chrono::{DateTime, Utc};
use log::warn;

use crate::config;
use crate::error::{AppError, Result};
use crate::models::now_str;
use crate::store::SessionStore;

/// The identity a valid session resolves to.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub session_id: String,
    pub email: String,
    pub expires_at: String,
}

/// Validates an opaque bearer token against the session store.
///
/// One read, one best-effort write: a usable session gets its `last_accessed`
/// bumped, and a failure to persist that bump never fails the request. An
/// expired session is deleted (also best-effort) and rejected; externally both
/// failure modes are a 401.
pub async fn validate_session<S>(store: &S, token: &str) -> Result<SessionIdentity>
where
    S: SessionStore + ?Sized,
{
    if token.is_empty() {
        return Err(AppError::unauthenticated(
            "Session token is required".to_string(),
        ));
    }

    let session = store
        .get_session(token)
        .await
        .map_err(|e| AppError::internal_server_error(format!("session lookup failed: {}", e)))?
        .ok_or_else(|| AppError::unauthenticated("Invalid session token".to_string()))?;

    let expires_at = match DateTime::parse_from_rfc3339(&session.expires_at) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!(
                "Session {} has unparseable expires_at ({}); rejecting",
                session.session_id, e
            );
            return Err(AppError::unauthenticated(
                "Invalid session token".to_string(),
            ));
        }
    };

    if expires_at <= Utc::now() {
        if let Err(e) = store.delete_session(token).await {
            warn!("Failed to delete expired session: {}", e);
        }
        return Err(AppError::SessionExpired("Session has expired".to_string()));
    }

    if let Err(e) = store.touch_session(token, &now_str()).await {
        warn!(
            "Failed to update last_accessed for session {}: {}",
            session.session_id, e
        );
    }

    Ok(SessionIdentity {
        session_id: session.session_id,
        email: session.email,
        expires_at: session.expires_at,
    })
}

/// Passes only if the identity owns the resource. Emails are normalized to
/// lowercase at write time, but the comparison is case-insensitive anyway.
pub fn require_owner(identity: &SessionIdentity, owner_email: &str, message: &str) -> Result<()> {
    if identity.email.eq_ignore_ascii_case(owner_email) {
        Ok(())
    } else {
        Err(AppError::forbidden(message.to_string()))
    }
}

/// Passes only if the identity is on the configured admin allow-list.
pub fn require_admin(identity: &SessionIdentity) -> Result<()> {
    if config::is_admin(&identity.email) {
        Ok(())
    } else {
        Err(AppError::forbidden("Admin access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::Session;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;

    struct FakeSessionStore {
        session: Mutex<Option<Session>>,
        touched: Mutex<Vec<String>>,
    }

    impl FakeSessionStore {
        fn with_session(session: Session) -> Self {
            Self {
                session: Mutex::new(Some(session)),
                touched: Mutex::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                session: Mutex::new(None),
                touched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SessionStore for FakeSessionStore {
        async fn put_session(&self, session: Session) -> std::result::Result<(), StoreError> {
            *self.session.lock().unwrap() = Some(session);
            Ok(())
        }

        async fn get_session(
            &self,
            token: &str,
        ) -> std::result::Result<Option<Session>, StoreError> {
            Ok(self
                .session
                .lock()
                .unwrap()
                .clone()
                .filter(|s| s.session_token == token))
        }

        async fn delete_session(&self, _token: &str) -> std::result::Result<(), StoreError> {
            *self.session.lock().unwrap() = None;
            Ok(())
        }

        async fn touch_session(
            &self,
            _token: &str,
            last_accessed: &str,
        ) -> std::result::Result<(), StoreError> {
            self.touched.lock().unwrap().push(last_accessed.to_string());
            Ok(())
        }
    }

    fn live_session(token: &str, email: &str) -> Session {
        Session {
            session_token: token.to_string(),
            session_id: "sess-1".to_string(),
            email: email.to_string(),
            created_at: now_str(),
            expires_at: (Utc::now() + Duration::hours(24)).to_rfc3339(),
            last_accessed: None,
        }
    }

    #[tokio::test]
    async fn unknown_token_is_unauthenticated() {
        let store = FakeSessionStore::empty();
        let err = validate_session(&store, "no-such-token").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn empty_token_is_unauthenticated() {
        let store = FakeSessionStore::empty();
        let err = validate_session(&store, "").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn valid_session_resolves_and_touches_last_accessed() {
        let store = FakeSessionStore::with_session(live_session("tok-1", "a@b.com"));
        let identity = validate_session(&store, "tok-1").await.unwrap();
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(store.touched.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_deleted() {
        let mut session = live_session("tok-1", "a@b.com");
        session.expires_at = (Utc::now() - Duration::minutes(1)).to_rfc3339();
        let store = FakeSessionStore::with_session(session);

        let err = validate_session(&store, "tok-1").await.unwrap_err();
        assert!(matches!(err, AppError::SessionExpired(_)));
        assert!(store.session.lock().unwrap().is_none());
        // No touch on rejection.
        assert!(store.touched.lock().unwrap().is_empty());
    }

    #[test]
    fn owner_check_is_case_insensitive() {
        let identity = SessionIdentity {
            session_id: "sess-1".to_string(),
            email: "guardian@example.org".to_string(),
            expires_at: now_str(),
        };
        assert!(require_owner(&identity, "Guardian@Example.org", "no").is_ok());
        let err = require_owner(&identity, "other@example.org", "not yours").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.to_string(), "not yours");
    }
}
