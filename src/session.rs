//! Single-slot admin session with sliding renewal.
//!
//! Flow Overview:
//! 1) `create_session` overwrites the slot with a fresh record (and, for
//!    "remember me", issues a durable cookie carrying the session id).
//! 2) `check_session` destroys an expired record, renews one that is inside
//!    the renewal window, and reports validity.
//! 3) `destroy_session` clears the record and the durable cookie.
//!
//! An expired record is never renewed; it can only be destroyed.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::{
    clock::Clock,
    cookie::{CookieJar, DurableCookie, SameSite},
    events::{SecurityAction, SecurityEventLog},
    store::{get_json, set_json, KeyValueStore, StoreError, ADMIN_SESSION_KEY, LAST_LOGIN_KEY},
};

/// Name of the durable "remember me" cookie.
pub const SESSION_COOKIE_NAME: &str = "admin_session";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "expiry", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    pub remember: bool,
    pub session_id: String,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Active,
    Expired,
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    cookies: CookieJar,
    clock: Arc<dyn Clock>,
    events: Arc<SecurityEventLog>,
    email: String,
    ttl: Duration,
    renewal_window: Duration,
    remember_duration: Duration,
}

impl SessionManager {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cookies: CookieJar,
        clock: Arc<dyn Clock>,
        events: Arc<SecurityEventLog>,
        email: String,
        ttl: Duration,
        renewal_window: Duration,
        remember_duration: Duration,
    ) -> Self {
        Self {
            store,
            cookies,
            clock,
            events,
            email,
            ttl,
            renewal_window,
            remember_duration,
        }
    }

    /// Starts a new session, replacing any existing one.
    ///
    /// # Errors
    /// Returns an error if the session, cookie, or last-login entry cannot be written.
    pub fn create_session(&self, remember: bool) -> Result<Session, StoreError> {
        let now = self.clock.now();
        let session = Session {
            email: self.email.clone(),
            issued_at: now,
            expires_at: now + self.ttl,
            remember,
            session_id: generate_session_id(),
        };
        set_json(self.store.as_ref(), ADMIN_SESSION_KEY, &session)?;

        if remember {
            self.cookies.set(&DurableCookie {
                name: SESSION_COOKIE_NAME.to_string(),
                value: session.session_id.clone(),
                expires: now + self.remember_duration,
                path: "/".to_string(),
                secure: true,
                same_site: SameSite::Strict,
            })?;
        }

        self.store.set(
            LAST_LOGIN_KEY,
            &now.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;

        info!(session_id = %session.session_id, remember, "Admin session created");
        Ok(session)
    }

    /// Current session record, if one is stored and readable.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn session(&self) -> Result<Option<Session>, StoreError> {
        get_json(self.store.as_ref(), ADMIN_SESSION_KEY)
    }

    /// Classifies the stored record without side effects.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn state(&self) -> Result<SessionState, StoreError> {
        Ok(match self.session()? {
            None => SessionState::NoSession,
            Some(session) if session.is_expired(self.clock.now()) => SessionState::Expired,
            Some(_) => SessionState::Active,
        })
    }

    /// Reports whether a valid session exists, renewing it when it is close
    /// to expiry and destroying it once expired.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn check_session(&self) -> Result<bool, StoreError> {
        let Some(session) = self.session()? else {
            return Ok(false);
        };

        let now = self.clock.now();
        if session.is_expired(now) {
            debug!(session_id = %session.session_id, "Session expired");
            self.destroy_session()?;
            return Ok(false);
        }

        if session.expires_at - now < self.renewal_window {
            self.renew(session, now)?;
        }

        Ok(true)
    }

    /// Extends a still-valid session by one full lifetime from now.
    /// Returns `None` when there is nothing to refresh.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn refresh_session(&self) -> Result<Option<Session>, StoreError> {
        let Some(session) = self.session()? else {
            return Ok(None);
        };
        let now = self.clock.now();
        if session.is_expired(now) {
            return Ok(None);
        }
        self.renew(session, now).map(Some)
    }

    /// Clears the session record and the durable cookie.
    ///
    /// # Errors
    /// Returns an error if the store or cookie jar cannot be written.
    pub fn destroy_session(&self) -> Result<(), StoreError> {
        self.store.remove(ADMIN_SESSION_KEY)?;
        self.cookies.clear(SESSION_COOKIE_NAME)?;
        self.events
            .log_event(SecurityAction::Logout, "Admin session ended")?;
        Ok(())
    }

    /// Time of the last successful login.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn last_login(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(raw) = self.store.get(LAST_LOGIN_KEY)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(err) => {
                warn!("Ignoring malformed {LAST_LOGIN_KEY}: {err}");
                Ok(None)
            }
        }
    }

    /// Durable "remember me" cookie, if one was issued.
    ///
    /// # Errors
    /// Returns an error if the cookie jar cannot be read.
    pub fn remember_cookie(&self) -> Result<Option<DurableCookie>, StoreError> {
        self.cookies.get(SESSION_COOKIE_NAME)
    }

    fn renew(&self, mut session: Session, now: DateTime<Utc>) -> Result<Session, StoreError> {
        session.expires_at = now + self.ttl;
        set_json(self.store.as_ref(), ADMIN_SESSION_KEY, &session)?;
        debug!(session_id = %session.session_id, "Session renewed");
        Ok(session)
    }
}

/// Millisecond timestamp plus 80 random bits, prefixed for readability.
fn generate_session_id() -> String {
    format!("session_{}", Ulid::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock, config::ClientContext, events::DEFAULT_EVENT_LIMIT,
        store::MemoryStore,
    };
    use chrono::TimeZone;
    use std::collections::HashSet;

    struct Fixture {
        store: Arc<MemoryStore>,
        jar: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        events: Arc<SecurityEventLog>,
        sessions: SessionManager,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let jar = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 2, 7, 45, 0).unwrap(),
        ));
        let events = Arc::new(SecurityEventLog::new(
            store.clone(),
            clock.clone(),
            100,
            ClientContext::default(),
        ));
        let sessions = SessionManager::new(
            store.clone(),
            CookieJar::new(jar.clone()),
            clock.clone(),
            events.clone(),
            "extension-admin@example.org".to_string(),
            Duration::minutes(15),
            Duration::minutes(5),
            Duration::days(7),
        );
        Fixture {
            store,
            jar,
            clock,
            events,
            sessions,
        }
    }

    #[test]
    fn fresh_session_is_valid_and_not_renewed() -> Result<(), StoreError> {
        let f = fixture();
        let created = f.sessions.create_session(false)?;
        assert_eq!(created.expires_at, f.clock.now() + Duration::minutes(15));
        assert!(created.session_id.starts_with("session_"));

        assert!(f.sessions.check_session()?);
        assert_eq!(f.sessions.session()?, Some(created));
        assert_eq!(f.sessions.state()?, SessionState::Active);
        Ok(())
    }

    #[test]
    fn session_near_expiry_is_extended_by_full_lifetime() -> Result<(), StoreError> {
        let f = fixture();
        f.sessions.create_session(false)?;
        f.clock.advance(Duration::minutes(11));

        assert!(f.sessions.check_session()?);
        let renewed = f.sessions.session()?.map(|s| s.expires_at);
        assert_eq!(renewed, Some(f.clock.now() + Duration::minutes(15)));
        Ok(())
    }

    #[test]
    fn check_outside_window_keeps_expiry() -> Result<(), StoreError> {
        let f = fixture();
        let created = f.sessions.create_session(false)?;
        f.clock.advance(Duration::minutes(10));
        assert!(f.sessions.check_session()?);
        assert_eq!(
            f.sessions.session()?.map(|s| s.expires_at),
            Some(created.expires_at)
        );
        Ok(())
    }

    #[test]
    fn expired_session_is_destroyed_not_revived() -> Result<(), StoreError> {
        let f = fixture();
        f.sessions.create_session(true)?;
        f.clock.advance(Duration::minutes(15));
        assert_eq!(f.sessions.state()?, SessionState::Expired);
        assert_eq!(f.sessions.refresh_session()?, None);

        assert!(!f.sessions.check_session()?);
        assert_eq!(f.sessions.session()?, None);
        assert_eq!(f.store.get(ADMIN_SESSION_KEY)?, None);
        assert_eq!(f.sessions.remember_cookie()?, None);
        assert_eq!(f.sessions.state()?, SessionState::NoSession);

        let events = f.events.events(DEFAULT_EVENT_LIMIT)?;
        assert_eq!(events[0].action, "LOGOUT");
        Ok(())
    }

    #[test]
    fn missing_session_is_invalid() -> Result<(), StoreError> {
        let f = fixture();
        assert!(!f.sessions.check_session()?);
        assert_eq!(f.sessions.refresh_session()?, None);
        assert!(f.events.events(DEFAULT_EVENT_LIMIT)?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_session_reads_as_absent() -> Result<(), StoreError> {
        let f = fixture();
        f.store.set(ADMIN_SESSION_KEY, "{\"email\":")?;
        assert_eq!(f.sessions.session()?, None);
        assert!(!f.sessions.check_session()?);
        Ok(())
    }

    #[test]
    fn remember_me_issues_week_long_cookie() -> Result<(), StoreError> {
        let f = fixture();
        let session = f.sessions.create_session(true)?;
        let cookie = f.sessions.remember_cookie()?;
        let Some(cookie) = cookie else {
            panic!("remember cookie missing");
        };
        assert_eq!(cookie.value, session.session_id);
        assert_eq!(cookie.expires, f.clock.now() + Duration::days(7));
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, SameSite::Strict);

        // Clearing local storage leaves the durable cookie behind.
        f.store.clear();
        assert!(!f.sessions.check_session()?);
        assert!(f.jar.get(SESSION_COOKIE_NAME)?.is_some());

        f.sessions.destroy_session()?;
        assert!(f.jar.get(SESSION_COOKIE_NAME)?.is_none());
        Ok(())
    }

    #[test]
    fn explicit_refresh_extends_valid_session() -> Result<(), StoreError> {
        let f = fixture();
        f.sessions.create_session(false)?;
        f.clock.advance(Duration::minutes(2));
        let refreshed = f.sessions.refresh_session()?.map(|s| s.expires_at);
        assert_eq!(refreshed, Some(f.clock.now() + Duration::minutes(15)));
        Ok(())
    }

    #[test]
    fn create_records_last_login() -> Result<(), StoreError> {
        let f = fixture();
        assert_eq!(f.sessions.last_login()?, None);
        f.sessions.create_session(false)?;
        assert_eq!(f.sessions.last_login()?, Some(f.clock.now()));
        assert_eq!(
            f.store.get(LAST_LOGIN_KEY)?.as_deref(),
            Some("2026-04-02T07:45:00.000Z")
        );
        Ok(())
    }

    #[test]
    fn stored_layout_uses_millis() -> Result<(), StoreError> {
        let f = fixture();
        let session = f.sessions.create_session(false)?;
        let raw = f.store.get(ADMIN_SESSION_KEY)?.unwrap_or_default();
        let value: serde_json::Value =
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
        assert_eq!(value["expiry"], session.expires_at.timestamp_millis());
        assert_eq!(value["sessionId"], session.session_id.as_str());
        assert_eq!(value["remember"], false);
        Ok(())
    }

    #[test]
    fn session_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_session_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
