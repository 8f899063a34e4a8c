//! Failed-login counting and temporary lockout.
//!
//! Flow Overview:
//! 1) Each failed credential check increments `login_attempts`.
//! 2) Reaching the configured maximum stores `account_blocked` = now + block duration.
//! 3) `is_blocked` clears both keys lazily once the block has run out.
//! 4) A successful login resets both keys.
//!
//! Callers must consult `is_blocked` before checking credentials, so the counter
//! never grows while a block is active.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    clock::Clock,
    events::{SecurityAction, SecurityEventLog},
    store::{get_i64, KeyValueStore, StoreError, ACCOUNT_BLOCKED_KEY, LOGIN_ATTEMPTS_KEY},
};

/// Summary shown next to the login form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginStats {
    Clear,
    Warning { attempts_left: u32 },
    Blocked { until: DateTime<Utc>, minutes_left: i64 },
}

pub struct LockoutGuard {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    events: Arc<SecurityEventLog>,
    max_attempts: u32,
    block_duration: Duration,
}

impl LockoutGuard {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        events: Arc<SecurityEventLog>,
        max_attempts: u32,
        block_duration: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            events,
            max_attempts,
            block_duration,
        }
    }

    /// Consecutive failures since the last reset.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn attempts(&self) -> Result<u32, StoreError> {
        let stored = get_i64(self.store.as_ref(), LOGIN_ATTEMPTS_KEY)?.unwrap_or(0);
        Ok(u32::try_from(stored).unwrap_or(0))
    }

    /// Stored block expiry, without the lazy cleanup `is_blocked` performs.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn blocked_until(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(get_i64(self.store.as_ref(), ACCOUNT_BLOCKED_KEY)?
            .and_then(DateTime::<Utc>::from_timestamp_millis))
    }

    /// Counts a failure and blocks when the count reaches the maximum.
    /// Returns the new count.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn record_failed_attempt(&self) -> Result<u32, StoreError> {
        let attempts = self.attempts()?.saturating_add(1);
        self.store.set(LOGIN_ATTEMPTS_KEY, &attempts.to_string())?;
        debug!("Failed login attempt {attempts}/{}", self.max_attempts);

        if attempts >= self.max_attempts {
            self.block()?;
        }
        Ok(attempts)
    }

    /// True while a stored block lies in the future. An expired block is
    /// cleared together with the counter.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn is_blocked(&self) -> Result<bool, StoreError> {
        let Some(until) = get_i64(self.store.as_ref(), ACCOUNT_BLOCKED_KEY)? else {
            return Ok(false);
        };

        if until <= self.clock.now_millis() {
            self.store.remove(ACCOUNT_BLOCKED_KEY)?;
            self.store.remove(LOGIN_ATTEMPTS_KEY)?;
            debug!("Account block expired, attempts cleared");
            return Ok(false);
        }

        Ok(true)
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.store.remove(LOGIN_ATTEMPTS_KEY)?;
        self.store.remove(ACCOUNT_BLOCKED_KEY)
    }

    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn stats(&self) -> Result<LoginStats, StoreError> {
        if self.is_blocked()? {
            if let Some(until) = self.blocked_until()? {
                let remaining_ms = (until - self.clock.now()).num_milliseconds();
                // Round up so a partial minute still reads as one.
                let minutes_left = (remaining_ms + 59_999) / 60_000;
                return Ok(LoginStats::Blocked {
                    until,
                    minutes_left,
                });
            }
        }

        let attempts = self.attempts()?;
        if attempts > 0 {
            return Ok(LoginStats::Warning {
                attempts_left: self.max_attempts.saturating_sub(attempts),
            });
        }
        Ok(LoginStats::Clear)
    }

    fn block(&self) -> Result<(), StoreError> {
        let until = self.clock.now() + self.block_duration;
        self.store
            .set(ACCOUNT_BLOCKED_KEY, &until.timestamp_millis().to_string())?;
        warn!("Account blocked until {}", until.to_rfc3339());
        self.events.log_event(
            SecurityAction::AccountBlocked,
            &format!("Account blocked until {}", until.to_rfc3339()),
        )?;
        Ok(())
    }
}
