//! Admin login flow built from the lockout guard, session manager and event log.
//!
//! Flow Overview:
//! 1) Refuse while the lockout guard reports a block (no attempt is recorded).
//! 2) Compare the trimmed email, then the password, against the configured
//!    identity; each mismatch records one failed attempt.
//! 3) On success reset the guard, create the session and log `LOGIN_SUCCESS`.
//!
//! The password is stored and compared in plaintext. This layer is a UI
//! affordance over local state, not a security boundary.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    clock::Clock,
    config::AuthConfig,
    cookie::CookieJar,
    events::{SecurityAction, SecurityEventLog},
    lockout::{LockoutGuard, LoginStats},
    password::{validate_password, PasswordRule},
    session::{Session, SessionManager},
    store::{KeyValueStore, StoreError, ADMIN_PASSWORD_KEY},
};

/// Page the admin panel sends unauthenticated visitors to.
pub const LOGIN_VIEW: &str = "admin-login.html";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Account is temporarily blocked. Please try again later.")]
    Blocked { until: Option<DateTime<Utc>> },
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,
    #[error("{}", join_rules(.0))]
    WeakPassword(Vec<PasswordRule>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_rules(rules: &[PasswordRule]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome of guarding a privileged view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Allow,
    RedirectToLogin,
}

impl Gate {
    /// Page to send the visitor to, if the view must not render.
    #[must_use]
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(LOGIN_VIEW),
        }
    }
}

pub struct Authenticator {
    config: AuthConfig,
    store: Arc<dyn KeyValueStore>,
    events: Arc<SecurityEventLog>,
    guard: LockoutGuard,
    sessions: SessionManager,
}

impl Authenticator {
    /// Wires every component to the same primary store and clock.
    /// `cookie_store` backs the durable cookie jar and must be a separate store.
    #[must_use]
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn KeyValueStore>,
        cookie_store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let events = Arc::new(SecurityEventLog::new(
            store.clone(),
            clock.clone(),
            config.log_capacity(),
            config.client().clone(),
        ));
        let guard = LockoutGuard::new(
            store.clone(),
            clock.clone(),
            events.clone(),
            config.max_attempts(),
            config.block_duration(),
        );
        let sessions = SessionManager::new(
            store.clone(),
            CookieJar::new(cookie_store),
            clock,
            events.clone(),
            config.admin_email().to_string(),
            config.session_ttl(),
            config.renewal_window(),
            config.remember_duration(),
        );
        Self {
            config,
            store,
            events,
            guard,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn guard(&self) -> &LockoutGuard {
        &self.guard
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[must_use]
    pub fn events(&self) -> &SecurityEventLog {
        &self.events
    }

    /// # Errors
    /// Returns `Blocked` while locked out, `InvalidEmail` or `IncorrectPassword`
    /// on a credential mismatch, or `Store` if persistence fails.
    pub fn login(&self, email: &str, password: &str, remember: bool) -> Result<Session, AuthError> {
        if self.guard.is_blocked()? {
            warn!("Login refused: account blocked");
            return Err(AuthError::Blocked {
                until: self.guard.blocked_until()?,
            });
        }

        if email.trim() != self.config.admin_email() {
            self.guard.record_failed_attempt()?;
            return Err(AuthError::InvalidEmail);
        }

        if password != self.stored_password()?.expose_secret() {
            self.guard.record_failed_attempt()?;
            return Err(AuthError::IncorrectPassword);
        }

        self.guard.reset()?;
        let session = self.sessions.create_session(remember)?;
        let origin = self.events.origin_address();
        self.events.log_event(
            SecurityAction::LoginSuccess,
            &format!("Admin login from {origin}"),
        )?;
        info!(session_id = %session.session_id, "Admin login succeeded");
        Ok(session)
    }

    /// # Errors
    /// Returns an error if the session cannot be cleared.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.sessions.destroy_session()?;
        Ok(())
    }

    /// Replaces the admin password after verifying the current one.
    ///
    /// # Errors
    /// Returns `CurrentPasswordIncorrect`, `WeakPassword` with the unmet rules,
    /// or `Store` if persistence fails. Nothing is written on failure.
    pub fn change_password(&self, current: &str, next: &str) -> Result<(), AuthError> {
        if current != self.stored_password()?.expose_secret() {
            return Err(AuthError::CurrentPasswordIncorrect);
        }

        let validation = validate_password(next);
        if !validation.valid {
            return Err(AuthError::WeakPassword(validation.errors));
        }

        self.store.set(ADMIN_PASSWORD_KEY, next)?;
        self.events
            .log_event(SecurityAction::PasswordChange, "Admin password changed")?;
        Ok(())
    }

    /// Login-form summary of attempts left or lockout time remaining.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn login_stats(&self) -> Result<LoginStats, AuthError> {
        Ok(self.guard.stats()?)
    }

    /// Decides whether a privileged view may render.
    ///
    /// # Errors
    /// Returns an error if the session store fails.
    pub fn gate(&self) -> Result<Gate, AuthError> {
        if self.sessions.check_session()? {
            Ok(Gate::Allow)
        } else {
            Ok(Gate::RedirectToLogin)
        }
    }

    fn stored_password(&self) -> Result<SecretString, StoreError> {
        Ok(match self.store.get(ADMIN_PASSWORD_KEY)? {
            Some(password) if !password.is_empty() => SecretString::from(password),
            _ => self.config.default_password().clone(),
        })
    }
}
