//! Auth configuration: admin identity, lockout and session policy.

use chrono::Duration;
use secrecy::SecretString;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BLOCK_MINUTES: i64 = 15;
const DEFAULT_SESSION_TTL_MINUTES: i64 = 15;
const DEFAULT_RENEWAL_WINDOW_MINUTES: i64 = 5;
const DEFAULT_REMEMBER_DAYS: i64 = 7;
const DEFAULT_LOG_CAPACITY: usize = 100;

/// Describes the client the events are attributed to.
///
/// With no address configured, events get a simulated LAN address. That value
/// is not evidence of anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub address: Option<String>,
    pub user_agent: String,
}

impl ClientContext {
    #[must_use]
    pub fn new(address: Option<String>, user_agent: impl Into<String>) -> Self {
        Self {
            address,
            user_agent: user_agent.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    admin_email: String,
    default_password: SecretString,
    max_attempts: u32,
    block_duration: Duration,
    session_ttl: Duration,
    renewal_window: Duration,
    remember_duration: Duration,
    log_capacity: usize,
    client: ClientContext,
}

impl AuthConfig {
    #[must_use]
    pub fn new(admin_email: String, default_password: SecretString) -> Self {
        Self {
            admin_email: admin_email.trim().to_string(),
            default_password,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            block_duration: Duration::minutes(DEFAULT_BLOCK_MINUTES),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            renewal_window: Duration::minutes(DEFAULT_RENEWAL_WINDOW_MINUTES),
            remember_duration: Duration::days(DEFAULT_REMEMBER_DAYS),
            log_capacity: DEFAULT_LOG_CAPACITY,
            client: ClientContext::new(None, concat!("agriguard/", env!("CARGO_PKG_VERSION"))),
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_block_duration(mut self, duration: Duration) -> Self {
        self.block_duration = duration;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_renewal_window(mut self, window: Duration) -> Self {
        self.renewal_window = window;
        self
    }

    #[must_use]
    pub fn with_remember_duration(mut self, duration: Duration) -> Self {
        self.remember_duration = duration;
        self
    }

    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: ClientContext) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub(crate) fn default_password(&self) -> &SecretString {
        &self.default_password
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    #[must_use]
    pub fn renewal_window(&self) -> Duration {
        self.renewal_window
    }

    #[must_use]
    pub fn remember_duration(&self) -> Duration {
        self.remember_duration
    }

    #[must_use]
    pub fn log_capacity(&self) -> usize {
        self.log_capacity
    }

    #[must_use]
    pub fn client(&self) -> &ClientContext {
        &self.client
    }
}
