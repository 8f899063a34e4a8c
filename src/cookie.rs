//! Durable cookie jar used for the "remember me" token.
//!
//! The jar lives outside the primary store, so clearing local storage leaves
//! the cookie in place. Nothing reads the token back to restore a session;
//! the jar only records what was issued and cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::store::{get_json, set_json, KeyValueStore, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("Strict"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableCookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
}

impl DurableCookie {
    /// Renders the cookie as a `Set-Cookie` style string.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; expires={}; path={}",
            self.name,
            self.value,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));
        cookie
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

pub struct CookieJar {
    store: Arc<dyn KeyValueStore>,
}

impl CookieJar {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Returns an error if the jar cannot be written.
    pub fn set(&self, cookie: &DurableCookie) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), &cookie.name, cookie)
    }

    /// # Errors
    /// Returns an error if the jar cannot be read.
    pub fn get(&self, name: &str) -> Result<Option<DurableCookie>, StoreError> {
        get_json(self.store.as_ref(), name)
    }

    /// # Errors
    /// Returns an error if the jar cannot be written.
    pub fn clear(&self, name: &str) -> Result<(), StoreError> {
        self.store.remove(name)
    }
}
