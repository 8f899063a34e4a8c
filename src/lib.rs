//! # Agriguard (Admin Access Guard)
//!
//! `agriguard` holds the client-side admin access state of the agricultural
//! extension site: a login lockout, a single sliding-window session and a
//! capped security audit log. All state lives in an injected
//! [`store::KeyValueStore`], which stands in for the browser's local storage.
//!
//! ## Lockout
//!
//! - **Attempt Limit:** 3 consecutive failed logins.
//! - **Block Duration:** 15 minutes, cleared lazily on the next check.
//!
//! ## Sessions
//!
//! Sessions last 15 minutes and are extended by a full lifetime when checked
//! within 5 minutes of expiry. "Remember me" additionally writes a 7-day
//! cookie to a separate durable jar.
//!
//! > **Warning:** the admin password is stored and compared in plaintext and
//! > nothing is verified server-side. Treat this as a UX guard, not as
//! > authentication.

pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod cookie;
pub mod events;
pub mod lockout;
pub mod password;
pub mod session;
pub mod store;

pub use auth::{AuthError, Authenticator, Gate};
pub use config::{AuthConfig, ClientContext};
