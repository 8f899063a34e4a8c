use crate::{auth::AuthError, cli::globals::GlobalArgs, lockout::LoginStats, Authenticator};
use anyhow::{anyhow, Result};
use std::io::{self, Write};
use tracing::debug;

/// Handle the login action
/// # Errors
/// Returns an error if the credentials are rejected or the profile cannot be written.
pub fn execute(globals: &GlobalArgs, email: &str, password: &str, remember: bool) -> Result<()> {
    let auth = globals.authenticator()?;
    attempt(&auth, email, password, remember, &mut io::stdout().lock())
}

pub(crate) fn attempt<W: Write>(
    auth: &Authenticator,
    email: &str,
    password: &str,
    remember: bool,
    out: &mut W,
) -> Result<()> {
    match auth.login(email, password, remember) {
        Ok(session) => {
            debug!(session_id = %session.session_id, "login stored in profile");
            writeln!(
                out,
                "Logged in as {} (session expires {})",
                session.email,
                session.expires_at.to_rfc3339()
            )?;
            Ok(())
        }
        Err(AuthError::Store(err)) => Err(err.into()),
        Err(err) => {
            let hint = match auth.login_stats()? {
                LoginStats::Blocked { minutes_left, .. } => {
                    format!(" (account blocked for {minutes_left} minutes)")
                }
                LoginStats::Warning { attempts_left } => {
                    format!(" ({attempts_left} login attempts remaining)")
                }
                LoginStats::Clear => String::new(),
            };
            Err(anyhow!("{err}{hint}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use secrecy::SecretString;
    use std::sync::Arc;

    const EMAIL: &str = "extension-admin@example.org";

    fn authenticator(dir: &std::path::Path) -> Result<Authenticator> {
        let globals = GlobalArgs::new(
            dir.to_path_buf(),
            EMAIL.to_string(),
            SecretString::from("1234"),
        );
        globals.authenticator_with_clock(Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 9, 14, 0, 0).unwrap(),
        )))
    }

    fn failure(auth: &Authenticator, password: &str) -> String {
        let mut out = Vec::new();
        match attempt(auth, EMAIL, password, false, &mut out) {
            Ok(()) => panic!("login with {password:?} should fail"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn failures_count_down_then_block() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let auth = authenticator(dir.path())?;

        assert_eq!(
            failure(&auth, "wrong"),
            "Incorrect password (2 login attempts remaining)"
        );
        assert_eq!(
            failure(&auth, "wrong"),
            "Incorrect password (1 login attempts remaining)"
        );
        assert_eq!(
            failure(&auth, "wrong"),
            "Incorrect password (account blocked for 15 minutes)"
        );
        assert!(failure(&auth, "1234").starts_with("Account is temporarily blocked"));
        Ok(())
    }

    #[test]
    fn success_prints_session_and_clears_hint() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let auth = authenticator(dir.path())?;
        failure(&auth, "wrong");

        let mut out = Vec::new();
        attempt(&auth, EMAIL, "1234", false, &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with(&format!("Logged in as {EMAIL}")));
        assert_eq!(auth.login_stats()?, LoginStats::Clear);
        Ok(())
    }
}
