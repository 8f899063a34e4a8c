use crate::{
    auth::Gate, cli::globals::GlobalArgs, lockout::LoginStats, session::SessionState,
    Authenticator,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::io::{self, Write};

/// # Errors
/// Returns an error if the profile cannot be written.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    let auth = globals.authenticator()?;
    auth.logout()?;
    println!("Session ended");
    Ok(())
}

/// # Errors
/// Returns an error if the profile cannot be read or written.
pub fn status(globals: &GlobalArgs) -> Result<()> {
    let auth = globals.authenticator()?;
    report(&auth, Utc::now(), &mut io::stdout().lock())
}

pub(crate) fn report<W: Write>(
    auth: &Authenticator,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<()> {
    let sessions = auth.sessions();

    // Read the state before the gate renews or destroys the record.
    let state = sessions.state()?;
    let gate = auth.gate()?;
    match (state, sessions.session()?) {
        (SessionState::Active, Some(session)) if gate == Gate::Allow => writeln!(
            out,
            "Session: active ({}), expires {}",
            session.session_id,
            session.expires_at.to_rfc3339()
        )?,
        (SessionState::Expired, _) => writeln!(out, "Session: expired")?,
        _ => writeln!(out, "Session: none")?,
    }

    if let Some(target) = gate.redirect_target() {
        writeln!(out, "Admin panel: redirect to {target}")?;
    }

    if let Some(cookie) = sessions.remember_cookie()? {
        let suffix = if cookie.is_expired(now) { " (expired)" } else { "" };
        writeln!(out, "Remember cookie: {}{suffix}", cookie.header_value())?;
    }

    if let Some(last_login) = sessions.last_login()? {
        writeln!(out, "Last login: {}", last_login.to_rfc3339())?;
    }

    match auth.login_stats()? {
        LoginStats::Blocked { minutes_left, .. } => {
            writeln!(out, "Account blocked for {minutes_left} minutes")?;
        }
        LoginStats::Warning { attempts_left } => {
            writeln!(out, "{attempts_left} login attempts remaining")?;
        }
        LoginStats::Clear => {}
    }
    Ok(())
}
