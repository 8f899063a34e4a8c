use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// # Errors
/// Returns an error if the profile cannot be read.
pub fn show(globals: &GlobalArgs, limit: usize) -> Result<()> {
    let auth = globals.authenticator()?;
    for event in auth.events().events(limit)? {
        println!(
            "{} {:<16} {:<15} {}",
            event.timestamp.to_rfc3339(),
            event.action,
            event.ip,
            event.details
        );
    }
    Ok(())
}

/// # Errors
/// Returns an error if the profile cannot be read or written.
pub fn prune(globals: &GlobalArgs, days: i64) -> Result<()> {
    let auth = globals.authenticator()?;
    let remaining = auth.events().prune_older_than(days)?;
    println!("{remaining} security events kept");
    Ok(())
}
