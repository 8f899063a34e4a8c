use crate::{
    cli::globals::GlobalArgs,
    password::{generate_strong_password, validate_password},
};
use anyhow::{bail, Result};

/// # Errors
/// Returns an error if the current password is wrong, the new one fails the
/// policy, or the profile cannot be written.
pub fn change(globals: &GlobalArgs, current: &str, new: &str) -> Result<()> {
    let auth = globals.authenticator()?;
    auth.change_password(current, new)?;
    println!("Admin password changed");
    Ok(())
}

pub fn generate() {
    println!("{}", generate_strong_password());
}

/// # Errors
/// Returns an error listing the unmet rules when the candidate fails the policy.
pub fn validate(candidate: &str) -> Result<()> {
    let validation = validate_password(candidate);
    println!("Strength: {}/5", validation.strength);
    if !validation.valid {
        bail!("{}", validation.messages().join("\n"));
    }
    println!("Password meets the policy");
    Ok(())
}
