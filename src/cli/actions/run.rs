use crate::cli::{
    actions::{login, logs, password, session, Action},
    globals::GlobalArgs,
};
use anyhow::Result;
use secrecy::ExposeSecret;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Login {
            email,
            password,
            remember,
        } => login::execute(globals, &email, password.expose_secret(), remember),
        Action::Logout => session::logout(globals),
        Action::Status => session::status(globals),
        Action::ChangePassword { current, new } => {
            password::change(globals, current.expose_secret(), new.expose_secret())
        }
        Action::GeneratePassword => {
            password::generate();
            Ok(())
        }
        Action::ValidatePassword { candidate } => password::validate(candidate.expose_secret()),
        Action::Logs { limit } => logs::show(globals, limit),
        Action::PruneLogs { days } => logs::prune(globals, days),
    }
}
