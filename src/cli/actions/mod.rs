pub mod login;
pub mod logs;
pub mod password;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;
use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: SecretString,
        remember: bool,
    },
    Logout,
    Status,
    ChangePassword {
        current: SecretString,
        new: SecretString,
    },
    GeneratePassword,
    ValidatePassword {
        candidate: SecretString,
    },
    Logs {
        limit: usize,
    },
    PruneLogs {
        days: i64,
    },
}

impl Action {
    /// Whether the action reads or writes the profile stores.
    #[must_use]
    pub fn needs_profile(&self) -> bool {
        !matches!(self, Self::GeneratePassword | Self::ValidatePassword { .. })
    }

    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals)
    }
}
