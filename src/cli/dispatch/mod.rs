use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = globals(matches);

    let action = match matches.subcommand() {
        Some(("login", sub_m)) => Action::Login {
            email: sub_m
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: --email")?,
            password: sub_m
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
            remember: sub_m.get_flag("remember"),
        },
        Some(("logout", _)) => Action::Logout,
        Some(("status", _)) => Action::Status,
        Some(("change-password", sub_m)) => Action::ChangePassword {
            current: sub_m
                .get_one::<String>("current")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --current")?,
            new: sub_m
                .get_one::<String>("new")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --new")?,
        },
        Some(("generate-password", _)) => Action::GeneratePassword,
        Some(("validate-password", sub_m)) => Action::ValidatePassword {
            candidate: sub_m
                .get_one::<String>("candidate")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: <candidate>")?,
        },
        Some(("logs", sub_m)) => Action::Logs {
            limit: sub_m.get_one::<usize>("limit").copied().unwrap_or(20),
        },
        Some(("prune-logs", sub_m)) => Action::PruneLogs {
            days: sub_m.get_one::<i64>("days").copied().unwrap_or(30),
        },
        _ => anyhow::bail!("missing subcommand"),
    };

    if action.needs_profile() {
        if globals.admin_email.is_empty() {
            anyhow::bail!("missing required argument: --admin-email");
        }
        if matches.get_one::<String>("default-password").is_none() {
            anyhow::bail!("missing required argument: --default-password");
        }
    }

    Ok((action, globals))
}

fn globals(matches: &clap::ArgMatches) -> GlobalArgs {
    let profile_dir = matches
        .get_one::<String>("profile-dir")
        .map_or_else(|| PathBuf::from(".agriguard"), PathBuf::from);
    let admin_email = matches
        .get_one::<String>("admin-email")
        .map(|email| email.trim().to_string())
        .unwrap_or_default();
    let default_password = matches
        .get_one::<String>("default-password")
        .cloned()
        .map(SecretString::from)
        .unwrap_or_default();

    let mut globals = GlobalArgs::new(profile_dir, admin_email, default_password);
    globals.client_address = matches.get_one::<String>("client-address").cloned();
    globals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(
            [
                ("AGRIGUARD_PROFILE_DIR", None::<&str>),
                ("AGRIGUARD_ADMIN_EMAIL", None),
                ("AGRIGUARD_DEFAULT_PASSWORD", None),
                ("AGRIGUARD_CLIENT_ADDRESS", None),
                ("AGRIGUARD_PASSWORD", None),
            ],
            f,
        );
    }

    #[test]
    fn login_requires_identity() {
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec![
                "agriguard",
                "login",
                "--email",
                "a@b.c",
                "--password",
                "x",
            ]);
            assert!(handler(&matches).is_err());
        });
    }

    #[test]
    fn login_action_is_built() -> Result<()> {
        let mut result = None;
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec![
                "agriguard",
                "--profile-dir",
                "/tmp/agri",
                "--admin-email",
                " admin@example.org ",
                "--default-password",
                "1234",
                "login",
                "--email",
                "admin@example.org",
                "--password",
                "1234",
            ]);
            result = Some(handler(&matches));
        });
        let (action, globals) = result.context("handler did not run")??;
        assert_eq!(globals.admin_email, "admin@example.org");
        assert_eq!(globals.default_password.expose_secret(), "1234");
        assert_eq!(globals.profile_dir, PathBuf::from("/tmp/agri"));
        match action {
            Action::Login {
                email,
                password,
                remember,
            } => {
                assert_eq!(email, "admin@example.org");
                assert_eq!(password.expose_secret(), "1234");
                assert!(!remember);
            }
            other => panic!("unexpected action: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn offline_actions_skip_identity() -> Result<()> {
        let mut result = None;
        clean_env(|| {
            let matches = commands::new().get_matches_from(vec![
                "agriguard",
                "validate-password",
                "Abcdef1!",
            ]);
            result = Some(handler(&matches));
        });
        let (action, _globals) = result.context("handler did not run")??;
        assert!(matches!(action, Action::ValidatePassword { .. }));
        Ok(())
    }
}
