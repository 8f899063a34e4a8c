pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("agriguard")
        .about("Admin access guard: login lockout, sessions and security audit log")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("profile-dir")
                .long("profile-dir")
                .help("Directory holding the local storage and cookie jar files")
                .default_value(".agriguard")
                .env("AGRIGUARD_PROFILE_DIR")
                .global(true),
        )
        .arg(
            Arg::new("admin-email")
                .long("admin-email")
                .help("Email address of the admin identity")
                .env("AGRIGUARD_ADMIN_EMAIL")
                .global(true),
        )
        .arg(
            Arg::new("default-password")
                .long("default-password")
                .help("Admin password used until a password change is stored")
                .env("AGRIGUARD_DEFAULT_PASSWORD")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new("client-address")
                .long("client-address")
                .help("Address recorded on security events (simulated when absent)")
                .env("AGRIGUARD_CLIENT_ADDRESS")
                .global(true),
        )
        .subcommand(
            Command::new("login")
                .about("Log in as admin and start a session")
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .env("AGRIGUARD_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("remember")
                        .long("remember")
                        .help("Also issue a 7-day remember-me cookie")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("logout").about("End the current session"))
        .subcommand(Command::new("status").about("Show session and lockout status"))
        .subcommand(
            Command::new("change-password")
                .about("Replace the admin password")
                .arg(Arg::new("current").long("current").required(true))
                .arg(Arg::new("new").long("new").required(true)),
        )
        .subcommand(Command::new("generate-password").about("Print a strong random password"))
        .subcommand(
            Command::new("validate-password")
                .about("Check a password against the policy")
                .arg(Arg::new("candidate").required(true)),
        )
        .subcommand(
            Command::new("logs")
                .about("Show recent security events")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .default_value("20")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("prune-logs")
                .about("Drop security events older than the given number of days")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .default_value("30")
                        .value_parser(clap::value_parser!(i64)),
                ),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "agriguard");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Admin access guard: login lockout, sessions and security audit log".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars(
            [
                ("AGRIGUARD_PASSWORD", None::<&str>),
                ("AGRIGUARD_LOG_LEVEL", None),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "agriguard",
                    "--admin-email",
                    "admin@example.org",
                    "login",
                    "--email",
                    "admin@example.org",
                    "--password",
                    "1234",
                    "--remember",
                ]);
                assert_eq!(
                    matches.get_one::<String>("admin-email").map(String::as_str),
                    Some("admin@example.org")
                );
                let Some(("login", sub)) = matches.subcommand() else {
                    panic!("expected login subcommand");
                };
                assert_eq!(
                    sub.get_one::<String>("password").map(String::as_str),
                    Some("1234")
                );
                assert!(sub.get_flag("remember"));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("AGRIGUARD_PROFILE_DIR", Some("/var/lib/agriguard")),
                ("AGRIGUARD_ADMIN_EMAIL", Some("admin@example.org")),
                ("AGRIGUARD_DEFAULT_PASSWORD", Some("1234")),
                ("AGRIGUARD_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["agriguard", "status"]);
                assert_eq!(
                    matches.get_one::<String>("profile-dir").map(String::as_str),
                    Some("/var/lib/agriguard")
                );
                assert_eq!(
                    matches
                        .get_one::<String>("default-password")
                        .map(String::as_str),
                    Some("1234")
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("AGRIGUARD_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["agriguard", "generate-password"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("AGRIGUARD_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["agriguard".to_string(), "generate-password".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_logs_defaults() {
        let matches = new().get_matches_from(vec!["agriguard", "logs"]);
        let Some(("logs", sub)) = matches.subcommand() else {
            panic!("expected logs subcommand");
        };
        assert_eq!(sub.get_one::<usize>("limit").copied(), Some(20));
    }
}
