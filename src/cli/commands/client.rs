use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use std::path::PathBuf;

pub const SUBCOMMAND_SIGNUP: &str = "signup";
pub const SUBCOMMAND_LOGIN: &str = "login";
pub const SUBCOMMAND_FORGOT_PASSWORD: &str = "forgot-password";
pub const SUBCOMMAND_RESET_PASSWORD: &str = "reset-password";
pub const SUBCOMMAND_DASHBOARD: &str = "dashboard";
pub const SUBCOMMAND_LOGOUT: &str = "logout";

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_CONFIRM_PASSWORD: &str = "confirm-password";
pub const ARG_REMEMBER_ME: &str = "remember-me";
pub const ARG_LINK: &str = "link";
pub const ARG_UID: &str = "uid";
pub const ARG_TOKEN: &str = "token";

/// Arguments shared by every client subcommand.
#[derive(Debug, Clone)]
pub struct Options {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl Options {
    /// # Errors
    /// Returns an error if no session file is given and no config directory
    /// can be found.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_API_URL}"))?;

        let session_file = match matches.get_one::<String>(ARG_SESSION_FILE) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file()
                .ok_or_else(|| anyhow!("could not find a config directory, use --{ARG_SESSION_FILE}"))?,
        };

        Ok(Self {
            api_url,
            session_file,
        })
    }
}

/// `<config dir>/authgate/session.json`
#[must_use]
pub fn default_session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("session.json"))
}

fn with_client_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the authgate proxy")
                .env("AUTHGATE_API_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("File keeping the remembered session tokens")
                .long_help(
                    "File keeping the persistent session tokens (default: <config dir>/authgate/session.json)",
                )
                .env("AUTHGATE_SESSION_FILE"),
        )
}

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long(ARG_PASSWORD)
        .help("Password")
        .env("AUTHGATE_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn confirm_password_arg() -> Arg {
    Arg::new(ARG_CONFIRM_PASSWORD)
        .long(ARG_CONFIRM_PASSWORD)
        .help("Password confirmation")
        .env("AUTHGATE_CONFIRM_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new(SUBCOMMAND_SIGNUP)
            .about("Create an account")
            .arg(email_arg())
            .arg(password_arg())
            .arg(confirm_password_arg()),
        Command::new(SUBCOMMAND_LOGIN)
            .about("Log in and keep the session tokens")
            .arg(email_arg())
            .arg(password_arg())
            .arg(
                Arg::new(ARG_REMEMBER_ME)
                    .long(ARG_REMEMBER_ME)
                    .help("Keep the refresh token across runs")
                    .action(ArgAction::SetTrue),
            ),
        Command::new(SUBCOMMAND_FORGOT_PASSWORD)
            .about("Request a password reset email")
            .arg(email_arg()),
        Command::new(SUBCOMMAND_RESET_PASSWORD)
            .about("Set a new password from a reset link")
            .arg(
                Arg::new(ARG_LINK)
                    .long(ARG_LINK)
                    .help("Reset link from the email, example: https://app.tld/reset-password?uid=MQ&token=abc")
                    .conflicts_with_all([ARG_UID, ARG_TOKEN]),
            )
            .arg(
                Arg::new(ARG_UID)
                    .long(ARG_UID)
                    .help("User id from the reset link")
                    .requires(ARG_TOKEN),
            )
            .arg(
                Arg::new(ARG_TOKEN)
                    .long(ARG_TOKEN)
                    .help("Token from the reset link")
                    .requires(ARG_UID),
            )
            .group(
                ArgGroup::new("reset-link")
                    .args([ARG_LINK, ARG_UID])
                    .required(true),
            )
            .arg(password_arg())
            .arg(confirm_password_arg()),
        Command::new(SUBCOMMAND_DASHBOARD).about("Show the logged in user"),
        Command::new(SUBCOMMAND_LOGOUT).about("Forget the session tokens"),
    ]
    .into_iter()
    .map(with_client_args)
    .collect()
}
