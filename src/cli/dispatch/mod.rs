//! Map parsed arguments to the action the binary runs.

use crate::cli::{
    actions::{
        client::{self as client_action, ClientCommand},
        server as server_action, Action,
    },
    commands::{client, server},
};
use crate::forms::ResetLink;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    if name == server::SUBCOMMAND {
        let options = server::Options::parse(sub)?;

        return Ok(Action::Server(server_action::Args {
            port: options.port,
            backend_url: options.backend_url,
            backend_timeout_seconds: options.backend_timeout_seconds,
            remember_me_max_age: options.remember_me_max_age,
        }));
    }

    let options = client::Options::parse(sub)?;

    let command = match name {
        client::SUBCOMMAND_SIGNUP => ClientCommand::Signup {
            email: required(sub, client::ARG_EMAIL)?,
            password: secret(sub, client::ARG_PASSWORD)?,
            confirm_password: secret(sub, client::ARG_CONFIRM_PASSWORD)?,
        },
        client::SUBCOMMAND_LOGIN => ClientCommand::Login {
            email: required(sub, client::ARG_EMAIL)?,
            password: secret(sub, client::ARG_PASSWORD)?,
            remember_me: sub.get_flag(client::ARG_REMEMBER_ME),
        },
        client::SUBCOMMAND_FORGOT_PASSWORD => ClientCommand::ForgotPassword {
            email: required(sub, client::ARG_EMAIL)?,
        },
        client::SUBCOMMAND_RESET_PASSWORD => ClientCommand::ResetPassword {
            link: reset_link(sub),
            password: secret(sub, client::ARG_PASSWORD)?,
            confirm_password: secret(sub, client::ARG_CONFIRM_PASSWORD)?,
        },
        client::SUBCOMMAND_DASHBOARD => ClientCommand::Dashboard,
        client::SUBCOMMAND_LOGOUT => ClientCommand::Logout,
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(Action::Client(client_action::Args {
        api_url: options.api_url,
        session_file: options.session_file,
        command,
    }))
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    required(matches, id).map(SecretString::from)
}

fn reset_link(matches: &ArgMatches) -> ResetLink {
    match matches.get_one::<String>(client::ARG_LINK) {
        Some(link) => ResetLink::parse(link),
        None => ResetLink::new(
            matches.get_one::<String>(client::ARG_UID).cloned(),
            matches.get_one::<String>(client::ARG_TOKEN).cloned(),
        ),
    }
}
