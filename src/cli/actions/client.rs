use crate::{
    client::AuthClient,
    forms::{
        AlertKind, Dashboard, DashboardLoad, ForgotPasswordForm, FormController, FormState,
        LoginForm, Navigation, ResetLink, ResetPasswordForm, SignupForm, Submission,
    },
    session::{FileStore, MemoryStore, SessionManager},
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub enum ClientCommand {
    Signup {
        email: String,
        password: SecretString,
        confirm_password: SecretString,
    },
    Login {
        email: String,
        password: SecretString,
        remember_me: bool,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        link: ResetLink,
        password: SecretString,
        confirm_password: SecretString,
    },
    Dashboard,
    Logout,
}

#[derive(Debug)]
pub struct Args {
    pub api_url: String,
    pub session_file: PathBuf,
    pub command: ClientCommand,
}

/// Drive one form flow against the proxy and print its outcome.
/// # Errors
/// Returns an error if the session file cannot be used, the proxy URL is
/// invalid or the flow ends in an error.
pub async fn execute(args: Args) -> Result<()> {
    let client = AuthClient::new(&args.api_url).context("invalid AUTHGATE_API_URL")?;

    // session scope lives as long as this process
    let persistent = FileStore::open(&args.session_file)
        .with_context(|| format!("could not open {}", args.session_file.display()))?;
    let session = SessionManager::new(persistent, MemoryStore::new());

    debug!("session file: {}", args.session_file.display());

    match args.command {
        ClientCommand::Signup {
            email,
            password,
            confirm_password,
        } => {
            let mut form = SignupForm::new(client);
            let submission = form.submit(&email, password, confirm_password).await;
            report(form.form(), submission)
        }
        ClientCommand::Login {
            email,
            password,
            remember_me,
        } => {
            let mut form = LoginForm::new(client, &session);
            let submission = form.submit(&email, password, remember_me).await;
            report(form.form(), submission)
        }
        ClientCommand::ForgotPassword { email } => {
            let mut form = ForgotPasswordForm::new(client);
            let submission = form.submit(&email).await;
            report(form.form(), submission)
        }
        ClientCommand::ResetPassword {
            link,
            password,
            confirm_password,
        } => {
            let mut form = ResetPasswordForm::new(client, link);
            let submission = form.submit(password, confirm_password).await;
            report(form.form(), submission)
        }
        ClientCommand::Dashboard => match Dashboard::new(client, &session).load().await {
            DashboardLoad::User(user) => {
                println!("{}", serde_json::to_string_pretty(&user)?);
                Ok(())
            }
            DashboardLoad::Redirect(navigation) => {
                navigate(&navigation);
                Err(anyhow!("not logged in"))
            }
        },
        ClientCommand::Logout => {
            let navigation = Dashboard::new(client, &session).logout()?;
            println!("Logged out");
            navigate(&navigation);
            Ok(())
        }
    }
}

fn report(form: &FormController, submission: Submission) -> Result<()> {
    for (field, messages) in form.errors().iter() {
        for message in messages {
            eprintln!("{field}: {message}");
        }
    }

    if let Some(alert) = form.alert() {
        match alert.kind {
            AlertKind::Success => println!("{}", alert.message),
            AlertKind::Error => eprintln!("{}", alert.message),
        }
    }

    if let Some(navigation) = form.navigation() {
        navigate(navigation);
    }

    match (submission, form.state()) {
        (Submission::Invalid, _) => Err(anyhow!("invalid input")),
        (_, FormState::Error) => Err(anyhow!("request failed")),
        _ => Ok(()),
    }
}

fn navigate(navigation: &Navigation) {
    if navigation.after.is_zero() {
        println!("Next: {}", navigation.to);
    } else {
        println!(
            "Next: {} (in {}s)",
            navigation.to,
            navigation.after.as_secs()
        );
    }
}
