use super::{FormController, Navigation, Submission, LOGIN_PATH, UNEXPECTED_ERROR};
use crate::{client::AuthClient, validation::validate_signup};
use secrecy::SecretString;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

pub const ACCOUNT_CREATED: &str = "Account created successfully!";
pub const SIGNUP_FAILED: &str = "Failed to create account. Please try again.";

/// Delay before leaving for the login page after a signup.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub struct SignupForm {
    form: FormController,
    client: AuthClient,
}

impl SignupForm {
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self {
            form: FormController::new(),
            client,
        }
    }

    #[must_use]
    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub async fn submit(
        &mut self,
        email: &str,
        password: SecretString,
        confirm_password: SecretString,
    ) -> Submission {
        let request = match self
            .form
            .begin(|| validate_signup(email, password, confirm_password))
        {
            Ok(request) => request,
            Err(submission) => return submission,
        };

        match self.client.signup(&request).await {
            Ok(response) if response.is_success() => {
                self.form.succeed(
                    ACCOUNT_CREATED,
                    Some(Navigation::after(LOGIN_PATH, REDIRECT_DELAY)),
                );
            }
            Ok(response) => {
                debug!("signup rejected: {}", response.status);
                let message = error_message(&response.body);
                self.form
                    .fail(message.unwrap_or_else(|| SIGNUP_FAILED.to_string()));
            }
            Err(err) => {
                error!("Signup error: {}", err);
                self.form.fail(UNEXPECTED_ERROR);
            }
        }

        Submission::Completed
    }
}

/// First human readable message of a rejected signup: `message`, then
/// `detail`, then the first field error (`{"email": ["taken"]}`).
fn error_message(body: &Value) -> Option<String> {
    let text = |value: &Value| {
        value
            .as_str()
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    let object = body.as_object()?;

    if let Some(message) = object.get("message").and_then(text) {
        return Some(message);
    }

    if let Some(detail) = object.get("detail").and_then(text) {
        return Some(detail);
    }

    object.values().find_map(|value| match value {
        Value::Array(messages) => messages.iter().find_map(text),
        Value::String(_) => text(value),
        _ => None,
    })
}
