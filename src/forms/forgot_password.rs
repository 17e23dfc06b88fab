use super::{FormController, Submission, UNEXPECTED_ERROR};
use crate::{client::AuthClient, validation::validate_forgot_password};
use tracing::{debug, error};

pub const RESET_EMAIL_SENT: &str = "Password reset email sent. Please check your inbox.";
pub const FORGOT_PASSWORD_FAILED: &str = "An error occurred. Please try again.";

pub struct ForgotPasswordForm {
    form: FormController,
    client: AuthClient,
}

impl ForgotPasswordForm {
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

    pub async fn submit(&mut self, email: &str) -> Submission {
        let email = match self.form.begin(|| validate_forgot_password(email)) {
            Ok(email) => email,
            Err(submission) => return submission,
        };

        match self.client.forgot_password(&email).await {
            Ok(response) if response.is_success() => self.form.succeed(RESET_EMAIL_SENT, None),
            Ok(response) => {
                debug!("forgot-password rejected: {}", response.status);
                self.form
                    .fail(response.message().unwrap_or(FORGOT_PASSWORD_FAILED));
            }
            Err(err) => {
                error!("Forgot password error: {}", err);
                self.form.fail(UNEXPECTED_ERROR);
            }
        }

        Submission::Completed
    }
}
