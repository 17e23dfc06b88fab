use super::{FormController, Navigation, Submission, DASHBOARD_PATH, UNEXPECTED_ERROR};
use crate::{
    client::{ApiResponse, AuthClient},
    session::{KeyValueStore, SessionManager, SessionTokens},
    validation::validate_login,
};
use secrecy::SecretString;
use tracing::{debug, error};

pub const LOGGED_IN: &str = "Logged in successfully!";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct LoginForm<'s, P, S> {
    form: FormController,
    client: AuthClient,
    session: &'s SessionManager<P, S>,
}

impl<'s, P: KeyValueStore, S: KeyValueStore> LoginForm<'s, P, S> {
    #[must_use]
    pub fn new(client: AuthClient, session: &'s SessionManager<P, S>) -> Self {
        Self {
            form: FormController::new(),
            client,
            session,
        }
    }

    #[must_use]
    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    /// Validate, log in through the gateway and keep the returned tokens.
    pub async fn submit(
        &mut self,
        email: &str,
        password: SecretString,
        remember_me: bool,
    ) -> Submission {
        let credentials = match self.form.begin(|| validate_login(email, password)) {
            Ok(credentials) => credentials,
            Err(submission) => return submission,
        };

        match self.client.login(&credentials, remember_me).await {
            Ok(response) if response.is_success() => self.logged_in(&response, remember_me),
            Ok(response) => {
                debug!("login rejected: {}", response.status);
                self.form
                    .fail(response.message().unwrap_or(INVALID_CREDENTIALS));
            }
            Err(err) => {
                error!("Login error: {}", err);
                self.form.fail(UNEXPECTED_ERROR);
            }
        }

        Submission::Completed
    }

    fn logged_in(&mut self, response: &ApiResponse, remember_me: bool) {
        let Some(tokens) = SessionTokens::from_body(&response.body) else {
            error!("Login response has no access/refresh tokens");
            self.form.fail(UNEXPECTED_ERROR);
            return;
        };

        if let Err(err) = self.session.store(&tokens, remember_me) {
            error!("Failed to store session tokens: {}", err);
            self.form.fail(UNEXPECTED_ERROR);
            return;
        }

        self.form
            .succeed(LOGGED_IN, Some(Navigation::now(DASHBOARD_PATH)));
    }
}
