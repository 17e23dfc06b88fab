use super::{FormController, Navigation, Submission, LOGIN_PATH, UNEXPECTED_ERROR};
use crate::{client::AuthClient, validation::validate_reset_password};
use secrecy::SecretString;
use std::{fmt, time::Duration};
use tracing::{debug, error};
use url::Url;

pub const PASSWORD_RESET: &str = "Password reset successfully. Redirecting to login page...";
pub const RESET_FAILED: &str = "Failed to reset password. Please try again.";
pub const INVALID_RESET_LINK: &str = "Invalid reset password link";

pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// `uid` and `token` carried by a password reset link.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResetLink {
    uid: Option<String>,
    token: Option<String>,
}

impl fmt::Debug for ResetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetLink")
            .field("uid", &self.uid)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ResetLink {
    #[must_use]
    pub fn new(uid: Option<String>, token: Option<String>) -> Self {
        Self {
            uid: uid.filter(|v| !v.is_empty()),
            token: token.filter(|v| !v.is_empty()),
        }
    }

    /// Read `?uid=..&token=..` from an absolute or path-only link. Anything
    /// unparseable yields an empty link.
    #[must_use]
    pub fn parse(link: &str) -> Self {
        let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(link.trim()))
        else {
            return Self::default();
        };

        let mut uid = None;
        let mut token = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "uid" => uid = Some(value.into_owned()),
                "token" => token = Some(value.into_owned()),
                _ => (),
            }
        }

        Self::new(uid, token)
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.uid.is_some() && self.token.is_some()
    }
}

pub struct ResetPasswordForm {
    form: FormController,
    client: AuthClient,
    link: ResetLink,
}

impl ResetPasswordForm {
    #[must_use]
    pub fn new(client: AuthClient, link: ResetLink) -> Self {
        Self {
            form: FormController::new(),
            client,
            link,
        }
    }

    #[must_use]
    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    #[must_use]
    pub fn link(&self) -> &ResetLink {
        &self.link
    }

    pub async fn submit(&mut self, password: SecretString, password2: SecretString) -> Submission {
        let passwords = match self
            .form
            .begin(|| validate_reset_password(password, password2))
        {
            Ok(passwords) => passwords,
            Err(submission) => return submission,
        };

        let (Some(uid), Some(token)) = (self.link.uid(), self.link.token()) else {
            debug!("reset link without uid or token");
            self.form.fail(INVALID_RESET_LINK);
            return Submission::Completed;
        };

        match self.client.reset_password(uid, token, &passwords).await {
            Ok(response) if response.is_success() => {
                self.form.succeed(
                    PASSWORD_RESET,
                    Some(Navigation::after(LOGIN_PATH, REDIRECT_DELAY)),
                );
            }
            Ok(response) => {
                debug!("reset-password rejected: {}", response.status);
                self.form.fail(response.message().unwrap_or(RESET_FAILED));
            }
            Err(err) => {
                error!("Reset password error: {}", err);
                self.form.fail(UNEXPECTED_ERROR);
            }
        }

        Submission::Completed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        forms::{AlertKind, FormState},
        validation::{FIELD_PASSWORD2, PASSWORDS_DONT_MATCH},
    };
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn parse_link() {
        let link = ResetLink::parse("https://app.example.com/reset-password?uid=MQ&token=abc-123");
        assert_eq!(link.uid(), Some("MQ"));
        assert_eq!(link.token(), Some("abc-123"));
        assert!(link.is_complete());

        let link = ResetLink::parse("/reset-password?token=t%2B1&uid=Mg");
        assert_eq!(link.uid(), Some("Mg"));
        assert_eq!(link.token(), Some("t+1"));

        let link = ResetLink::parse("/reset-password?uid=MQ&token=");
        assert_eq!(link.token(), None);
        assert!(!link.is_complete());

        assert_eq!(ResetLink::parse("/reset-password"), ResetLink::default());
    }

    #[tokio::test]
    async fn success_redirects_after_delay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reset-password"))
            .and(body_json(json!({
                "uid": "MQ",
                "token": "tok",
                "password": "password1",
                "password2": "password1",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Password reset successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut reset = ResetPasswordForm::new(
            AuthClient::new(&server.uri()).unwrap(),
            ResetLink::parse("/reset-password?uid=MQ&token=tok"),
        );

        let submission = reset.submit(secret("password1"), secret("password1")).await;
        assert_eq!(submission, Submission::Completed);
        assert_eq!(reset.form().state(), FormState::Success);
        assert_eq!(
            reset.form().alert().map(|a| a.message.as_str()),
            Some(PASSWORD_RESET)
        );
        assert_eq!(
            reset.form().navigation(),
            Some(&Navigation::after(LOGIN_PATH, REDIRECT_DELAY))
        );
    }

    #[tokio::test]
    async fn incomplete_link_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut reset = ResetPasswordForm::new(
            AuthClient::new(&server.uri()).unwrap(),
            ResetLink::parse("/reset-password?uid=MQ"),
        );

        reset.submit(secret("password1"), secret("password1")).await;
        let alert = reset.form().alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.message, INVALID_RESET_LINK);
    }

    #[tokio::test]
    async fn passwords_are_checked_before_the_link() {
        let server = MockServer::start().await;
        let mut reset =
            ResetPasswordForm::new(AuthClient::new(&server.uri()).unwrap(), ResetLink::default());

        let submission = reset.submit(secret("password1"), secret("password2")).await;
        assert_eq!(submission, Submission::Invalid);
        assert_eq!(
            reset.form().errors().first(FIELD_PASSWORD2),
            Some(PASSWORDS_DONT_MATCH)
        );
        assert!(reset.form().alert().is_none());
    }

    #[tokio::test]
    async fn rejection_shows_message_or_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reset-password"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"message": "Invalid or expired token"})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/reset-password"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let mut reset = ResetPasswordForm::new(
            AuthClient::new(&server.uri()).unwrap(),
            ResetLink::new(Some("MQ".to_string()), Some("tok".to_string())),
        );

        reset.submit(secret("password1"), secret("password1")).await;
        assert_eq!(
            reset.form().alert().map(|a| a.message.as_str()),
            Some("Invalid or expired token")
        );

        reset.submit(secret("password1"), secret("password1")).await;
        assert_eq!(
            reset.form().alert().map(|a| a.message.as_str()),
            Some(RESET_FAILED)
        );
    }
}
