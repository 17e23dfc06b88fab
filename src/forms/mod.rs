//! Form controllers for the authentication flows.
//!
//! Every flow runs through the same [`FormController`] state machine:
//!
//! ```text
//! Idle --begin--> Submitting --succeed--> Success
//!                            \--fail----> Error
//! Success | Error --edit--> Idle
//! ```
//!
//! Validation runs before any request; a form that fails it stays `Idle` with
//! its field errors filled in. Alerts and navigations are data: the caller
//! renders the alert and performs the navigation.

pub mod dashboard;
pub mod forgot_password;
pub mod login;
pub mod reset_password;
pub mod signup;

pub use self::dashboard::{Dashboard, DashboardLoad};
pub use self::forgot_password::ForgotPasswordForm;
pub use self::login::LoginForm;
pub use self::reset_password::{ResetLink, ResetPasswordForm};
pub use self::signup::SignupForm;

use crate::validation::FormErrors;
use std::time::Duration;

/// Alert shown when the gateway cannot be reached or replies with garbage.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// Banner message; never carries secrets or tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// A navigation scheduled by a controller, performed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: String,
    pub after: Duration,
}

impl Navigation {
    #[must_use]
    pub fn now(to: &str) -> Self {
        Self::after(to, Duration::ZERO)
    }

    #[must_use]
    pub fn after(to: &str, after: Duration) -> Self {
        Self {
            to: to.to_string(),
            after,
        }
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A submission is already in flight; nothing was done.
    Ignored,
    /// Local validation failed, no request was made.
    Invalid,
    /// The request settled; see the form state and alert.
    Completed,
}

#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
    errors: FormErrors,
    alert: Option<Alert>,
    navigation: Option<Navigation>,
}

impl FormController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> FormState {
        self.state
    }

    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    #[must_use]
    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state == FormState::Submitting
    }

    /// Start a submission: clear the previous outcome and run `validate`.
    ///
    /// # Errors
    /// Returns `Submission::Ignored` while another submission is in flight and
    /// `Submission::Invalid` when `validate` fails; the form is then `Idle`
    /// with its field errors set.
    pub fn begin<T>(
        &mut self,
        validate: impl FnOnce() -> Result<T, FormErrors>,
    ) -> Result<T, Submission> {
        if self.is_submitting() {
            return Err(Submission::Ignored);
        }

        self.errors.clear();
        self.alert = None;
        self.navigation = None;

        match validate() {
            Ok(value) => {
                self.state = FormState::Submitting;
                Ok(value)
            }
            Err(errors) => {
                self.errors = errors;
                self.state = FormState::Idle;
                Err(Submission::Invalid)
            }
        }
    }

    pub fn succeed(&mut self, message: impl Into<String>, navigation: Option<Navigation>) {
        self.state = FormState::Success;
        self.alert = Some(Alert {
            kind: AlertKind::Success,
            message: message.into(),
        });
        self.navigation = navigation;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = FormState::Error;
        self.alert = Some(Alert {
            kind: AlertKind::Error,
            message: message.into(),
        });
        self.navigation = None;
    }

    /// The user touched an input after a settled submission.
    pub fn edit(&mut self) {
        if matches!(self.state, FormState::Success | FormState::Error) {
            self.state = FormState::Idle;
        }
    }

    /// Drop an in-flight submission whose request will never settle.
    pub fn abandon(&mut self) {
        if self.is_submitting() {
            self.state = FormState::Idle;
        }
    }
}
