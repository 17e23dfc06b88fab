//! Local form validation.
//!
//! Every check here is synchronous and side-effect free. A validator returns
//! either the normalized value or a non-empty [`FormErrors`], never both, and
//! must run to completion before any request is issued.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";
pub const PASSWORDS_DONT_MATCH: &str = "Passwords don't match";

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_PASSWORD2: &str = "password2";
pub const FIELD_CONFIRM_PASSWORD: &str = "confirm_password";

/// Field name to ordered error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for `field`, empty when the field is valid.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.field(field).first().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validated login input.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Validated signup input; `password2` carries the confirmation field.
#[derive(Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: SecretString,
    pub password2: SecretString,
}

/// Validated new password pair for a reset.
#[derive(Debug)]
pub struct NewPassword {
    pub password: SecretString,
    pub password2: SecretString,
}

static EMAIL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

#[must_use]
pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

fn check_email(errors: &mut FormErrors, email: &str) {
    if !valid_email(email) {
        errors.add(FIELD_EMAIL, INVALID_EMAIL);
    }
}

fn check_password(errors: &mut FormErrors, field: &str, password: &SecretString) {
    if !valid_password(password.expose_secret()) {
        errors.add(field, PASSWORD_TOO_SHORT);
    }
}

fn check_confirmation(
    errors: &mut FormErrors,
    field: &str,
    password: &SecretString,
    confirmation: &SecretString,
) {
    if password.expose_secret() != confirmation.expose_secret() {
        errors.add(field, PASSWORDS_DONT_MATCH);
    }
}

/// # Errors
/// Returns the field errors when the email or password is invalid.
pub fn validate_login(email: &str, password: SecretString) -> Result<Credentials, FormErrors> {
    let mut errors = FormErrors::new();
    check_email(&mut errors, email);
    check_password(&mut errors, FIELD_PASSWORD, &password);

    errors.finish(|| Credentials {
        email: email.to_string(),
        password,
    })
}

/// # Errors
/// Returns the field errors when any field is invalid; a mismatch is reported
/// on `confirm_password` only.
pub fn validate_signup(
    email: &str,
    password: SecretString,
    confirm_password: SecretString,
) -> Result<SignupRequest, FormErrors> {
    let mut errors = FormErrors::new();
    check_email(&mut errors, email);
    check_password(&mut errors, FIELD_PASSWORD, &password);
    check_confirmation(
        &mut errors,
        FIELD_CONFIRM_PASSWORD,
        &password,
        &confirm_password,
    );

    errors.finish(|| SignupRequest {
        email: email.to_string(),
        password,
        password2: confirm_password,
    })
}

/// # Errors
/// Returns the field errors when the email is invalid.
pub fn validate_forgot_password(email: &str) -> Result<String, FormErrors> {
    let mut errors = FormErrors::new();
    check_email(&mut errors, email);

    errors.finish(|| email.to_string())
}

/// # Errors
/// Returns the field errors when the password is too short or the
/// confirmation differs; a mismatch is reported on `password2` only.
pub fn validate_reset_password(
    password: SecretString,
    password2: SecretString,
) -> Result<NewPassword, FormErrors> {
    let mut errors = FormErrors::new();
    check_password(&mut errors, FIELD_PASSWORD, &password);
    check_confirmation(&mut errors, FIELD_PASSWORD2, &password, &password2);

    errors.finish(|| NewPassword {
        password,
        password2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_valid_email() {
        assert!(EMAIL.is_some());
        assert!(valid_email("alice@example.com"));
        assert!(valid_email("first.last+tag@sub.example.org"));

        for email in [
            "",
            "alice",
            "alice@",
            "@example.com",
            "alice@example",
            "alice @example.com",
            "alice@@example.com",
        ] {
            assert!(!valid_email(email), "{email:?} should be rejected");
        }
    }

    #[test]
    fn test_password_length_boundary() {
        assert!(!valid_password("1234567"));
        assert!(valid_password("12345678"));
        // counted in characters, not bytes
        assert!(!valid_password("ñññññññ"));
        assert!(valid_password("ññññññññ"));
    }

    #[test]
    fn login_rejects_bad_email_and_short_password() {
        let Err(errors) = validate_login("nope", secret("short")) else {
            panic!("expected errors");
        };
        assert_eq!(errors.field(FIELD_EMAIL), [INVALID_EMAIL]);
        assert_eq!(errors.field(FIELD_PASSWORD), [PASSWORD_TOO_SHORT]);
    }

    #[test]
    fn login_accepts_valid_credentials() {
        let credentials = validate_login("alice@example.com", secret("correct horse"))
            .expect("valid credentials");
        assert_eq!(credentials.email, "alice@example.com");
        assert_eq!(credentials.password.expose_secret(), "correct horse");
    }

    #[test]
    fn reset_mismatch_flags_confirmation_only() {
        let Err(errors) = validate_reset_password(secret("password1"), secret("password2"))
        else {
            panic!("expected errors");
        };
        assert!(!errors.contains(FIELD_PASSWORD));
        assert_eq!(errors.field(FIELD_PASSWORD2), [PASSWORDS_DONT_MATCH]);
    }

    #[test]
    fn reset_short_and_mismatched_reports_both() {
        let Err(errors) = validate_reset_password(secret("short"), secret("shorts")) else {
            panic!("expected errors");
        };
        assert_eq!(errors.first(FIELD_PASSWORD), Some(PASSWORD_TOO_SHORT));
        assert_eq!(errors.first(FIELD_PASSWORD2), Some(PASSWORDS_DONT_MATCH));
    }

    #[test]
    fn signup_carries_confirmation_as_password2() {
        let request = validate_signup(
            "alice@example.com",
            secret("s3cret-pass"),
            secret("s3cret-pass"),
        )
        .expect("valid signup");
        assert_eq!(request.password2.expose_secret(), "s3cret-pass");

        let Err(errors) = validate_signup(
            "alice@example.com",
            secret("s3cret-pass"),
            secret("s3cret-pasS"),
        ) else {
            panic!("expected errors");
        };
        assert_eq!(errors.field(FIELD_CONFIRM_PASSWORD), [PASSWORDS_DONT_MATCH]);
        assert!(!errors.contains(FIELD_PASSWORD));
    }

    #[test]
    fn forgot_password_checks_email() {
        assert_eq!(
            validate_forgot_password("alice@example.com").ok().as_deref(),
            Some("alice@example.com")
        );
        assert!(validate_forgot_password("alice.example.com").is_err());
    }

    #[test]
    fn form_errors_display() {
        let mut errors = FormErrors::new();
        errors.add(FIELD_PASSWORD, PASSWORD_TOO_SHORT);
        errors.add(FIELD_EMAIL, INVALID_EMAIL);
        assert_eq!(
            errors.to_string(),
            "email: Invalid email address; password: Password must be at least 8 characters long"
        );
        errors.clear();
        assert!(errors.is_empty());
    }
}
