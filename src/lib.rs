//! # Authgate (authentication flows and backend proxy)
//!
//! `authgate` fronts an external authentication backend. It has two halves:
//!
//! ## Gateway
//!
//! A thin axum server (`authgate server`) exposing `/signup`, `/login`,
//! `/forgot-password`, `/reset-password` and `/user`. Every handler checks the
//! payload, forwards it to `{backend}/api/...` and reshapes the reply into a
//! uniform `{"message": ...}` error shape. Transport failures never reach the
//! caller as raw errors; they collapse into a `500`.
//!
//! ## Flows
//!
//! Client-side form controllers for signup, login, forgot/reset password and
//! the dashboard. Input is validated locally before any request is made, the
//! gateway is called through [`client::AuthClient`], and login tokens are kept
//! by [`session::SessionManager`] in one of two injected stores:
//!
//! - **persistent scope**: survives restarts (a JSON file for the CLI).
//! - **session scope**: lives as long as the current session (process memory).
//!
//! A refresh token is only ever live in one of the two scopes.

pub mod cli;
pub mod client;
pub mod forms;
pub mod gateway;
pub mod session;
pub mod validation;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
