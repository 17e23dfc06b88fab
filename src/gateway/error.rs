use super::handlers::{message, SERVER_CONFIGURATION_ERROR, UNEXPECTED_ERROR};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures between the gateway and the backend. None of them reach the
/// caller as-is: they are logged and collapsed into a `500`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("backend URL is not set")]
    MissingBackendUrl,
    #[error("invalid backend URL: {0}")]
    InvalidBackendUrl(String),
    #[error("backend request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("malformed backend response: {0}")]
    MalformedResponse(#[source] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("{}", self);

        let text = match self {
            Self::MissingBackendUrl | Self::InvalidBackendUrl(_) => SERVER_CONFIGURATION_ERROR,
            Self::Transport(_) | Self::MalformedResponse(_) => UNEXPECTED_ERROR,
        };

        message(StatusCode::INTERNAL_SERVER_ERROR, text)
    }
}
