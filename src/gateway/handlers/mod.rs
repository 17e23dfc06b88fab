pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod login;
pub use self::login::login;

pub mod forgot_password;
pub use self::forgot_password::forgot_password;

pub mod reset_password;
pub use self::reset_password::reset_password;

pub mod user;
pub use self::user::user;

// common functions for the handlers
use super::ProxyError;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Response as BackendResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";
pub const SERVER_CONFIGURATION_ERROR: &str = "Server configuration error";
pub const MISSING_PAYLOAD: &str = "Missing payload";
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Uniform `{"message": ...}` reply.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Message {
    pub message: String,
}

pub fn message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(Message {
            message: message.into(),
        }),
    )
        .into_response()
}

/// The `detail` string of a backend error body; empty or non-JSON bodies have none.
pub async fn backend_detail(response: BackendResponse) -> Option<String> {
    let text = response.text().await.ok()?;
    let body: Value = serde_json::from_str(&text).ok()?;

    body.get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(ToString::to_string)
}

/// Decode a backend body that is relayed to the caller.
///
/// # Errors
/// Returns `MalformedResponse` if the body is not JSON.
pub async fn relay_json(response: BackendResponse) -> Result<Value, ProxyError> {
    response
        .json::<Value>()
        .await
        .map_err(ProxyError::MalformedResponse)
}

/// Pass a backend error reply through unchanged: same status, same bytes,
/// same content type. The body does not have to be JSON.
///
/// # Errors
/// Returns `Transport` if the body cannot be read.
pub async fn relay_raw(
    status: StatusCode,
    response: BackendResponse,
) -> Result<Response, ProxyError> {
    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let bytes = response.bytes().await.map_err(ProxyError::Transport)?;

    let mut relayed = (status, bytes).into_response();
    match content_type {
        Some(value) => {
            relayed.headers_mut().insert(CONTENT_TYPE, value);
        }
        None => {
            relayed.headers_mut().remove(CONTENT_TYPE);
        }
    }

    Ok(relayed)
}

/// Token of an `Authorization: Bearer ...` header; the scheme is case-insensitive.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
