use super::{backend_detail, message, Message};
use crate::gateway::{Backend, ProxyError};
use axum::{extract::Extension, http::StatusCode, response::Response, Json};
use serde::Deserialize;
use serde_json::json;
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const PASSWORD_RESET: &str = "Password reset successfully";
pub const PASSWORD_RESET_FAILED: &str = "Failed to reset password";

#[derive(ToSchema, Deserialize, Default)]
pub struct ResetPassword {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    password2: Option<String>,
}

impl fmt::Debug for ResetPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPassword")
            .field("uid", &self.uid)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("password2", &self.password2.as_ref().map(|_| "***"))
            .finish()
    }
}

struct ResetFields {
    uid: String,
    token: String,
    password: String,
    password2: String,
}

impl ResetPassword {
    /// All four fields, present and non-empty.
    fn complete(self) -> Option<ResetFields> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());

        Some(ResetFields {
            uid: present(self.uid)?,
            token: present(self.token)?,
            password: present(self.password)?,
            password2: present(self.password2)?,
        })
    }
}

#[utoipa::path(
    post,
    path= "/reset-password",
    request_body = ResetPassword,
    responses (
        (status = 200, description = "Password reset", body = Message),
        (status = 400, description = "Missing required fields", body = Message),
        (status = 500, description = "Backend unreachable or misconfigured", body = Message),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    backend: Extension<Arc<Backend>>,
    payload: Option<Json<ResetPassword>>,
) -> Result<Response, ProxyError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    debug!("reset request: {:?}", request);

    let Some(fields) = request.complete() else {
        return Ok(message(StatusCode::BAD_REQUEST, MISSING_FIELDS));
    };

    let url = backend
        .endpoint_with_segments("/api/reset-password/", &[&fields.uid, &fields.token])?;

    let response = backend
        .post_json(
            url,
            &json!({
                "password": fields.password,
                "password2": fields.password2,
            }),
        )
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(message(StatusCode::OK, PASSWORD_RESET));
    }

    debug!("backend rejected reset-password: {}", status);

    let detail = backend_detail(response).await;

    Ok(message(
        status,
        detail.unwrap_or_else(|| PASSWORD_RESET_FAILED.to_string()),
    ))
}
