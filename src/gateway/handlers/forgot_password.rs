use super::{backend_detail, message, Message, MISSING_PAYLOAD};
use crate::gateway::{Backend, ProxyError};
use axum::{extract::Extension, http::StatusCode, response::Response, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const RESET_EMAIL_SENT: &str = "Password reset email sent";
pub const RESET_EMAIL_FAILED: &str = "Failed to send reset email";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPassword {
    email: String,
}

#[utoipa::path(
    post,
    path= "/forgot-password",
    request_body = ForgotPassword,
    responses (
        (status = 200, description = "Reset email sent", body = Message),
        (status = 400, description = "Missing payload or rejected by the backend", body = Message),
        (status = 500, description = "Backend unreachable or misconfigured", body = Message),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn forgot_password(
    backend: Extension<Arc<Backend>>,
    payload: Option<Json<ForgotPassword>>,
) -> Result<Response, ProxyError> {
    let Some(Json(request)) = payload else {
        return Ok(message(StatusCode::BAD_REQUEST, MISSING_PAYLOAD));
    };

    let url = backend.endpoint("/api/forgot-password/")?;
    let response = backend
        .post_json(url, &json!({ "email": request.email }))
        .await?;

    if response.status().is_success() {
        return Ok(message(StatusCode::OK, RESET_EMAIL_SENT));
    }

    debug!("backend rejected forgot-password: {}", response.status());

    let detail = backend_detail(response).await;

    Ok(message(
        StatusCode::BAD_REQUEST,
        detail.unwrap_or_else(|| RESET_EMAIL_FAILED.to_string()),
    ))
}
