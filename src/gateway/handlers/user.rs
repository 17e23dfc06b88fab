use super::{backend_detail, extract_bearer_token, message, relay_json, Message, UNAUTHORIZED};
use crate::gateway::{Backend, ProxyError};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const USER_FETCH_FAILED: &str = "Failed to fetch user data";

#[utoipa::path(
    get,
    path= "/user",
    responses (
        (status = 200, description = "Current user, backend body relayed", content_type = "application/json"),
        (status = 401, description = "Missing bearer token or rejected by the backend", body = Message),
        (status = 500, description = "Backend unreachable or misconfigured", body = Message),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn user(
    backend: Extension<Arc<Backend>>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Ok(message(StatusCode::UNAUTHORIZED, UNAUTHORIZED));
    };

    let url = backend.endpoint("/api/user/")?;
    let response = backend.get_with_bearer(url, &token).await?;

    let status = response.status();
    if status.is_success() {
        let data = relay_json(response).await?;
        return Ok((StatusCode::OK, Json(data)).into_response());
    }

    debug!("backend rejected user fetch: {}", status);

    let detail = backend_detail(response).await;

    Ok(message(
        status,
        detail.unwrap_or_else(|| USER_FETCH_FAILED.to_string()),
    ))
}
