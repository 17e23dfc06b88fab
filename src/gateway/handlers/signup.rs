use super::{message, relay_json, relay_raw, MISSING_PAYLOAD};
use crate::gateway::{Backend, ProxyError};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path= "/signup",
    responses (
        (status = 200, description = "Account created, backend body relayed", content_type = "application/json"),
        (status = 400, description = "Missing payload or rejected by the backend, backend body relayed"),
        (status = 500, description = "Backend unreachable or misconfigured", body = super::Message),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn signup(
    backend: Extension<Arc<Backend>>,
    payload: Option<Json<Value>>,
) -> Result<Response, ProxyError> {
    let Some(Json(body)) = payload else {
        return Ok(message(StatusCode::BAD_REQUEST, MISSING_PAYLOAD));
    };

    let url = backend.endpoint("/api/signup/")?;
    let response = backend.post_json(url, &body).await?;
    let status = response.status();

    if status.is_success() {
        let data = relay_json(response).await?;
        Ok((StatusCode::OK, Json(data)).into_response())
    } else {
        debug!("backend rejected signup: {}", status);

        relay_raw(status, response).await
    }
}
