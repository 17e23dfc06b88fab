use super::{backend_detail, message, relay_json, Message, MISSING_PAYLOAD};
use crate::gateway::{Backend, ProxyError, RememberMe};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::{fmt, sync::Arc};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(ToSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    email: String,
    password: String,
    #[serde(default)]
    remember_me: bool,
}

impl fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful, backend body with access/refresh tokens relayed", content_type = "application/json"),
        (status = 400, description = "Missing payload", body = Message),
        (status = 401, description = "Rejected by the backend", body = Message),
        (status = 500, description = "Backend unreachable or misconfigured", body = Message),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    backend: Extension<Arc<Backend>>,
    remember: Extension<RememberMe>,
    payload: Option<Json<UserLogin>>,
) -> Result<Response, ProxyError> {
    let Some(Json(user)) = payload else {
        return Ok(message(StatusCode::BAD_REQUEST, MISSING_PAYLOAD));
    };

    debug!("user: {:?}", user);

    let url = backend.endpoint("/api/login/")?;
    let response = backend
        .post_json(
            url,
            &json!({
                "email": user.email,
                "password": user.password,
            }),
        )
        .await?;

    if !response.status().is_success() {
        debug!("backend rejected login: {}", response.status());

        let detail = backend_detail(response).await;

        return Ok(message(
            StatusCode::UNAUTHORIZED,
            detail.unwrap_or_else(|| INVALID_CREDENTIALS.to_string()),
        ));
    }

    let data = relay_json(response).await?;

    let mut headers = HeaderMap::new();
    if user.remember_me {
        match remember.cookie() {
            Ok(cookie) => {
                headers.insert(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build rememberMe cookie: {}", err),
        }
    }

    Ok((StatusCode::OK, headers, Json(data)).into_response())
}
