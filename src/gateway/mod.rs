#![allow(clippy::needless_for_each)]

//! Route proxy between the form flows and the authentication backend.

pub mod backend;
mod error;
pub mod handlers;

pub use self::backend::Backend;
pub use self::error::ProxyError;

#[allow(unused_imports)]
use self::handlers::{
    forgot_password, forgot_password::__path_forgot_password, health, health::__path_health,
    login, login::__path_login, reset_password, reset_password::__path_reset_password, signup,
    signup::__path_signup, user, user::__path_user,
};
use anyhow::Result;
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;

/// Local paths served by the gateway.
pub mod routes {
    pub const SIGNUP: &str = "/signup";
    pub const LOGIN: &str = "/login";
    pub const FORGOT_PASSWORD: &str = "/forgot-password";
    pub const RESET_PASSWORD: &str = "/reset-password";
    pub const USER: &str = "/user";
    pub const HEALTH: &str = "/health";
    pub const OPENAPI: &str = "/openapi.json";
}

pub const DEFAULT_REMEMBER_ME_MAX_AGE: u64 = 3600;

/// Lifetime of the `rememberMe` cookie set on a remembered login.
#[derive(Debug, Clone, Copy)]
pub struct RememberMe {
    max_age_seconds: u64,
}

impl RememberMe {
    #[must_use]
    pub const fn new(max_age_seconds: u64) -> Self {
        Self { max_age_seconds }
    }

    #[must_use]
    pub const fn max_age_seconds(&self) -> u64 {
        self.max_age_seconds
    }

    /// # Errors
    /// Returns an error if the cookie is not a valid header value.
    pub fn cookie(&self) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
        HeaderValue::from_str(&format!(
            "rememberMe=true; Path=/; Max-Age={}; SameSite=Lax",
            self.max_age_seconds
        ))
    }
}

impl Default for RememberMe {
    fn default() -> Self {
        Self::new(DEFAULT_REMEMBER_ME_MAX_AGE)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, signup, login, forgot_password, reset_password, user),
    components(
        schemas(
            health::Health,
            handlers::Message,
            login::UserLogin,
            forgot_password::ForgotPassword,
            reset_password::ResetPassword,
        )
    ),
    tags(
        (name = "auth", description = "Authentication proxy"),
        (name = "health", description = "Liveness"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi())
}

/// Build the gateway router.
pub fn router(backend: Arc<Backend>, remember: RememberMe) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any);

    Router::new()
        .route(routes::SIGNUP, post(handlers::signup))
        .route(routes::LOGIN, post(handlers::login))
        .route(routes::FORGOT_PASSWORD, post(handlers::forgot_password))
        .route(routes::RESET_PASSWORD, post(handlers::reset_password))
        .route(routes::USER, get(handlers::user))
        .route(routes::OPENAPI, get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(remember)),
        )
        .route(
            routes::HEALTH,
            get(handlers::health).options(handlers::health),
        )
        .layer(Extension(backend))
}

/// Serve the gateway until Ctrl-C.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn new(port: u16, backend: Backend, remember: RememberMe) -> Result<()> {
    match backend.base_url() {
        Some(url) => info!("Backend: {}", url),
        None => info!("Backend URL not set, proxy routes will answer with a configuration error"),
    }

    let app = router(Arc::new(backend), remember);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method();
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", %method, path, request_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let backend = Backend::new(None, Duration::from_secs(1)).unwrap();
        router(Arc::new(backend), RememberMe::default())
    }

    #[test]
    fn remember_me_cookie() {
        let cookie = RememberMe::new(60).cookie().unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "rememberMe=true; Path=/; Max-Age=60; SameSite=Lax"
        );
        assert_eq!(RememberMe::default().max_age_seconds(), 3600);
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = openapi();
        for route in [
            routes::SIGNUP,
            routes::LOGIN,
            routes::FORGOT_PASSWORD,
            routes::RESET_PASSWORD,
            routes::USER,
            routes::HEALTH,
        ] {
            assert!(doc.paths.paths.contains_key(route), "missing {route}");
        }
    }

    #[tokio::test]
    async fn request_id_is_generated_and_propagated() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(routes::USER)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let request_id = response.headers().get("x-request-id").unwrap();
        assert!(Ulid::from_string(request_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn request_id_is_kept_when_present() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(routes::USER)
                    .header("x-request-id", "abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc");
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(routes::OPENAPI)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/login"].is_object());
    }
}
