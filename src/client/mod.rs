//! HTTP client for the gateway routes.
//!
//! The form controllers reach the gateway through this client only. It
//! centralizes URL building, the request timeout and response decoding, and
//! never logs passwords or tokens.

mod errors;

pub use self::errors::ClientError;

use crate::{
    gateway::routes,
    validation::{Credentials, NewPassword, SignupRequest},
    APP_USER_AGENT,
};
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and decoded JSON body of a gateway reply.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `message` field of the body, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: Url,
}

impl AuthClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim())?;
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(ClientError::Client)?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }

    /// # Errors
    /// Returns an error on transport failures or an undecodable success body.
    #[instrument(skip_all)]
    pub async fn signup(&self, request: &SignupRequest) -> Result<ApiResponse, ClientError> {
        let body = json!({
            "email": request.email,
            "password": request.password.expose_secret(),
            "password2": request.password2.expose_secret(),
        });
        self.send(self.http.post(self.url(routes::SIGNUP)?).json(&body))
            .await
    }

    /// # Errors
    /// Returns an error on transport failures or an undecodable success body.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        credentials: &Credentials,
        remember_me: bool,
    ) -> Result<ApiResponse, ClientError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
            "rememberMe": remember_me,
        });
        self.send(self.http.post(self.url(routes::LOGIN)?).json(&body))
            .await
    }

    /// # Errors
    /// Returns an error on transport failures or an undecodable success body.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<ApiResponse, ClientError> {
        let body = json!({ "email": email });
        self.send(
            self.http
                .post(self.url(routes::FORGOT_PASSWORD)?)
                .json(&body),
        )
        .await
    }

    /// # Errors
    /// Returns an error on transport failures or an undecodable success body.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        uid: &str,
        token: &str,
        password: &NewPassword,
    ) -> Result<ApiResponse, ClientError> {
        let body = json!({
            "uid": uid,
            "token": token,
            "password": password.password.expose_secret(),
            "password2": password.password2.expose_secret(),
        });
        self.send(
            self.http
                .post(self.url(routes::RESET_PASSWORD)?)
                .json(&body),
        )
        .await
    }

    /// # Errors
    /// Returns an error on transport failures or an undecodable success body.
    #[instrument(skip_all)]
    pub async fn fetch_user(&self, access_token: &SecretString) -> Result<ApiResponse, ClientError> {
        self.send(
            self.http.get(self.url(routes::USER)?).header(
                AUTHORIZATION,
                format!("Bearer {}", access_token.expose_secret()),
            ),
        )
        .await
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!("gateway replied {}", status);

        let body = if text.trim().is_empty() {
            Value::Null
        } else if status.is_success() {
            serde_json::from_str(&text).map_err(|err| ClientError::Parse(err.to_string()))?
        } else {
            // error bodies are best effort
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(ApiResponse { status, body })
    }
}
