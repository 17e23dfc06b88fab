use super::ProxyError;
use crate::APP_USER_AGENT;
use anyhow::{anyhow, Result};
use reqwest::{header::AUTHORIZATION, Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Parse and check a backend base address.
///
/// # Errors
/// Returns an error if the URL is invalid, has no host or is not HTTP(S).
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "http" | "https" => (),
        scheme => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
    }

    if url.host().is_none() {
        return Err(anyhow!("Error parsing URL: no host specified"));
    }

    Ok(url)
}

/// The external authentication API behind the gateway.
#[derive(Debug, Clone)]
pub struct Backend {
    http: Client,
    base_url: Option<Url>,
}

impl Backend {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Option<Url>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// `{base}{path}`, keeping any path prefix of the base.
    ///
    /// # Errors
    /// Returns an error if no base URL is configured.
    pub fn endpoint(&self, path: &str) -> Result<Url, ProxyError> {
        let base = self.base_url.as_ref().ok_or(ProxyError::MissingBackendUrl)?;
        let endpoint = format!("{}{}", base.as_str().trim_end_matches('/'), path);

        debug!("endpoint URL: {}", endpoint);

        Url::parse(&endpoint).map_err(|e| ProxyError::InvalidBackendUrl(e.to_string()))
    }

    /// `{base}{path}{segment}/...`, each segment percent-encoded and the
    /// result ending in a slash.
    ///
    /// # Errors
    /// Returns an error if no base URL is configured or it cannot take path segments.
    pub fn endpoint_with_segments(&self, path: &str, segments: &[&str]) -> Result<Url, ProxyError> {
        let mut url = self.endpoint(path)?;

        url.path_segments_mut()
            .map_err(|()| ProxyError::InvalidBackendUrl("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");

        Ok(url)
    }

    /// # Errors
    /// Returns an error if the request cannot be sent or no response arrives.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Response, ProxyError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ProxyError::Transport)?;

        debug!("backend status: {}", response.status());

        Ok(response)
    }

    /// # Errors
    /// Returns an error if the request cannot be sent or no response arrives.
    #[instrument(skip(self, token), fields(url = %url))]
    pub async fn get_with_bearer(&self, url: Url, token: &str) -> Result<Response, ProxyError> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(ProxyError::Transport)?;

        debug!("backend status: {}", response.status());

        Ok(response)
    }
}
