use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Unable to reach the server: {0}")]
    Network(String),
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Failed to decode response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}
