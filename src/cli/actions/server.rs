use crate::gateway::{self, backend::parse_base_url, Backend, RememberMe};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend_url: Option<String>,
    pub backend_timeout_seconds: u64,
    pub remember_me_max_age: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the backend URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let backend_url = args
        .backend_url
        .as_deref()
        .map(parse_base_url)
        .transpose()
        .context("invalid AUTHGATE_BACKEND_URL")?;

    info!(
        "{} {} - {}, backend timeout: {}s, rememberMe max-age: {}s",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH),
        args.backend_timeout_seconds,
        args.remember_me_max_age
    );

    let backend = Backend::new(
        backend_url,
        Duration::from_secs(args.backend_timeout_seconds),
    )?;

    gateway::new(
        args.port,
        backend,
        RememberMe::new(args.remember_me_max_age),
    )
    .await
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
