//! Input acquisition: the exported batch comes from a local file or an
//! HTTP(S) URL.

pub mod auth;
mod client;

pub use client::{BasicClient, HttpClient};

use anyhow::{Context, Result};
use tracing::debug;

use self::auth::ApiKey;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the whole batch into memory. URLs are fetched over HTTP, with
/// `token` sent as a bearer credential when present.
///
/// # Errors
///
/// Fails if the file is missing or unreadable, or the request fails or
/// returns a non-success status.
#[tracing::instrument(skip(token))]
pub async fn load_input(source: &str, token: Option<&str>) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        let client = BasicClient::new()?;
        let fetched = match token {
            Some(token) => fetch_bytes(&ApiKey::bearer(client, token)?, source).await,
            None => fetch_bytes(&client, source).await,
        };
        fetched.with_context(|| format!("failed to fetch input from {source}"))?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read input file {source}"))?
    };

    debug!(bytes = bytes.len(), "Input loaded");
    Ok(bytes)
}
