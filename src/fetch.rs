//! The fetch module downloads recipe pages.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use crate::constants::USER_AGENT;

/// Downloads a recipe page and returns its HTML.
///
/// The whole request, body included, must finish within `timeout`.
///
/// # Errors
///
/// Returns an error if the request fails, times out, or the server answers
/// with a non-success status.
pub async fn fetch_document(url: &Url, timeout: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Unsuccessful response from {url}"))?;

    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?;
    debug!("Fetched {} bytes from {url}", html.len());

    Ok(html)
}
