//! # Catalog Client
//!
//! Reads the wallpaper catalog over HTTP. The endpoint returns a bare JSON
//! array of wallpaper records, see [`crate::mock_api`] for a local stand-in.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::wallpaper::Wallpaper;

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Creates an HTTP client with appropriate timeout settings.
fn create_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| AppError::Http(format!("Failed to create HTTP client: {e}")))
}

/// Fetches every wallpaper the catalog at `url` lists.
pub async fn fetch_catalog(url: &str) -> Result<Vec<Wallpaper>> {
    let client = create_client()?;
    tracing::debug!("fetching catalog from {url}");

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(AppError::Http(format!("Catalog returned status: {}", response.status())));
    }

    let wallpapers: Vec<Wallpaper> = response.json().await?;
    tracing::info!("catalog listed {} wallpapers", wallpapers.len());
    Ok(wallpapers)
}
