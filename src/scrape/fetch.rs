use anyhow::{Context, Result};
use reqwest::Client;

/// Single GET; non-2xx is an error.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let text = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("fetching {url}"))?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}
