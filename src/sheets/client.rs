use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::config::SheetsConfig;

#[derive(Serialize)]
struct ValueRange<'a> {
    values: &'a [Vec<String>],
}

/// Minimal Google Sheets values API client.
pub struct SheetsClient<'a> {
    http: &'a Client,
    cfg: &'a SheetsConfig,
}

impl<'a> SheetsClient<'a> {
    pub fn new(http: &'a Client, cfg: &'a SheetsConfig) -> Self {
        SheetsClient { http, cfg }
    }

    /// `<base>/spreadsheets/<id>/values/<range>`, each segment percent-encoded.
    fn values_url(&self, spreadsheet: &str, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.cfg.base_url)
            .with_context(|| format!("invalid sheets base url {}", self.cfg.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets base url cannot be a base: {}", self.cfg.base_url))?
            .pop_if_empty()
            .extend(["spreadsheets", spreadsheet, "values", range]);
        Ok(url)
    }

    pub async fn clear(&self, spreadsheet: &str, worksheet: &str) -> Result<()> {
        let url = self.values_url(spreadsheet, &format!("{worksheet}:clear"))?;
        let resp = self.http.post(url).bearer_auth(&self.cfg.token).json(&serde_json::json!({})).send().await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("clearing worksheet {} failed: {} {}", worksheet, status, resp.text().await.unwrap_or_default());
        }
        Ok(())
    }

    pub async fn write(&self, spreadsheet: &str, worksheet: &str, values: &[Vec<String>]) -> Result<()> {
        let mut url = self.values_url(spreadsheet, &format!("{worksheet}!A1"))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let resp = self.http.put(url).bearer_auth(&self.cfg.token).json(&ValueRange { values }).send().await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("writing worksheet {} failed: {} {}", worksheet, status, resp.text().await.unwrap_or_default());
        }
        Ok(())
    }
}
