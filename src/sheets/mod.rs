use anyhow::Result;
use clap::Args;
use reqwest::Client;
use serde::Serialize;
use sqlx::PgPool;

use crate::config::SheetsConfig;
use crate::store;
use crate::table::Table;
use crate::telemetry::{self};
use crate::telemetry::ops::export::Phase as ExportPhase;

pub mod client;

use self::client::SheetsClient;

/// Copy a stored result table into a spreadsheet worksheet.
#[derive(Args)]
pub struct ExportCmd {
    /// Table previously written by `scrape --apply`
    #[arg(long)] pub table: String,
    /// Spreadsheet id (from the sheet URL)
    #[arg(long)] pub spreadsheet: String,
    #[arg(long)] pub worksheet: String,
}

#[derive(Serialize)]
struct ExportResult<'a> { table: &'a str, spreadsheet: &'a str, worksheet: &'a str, rows: usize }

pub async fn run(pool: &PgPool, args: ExportCmd) -> Result<()> {
    let log = telemetry::export();
    let _g = log.root_span_kv([
        ("table", args.table.clone()),
        ("spreadsheet", args.spreadsheet.clone()),
        ("worksheet", args.worksheet.clone()),
    ]).entered();

    let cfg = SheetsConfig::from_env()?;
    let data = {
        let _s = log.span(&ExportPhase::ReadTable).entered();
        store::read_table(pool, &args.table).await?
    };

    let http = Client::new();
    let rows = replace_worksheet(&SheetsClient::new(&http, &cfg), &args.spreadsheet, &args.worksheet, &data).await?;
    log.info_kv("📤 worksheet replaced", [("worksheet", args.worksheet.clone()), ("rows", rows.to_string())]);

    if telemetry::config::json_mode() {
        log.result(&ExportResult { table: &args.table, spreadsheet: &args.spreadsheet, worksheet: &args.worksheet, rows })?;
    }
    Ok(())
}

/// Clear the worksheet, then write header plus rows; returns the data row count.
pub async fn replace_worksheet(client: &SheetsClient<'_>, spreadsheet: &str, worksheet: &str, data: &Table) -> Result<usize> {
    let log = telemetry::export();
    {
        let _s = log.span(&ExportPhase::ClearSheet).entered();
        client.clear(spreadsheet, worksheet).await?;
    }
    let _s = log.span(&ExportPhase::WriteSheet).entered();
    client.write(spreadsheet, worksheet, &data.values()).await?;
    Ok(data.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn writes_header_and_blank_cells() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets/s1/values/Portfolio:clear"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/spreadsheets/s1/values/Portfolio!A1"))
            .and(body_json(serde_json::json!({"values": [["firm", "url"], ["space-capital", ""]]})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let http = Client::new();
        let cfg = SheetsConfig { token: "t".into(), base_url: server.uri() };
        let data = Table {
            header: vec!["firm".into(), "url".into()],
            rows: vec![vec![Some("space-capital".into()), None]],
        };
        let rows = replace_worksheet(&SheetsClient::new(&http, &cfg), "s1", "Portfolio", &data).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn failed_clear_skips_write() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let http = Client::new();
        let cfg = SheetsConfig { token: "t".into(), base_url: server.uri() };
        let res = replace_worksheet(&SheetsClient::new(&http, &cfg), "s1", "Portfolio", &Table::default()).await;
        assert!(res.is_err());
    }
}
