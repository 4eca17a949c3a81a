use anyhow::Result;
use reqwest::Client;

use crate::enrich::{EnrichedCompanyRecord, Enricher};
use crate::telemetry;
use crate::telemetry::ops::scrape::Phase as ScrapePhase;

use super::extract::extract_html;
use super::fetch::fetch_page;
use super::record::{build_all, CompanyRecord};
use super::target::ScrapeTarget;
use super::types::{ResultSet, TargetSummary};

pub struct RunOutput {
    pub results: ResultSet,
    pub per_target: Vec<TargetSummary>,
}

/// Fetch, extract, build and enrich every target, strictly in sequence.
pub struct Pipeline<'a> {
    http: &'a Client,
    enricher: &'a Enricher<'a>,
    /// Abort the whole run on the first failed page fetch.
    fail_fast: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(http: &'a Client, enricher: &'a Enricher<'a>, fail_fast: bool) -> Self {
        Pipeline { http, enricher, fail_fast }
    }

    pub async fn run(&self, targets: &[ScrapeTarget]) -> Result<RunOutput> {
        let log = telemetry::scrape();
        let mut results = ResultSet::default();
        let mut per_target = Vec::with_capacity(targets.len());

        for target in targets {
            let _t = log.span_kv(&ScrapePhase::Target, [("source", target.source_name.clone()), ("url", target.source_url.clone())]).entered();
            let (records, summary) = self.run_target(target).await?;
            log.target_summary(&summary);
            results.extend(records);
            per_target.push(summary);
        }

        Ok(RunOutput { results, per_target })
    }

    async fn run_target(&self, target: &ScrapeTarget) -> Result<(Vec<EnrichedCompanyRecord>, TargetSummary)> {
        let log = telemetry::scrape();
        let mut summary = TargetSummary { source_name: target.source_name.clone(), ..Default::default() };

        let html = {
            let _s = log.span(&ScrapePhase::FetchPage).entered();
            match fetch_page(self.http, &target.source_url).await {
                Ok(html) => html,
                Err(e) if !self.fail_fast => {
                    log.error_kv("❌ fetch failed", [("source", target.source_name.clone()), ("error", format!("{e:#}"))]);
                    summary.fetch_error = Some(format!("{e:#}"));
                    return Ok((Vec::new(), summary));
                }
                Err(e) => return Err(e.context(format!("target {}", target.source_name))),
            }
        };

        let records = {
            let _s = log.span(&ScrapePhase::Extract).entered();
            let (containers, records) = records_from_html(&html, target);
            summary.containers = containers;
            summary.dropped = containers - records.len();
            records
        };
        summary.records = records.len();

        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            let _s = log.span_kv(&ScrapePhase::Enrich, [("company", record.company_name.clone())]).entered();
            let out = self.enricher.enrich(record).await;
            if out.enrichment.is_enriched() { summary.enriched += 1; } else { summary.failed += 1; }
            enriched.push(out);
        }

        Ok((enriched, summary))
    }
}

/// Container count plus the records built from named cards.
pub fn records_from_html(html: &str, target: &ScrapeTarget) -> (usize, Vec<CompanyRecord>) {
    let raws = extract_html(html, target);
    let containers = raws.len();
    (containers, build_all(&target.source_name, raws))
}
