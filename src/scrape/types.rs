use serde::Serialize;

use crate::enrich::EnrichedCompanyRecord;
use crate::table::Table;

use super::selector::FieldSelector;

pub const COLUMNS: [&str; 9] = [
    "firm",
    "company",
    "url",
    "description",
    "external_url",
    "external_description",
    "external_profile_url",
    "enrichment_status",
    "enrichment_error",
];

/// Enriched records of one run: target order, then document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    pub records: Vec<EnrichedCompanyRecord>,
}

impl ResultSet {
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn extend(&mut self, more: Vec<EnrichedCompanyRecord>) { self.records.extend(more); }

    pub fn to_table(&self) -> Table {
        let header = COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = self
            .records
            .iter()
            .map(|r| {
                vec![
                    Some(r.record.source_firm.clone()),
                    Some(r.record.company_name.clone()),
                    r.record.url.clone(),
                    r.record.description.clone(),
                    r.external_url().map(str::to_string),
                    r.external_description().map(str::to_string),
                    r.external_profile_url().map(str::to_string),
                    Some(r.enrichment.status().to_string()),
                    r.enrichment.failure_reason().map(str::to_string),
                ]
            })
            .collect();
        Table { header, rows }
    }
}

// Plan envelope types
#[derive(Serialize)]
pub struct TargetSample {
    pub source_name: String,
    pub source_url: String,
    pub container: FieldSelector,
}

#[derive(Serialize)]
pub struct ScrapePlan { pub targets: usize, pub table: String, pub sample_targets: Vec<TargetSample> }

// Apply/result envelope types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    pub source_name: String,
    pub containers: usize,
    pub records: usize,
    pub dropped: usize,
    pub enriched: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals { pub targets: usize, pub records: usize, pub enriched: usize, pub failed: usize, pub fetch_errors: usize }

impl RunTotals {
    pub fn from_summaries(per_target: &[TargetSummary]) -> Self {
        per_target.iter().fold(RunTotals { targets: per_target.len(), ..Default::default() }, |mut t, s| {
            t.records += s.records;
            t.enriched += s.enriched;
            t.failed += s.failed;
            if s.fetch_error.is_some() { t.fetch_errors += 1; }
            t
        })
    }
}

#[derive(Serialize)]
pub struct ScrapeApply<'a> {
    pub totals: RunTotals,
    pub per_target: &'a [TargetSummary],
    pub table: &'a str,
    pub rows_written: u64,
    pub records: &'a ResultSet,
}
