pub mod lookup;

use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::config::LookupConfig;
use crate::scrape::record::CompanyRecord;
use crate::telemetry;

use self::lookup::LookupClient;

/// Outcome of looking a company up in the external service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Enrichment {
    Enriched { url: String, description: String, profile_url: String },
    Failed { reason: String },
}

impl Enrichment {
    pub fn status(&self) -> &'static str {
        match self {
            Enrichment::Enriched { .. } => "ok",
            Enrichment::Failed { .. } => "failed",
        }
    }

    pub fn is_enriched(&self) -> bool { matches!(self, Enrichment::Enriched { .. }) }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Enrichment::Failed { reason } => Some(reason.as_str()),
            Enrichment::Enriched { .. } => None,
        }
    }
}

/// A company record plus its lookup outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedCompanyRecord {
    #[serde(flatten)]
    pub record: CompanyRecord,
    pub enrichment: Enrichment,
}

impl EnrichedCompanyRecord {
    pub fn external_url(&self) -> Option<&str> {
        match &self.enrichment { Enrichment::Enriched { url, .. } => Some(url.as_str()), Enrichment::Failed { .. } => None }
    }

    pub fn external_description(&self) -> Option<&str> {
        match &self.enrichment { Enrichment::Enriched { description, .. } => Some(description.as_str()), Enrichment::Failed { .. } => None }
    }

    pub fn external_profile_url(&self) -> Option<&str> {
        match &self.enrichment { Enrichment::Enriched { profile_url, .. } => Some(profile_url.as_str()), Enrichment::Failed { .. } => None }
    }
}

/// Lookup key for a stored company name: lowercase, spaces and periods to hyphens.
///
/// Deliberately separate from `normalize_name`; on an already normalized name
/// the two agree, on raw display text they do not.
pub fn lookup_key(company_name: &str) -> String {
    company_name
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '.' { '-' } else { c })
        .collect()
}

/// Enriches records one at a time, pausing after every lookup.
pub struct Enricher<'a> {
    client: LookupClient<'a>,
    cfg: &'a LookupConfig,
}

impl<'a> Enricher<'a> {
    pub fn new(http: &'a HttpClient, cfg: &'a LookupConfig) -> Self {
        Enricher { client: LookupClient::new(http, cfg), cfg }
    }

    /// Never fails: lookup errors are logged and kept as `Enrichment::Failed`.
    pub async fn enrich(&self, record: CompanyRecord) -> EnrichedCompanyRecord {
        let key = lookup_key(&record.company_name);
        let outcome = self.client.lookup(&key).await;
        // throttle applies whether or not the call succeeded
        tokio::time::sleep(self.cfg.delay).await;

        let enrichment = match outcome {
            Ok(profile) => Enrichment::Enriched {
                url: profile.website_url,
                description: profile.short_description,
                profile_url: format!("{}/organization/{}", self.cfg.profile_base_url.trim_end_matches('/'), key),
            },
            Err(e) => {
                telemetry::scrape().warn_kv("⚠️ enrichment failed", [
                    ("company", record.company_name.clone()),
                    ("reason", e.to_string()),
                ]);
                Enrichment::Failed { reason: e.to_string() }
            }
        };
        EnrichedCompanyRecord { record, enrichment }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(name: &str) -> CompanyRecord {
        CompanyRecord {
            source_firm: "space-capital".into(),
            company_name: name.into(),
            url: Some("https://listing.example/acme".into()),
            description: Some("from the listing".into()),
        }
    }

    fn assert_all_or_nothing(r: &EnrichedCompanyRecord) {
        let present = [r.external_url().is_some(), r.external_description().is_some(), r.external_profile_url().is_some()];
        assert!(present.iter().all(|p| *p) || present.iter().all(|p| !*p), "mixed state: {r:?}");
    }

    #[test]
    fn lookup_key_on_normalized_name_is_identity() {
        assert_eq!(lookup_key("acme-corp"), "acme-corp");
        assert_eq!(lookup_key("under_score-9"), "under_score-9");
    }

    #[test]
    fn lookup_key_diverges_from_name_normalizer_on_raw_text() {
        use crate::scrape::normalize::normalize_name;
        assert_eq!(lookup_key("Acme Corp."), "acme-corp-");
        assert_eq!(normalize_name("Acme Corp."), "acme-corp");
        assert_eq!(lookup_key("A  B & C"), "a--b-&-c");
        assert_eq!(normalize_name("A  B & C"), "a-b--c");
    }

    #[tokio::test]
    async fn success_populates_all_external_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entities/organizations/acme-corp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {"short_description": "Widgets at scale", "website_url": "https://acme.example"}
            })))
            .mount(&server)
            .await;

        let http = HttpClient::new();
        let cfg = LookupConfig::for_base(&server.uri(), "k");
        let out = Enricher::new(&http, &cfg).enrich(record("acme-corp")).await;

        assert_eq!(out.enrichment.status(), "ok");
        assert_eq!(out.external_url(), Some("https://acme.example"));
        assert_eq!(out.external_description(), Some("Widgets at scale"));
        assert_eq!(out.external_profile_url(), Some(format!("{}/organization/acme-corp", server.uri()).as_str()));
        assert_eq!(out.record, record("acme-corp"));
        assert_all_or_nothing(&out);
    }

    #[tokio::test]
    async fn not_found_yields_all_absent_with_reason() {
        let server = MockServer::start().await;
        let http = HttpClient::new();
        let cfg = LookupConfig::for_base(&server.uri(), "k");
        let out = Enricher::new(&http, &cfg).enrich(record("ghost-co")).await;

        assert_eq!(out.enrichment.status(), "failed");
        assert!(out.enrichment.failure_reason().unwrap().contains("404"));
        assert_eq!(out.external_url(), None);
        assert_all_or_nothing(&out);
    }

    #[tokio::test]
    async fn malformed_body_yields_all_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let http = HttpClient::new();
        let cfg = LookupConfig::for_base(&server.uri(), "k");
        let out = Enricher::new(&http, &cfg).enrich(record("acme-corp")).await;
        assert!(!out.enrichment.is_enriched());
        assert_all_or_nothing(&out);
    }

    #[tokio::test]
    async fn unreachable_service_yields_all_absent() {
        let http = HttpClient::new();
        // port 9 (discard) on localhost refuses connections
        let cfg = LookupConfig::for_base("http://127.0.0.1:9", "k");
        let out = Enricher::new(&http, &cfg).enrich(record("acme-corp")).await;
        assert!(!out.enrichment.is_enriched());
        assert_all_or_nothing(&out);
    }

    #[tokio::test]
    async fn delay_applies_even_on_failure() {
        let server = MockServer::start().await;
        let http = HttpClient::new();
        let mut cfg = LookupConfig::for_base(&server.uri(), "k");
        cfg.delay = Duration::from_millis(150);
        let t0 = Instant::now();
        let out = Enricher::new(&http, &cfg).enrich(record("ghost-co")).await;
        assert!(!out.enrichment.is_enriched());
        assert!(t0.elapsed() >= Duration::from_millis(150));
    }
}
