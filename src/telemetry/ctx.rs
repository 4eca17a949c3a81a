use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, debug, warn, error, Span};

use super::emit::{self, Envelope};
use crate::scrape::types::{RunTotals, TargetSummary};

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

/// Logging context typed by the command it reports for.
pub struct LogCtx<O: OpMarker> {
    json: bool,
    _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    pub(crate) fn new(json: bool) -> Self { LogCtx { json, _marker: PhantomData } }

    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            debug!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            debug!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{} {}", msg, details); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} {}", msg, details); }
    }

    pub fn error_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { error!(op = %self.op_name(), details = %details, "{}", msg); }
        else { error!("{} {}", msg, details); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print_envelope(&Envelope::plan(self.op_name(), plan)?) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { emit::print_envelope(&Envelope::result(self.op_name(), result)?) }
}

impl LogCtx<crate::telemetry::ops::scrape::Scrape> {
    pub fn target_summary(&self, s: &TargetSummary) {
        let fetch_error = s.fetch_error.as_deref().unwrap_or("");
        if self.json {
            info!(op = %self.op_name(), source = %s.source_name, containers = s.containers, records = s.records,
                  dropped = s.dropped, enriched = s.enriched, failed = s.failed, fetch_error, "target_summary");
        } else if s.fetch_error.is_some() {
            info!("❌ Target {} — fetch failed: {}", s.source_name, fetch_error);
        } else {
            info!("✅ Target {} — containers={} records={} dropped={} enriched={} failed={}",
                  s.source_name, s.containers, s.records, s.dropped, s.enriched, s.failed);
        }
    }

    pub fn totals(&self, t: &RunTotals) {
        if self.json {
            info!(op = %self.op_name(), targets = t.targets, records = t.records, enriched = t.enriched,
                  failed = t.failed, fetch_errors = t.fetch_errors, "scrape_totals");
        } else {
            info!("📊 Scrape totals — targets={} records={} enriched={} failed={} fetch_errors={}",
                  t.targets, t.records, t.enriched, t.failed, t.fetch_errors);
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_pairs_join_in_order() {
        let s = kv_to_string([("company", "acme-corp".to_string()), ("reason", "status 404".to_string())]);
        assert_eq!(s, "company=acme-corp reason=status 404");
    }

    #[test]
    fn empty_kv_is_empty_string() {
        assert_eq!(kv_to_string(Vec::<(&str, String)>::new()), "");
    }
}
