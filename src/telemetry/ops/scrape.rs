use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Scrape;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Target, FetchPage, Extract, Enrich, Persist }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Target => "target",
        Phase::FetchPage => "fetch_page",
        Phase::Extract => "extract",
        Phase::Enrich => "enrich",
        Phase::Persist => "persist",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Target => info_span!("target"),
        Phase::FetchPage => info_span!("fetch_page"),
        Phase::Extract => info_span!("extract"),
        Phase::Enrich => info_span!("enrich"),
        Phase::Persist => info_span!("persist"),
    }}
}

impl OpMarker for Scrape {
    const NAME: &'static str = "scrape";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("scrape") }
}
