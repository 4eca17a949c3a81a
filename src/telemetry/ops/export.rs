use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Export;

#[derive(Copy, Clone, Debug)]
pub enum Phase { ReadTable, ClearSheet, WriteSheet }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::ReadTable => "read_table",
        Phase::ClearSheet => "clear_sheet",
        Phase::WriteSheet => "write_sheet",
    }}
    fn span(&self) -> Span { match self {
        Phase::ReadTable => info_span!("read_table"),
        Phase::ClearSheet => info_span!("clear_sheet"),
        Phase::WriteSheet => info_span!("write_sheet"),
    }}
}

impl OpMarker for Export {
    const NAME: &'static str = "export";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("export") }
}
