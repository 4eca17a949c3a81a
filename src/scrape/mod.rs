use anyhow::Result;
use clap::Args;
use reqwest::Client;
use sqlx::PgPool;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::enrich::Enricher;
use crate::store;
use crate::telemetry::{self};
use crate::telemetry::ops::scrape::Phase as ScrapePhase;

pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod selector;
pub mod target;
pub mod types;

use self::pipeline::Pipeline;
use self::target::ScrapeTarget;
use self::types::{RunTotals, ScrapeApply, ScrapePlan, TargetSample};

#[derive(Args)]
pub struct ScrapeCmd {
    /// JSON file with scrape targets; the built-in target is used when omitted
    #[arg(long)] pub targets: Option<PathBuf>,
    /// Table to replace with the results (default: derived from the first target)
    #[arg(long)] pub table: Option<String>,
    /// Abort the run when any target page cannot be fetched
    #[arg(long, default_value_t = false)] pub fail_fast: bool,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

pub async fn run(pool: &PgPool, cfg: &AppConfig, args: ScrapeCmd) -> Result<()> {
    let log = telemetry::scrape();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("targets", format!("{:?}", args.targets)),
        ("table", format!("{:?}", args.table)),
        ("fail_fast", args.fail_fast.to_string()),
    ]).entered();

    let targets = match &args.targets {
        Some(path) => target::load_targets(path)?,
        None => target::default_targets(),
    };
    let table = match &args.table {
        Some(t) => t.clone(),
        None => default_table_name(&targets),
    };
    store::validate_ident(&table)?;

    if !args.apply {
        let _s = log.span(&ScrapePhase::Plan).entered();
        if telemetry::config::json_mode() {
            let sample_targets = targets.iter().take(args.plan_limit)
                .map(|t| TargetSample { source_name: t.source_name.clone(), source_url: t.source_url.clone(), container: t.container.clone() })
                .collect();
            log.plan(&ScrapePlan { targets: targets.len(), table, sample_targets })?;
        } else {
            log.info(format!("📝 Scrape plan — targets={} table={}", targets.len(), table));
            for t in targets.iter().take(args.plan_limit) {
                log.info(format!("  {} url={} container=<{} {:?}>", t.source_name, t.source_url, t.container.tag, t.container.attrs));
            }
            if targets.len() > args.plan_limit { log.info(format!("  ... ({} more)", targets.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let http = Client::new();
    let enricher = Enricher::new(&http, &cfg.lookup);
    let out = Pipeline::new(&http, &enricher, args.fail_fast).run(&targets).await?;

    let totals = RunTotals::from_summaries(&out.per_target);
    log.totals(&totals);
    if out.results.is_empty() {
        log.warn_kv("⚠️ run produced no records; the table will be empty", [("table", table.clone())]);
    }

    let grid = out.results.to_table();
    let rows_written = {
        let _s = log.span_kv(&ScrapePhase::Persist, [("table", table.clone())]).entered();
        store::replace_table(pool, &table, &grid).await?
    };
    log.info_kv("💾 table replaced", [
        ("table", table.clone()),
        ("records", out.results.len().to_string()),
        ("rows", rows_written.to_string()),
    ]);

    if telemetry::config::json_mode() {
        log.result(&ScrapeApply {
            totals,
            per_target: &out.per_target,
            table: &table,
            rows_written,
            records: &out.results,
        })?;
    } else {
        print!("{}", grid.render_text(40));
    }
    Ok(())
}

const FALLBACK_TABLE: &str = "companies";
const MAX_IDENT_BYTES: usize = 63;

/// `Space Capital` -> `space_capital`, `500 Startups` -> `t_500_startups`.
///
/// Always passes `store::validate_ident`.
fn default_table_name(targets: &[ScrapeTarget]) -> String {
    let Some(first) = targets.first() else { return FALLBACK_TABLE.to_string() };
    let mut name = normalize::normalize_name(&first.source_name).replace('-', "_");
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "t_");
    }
    // slug is ASCII, so any byte index is a char boundary
    name.truncate(MAX_IDENT_BYTES);
    match store::validate_ident(&name) {
        Ok(()) => name,
        Err(_) => FALLBACK_TABLE.to_string(),
    }
}
