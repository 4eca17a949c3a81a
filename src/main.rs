use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;

mod config;
mod enrich;
mod scrape;
mod sheets;
mod store;
mod table;
mod telemetry;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "portfolio", about = "Scrape portfolio listing pages into enriched company tables")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape targets, enrich each company and replace the result table
    Scrape(scrape::ScrapeCmd),
    /// Copy a result table into a spreadsheet worksheet
    Export(sheets::ExportCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);
    telemetry::config::init_tracing();

    // both credentials are checked here, before any page or table is touched
    let cfg = AppConfig::from_env(cli.dsn)?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&cfg.database_url)?;

    match cli.command {
        Commands::Scrape(args) => scrape::run(&pool, &cfg, args).await?,
        Commands::Export(args) => sheets::run(&pool, args).await?,
    }

    Ok(())
}
