pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn scrape() -> LogCtx<ops::scrape::Scrape> { LogCtx::new(config::logs_are_json()) }
pub fn export() -> LogCtx<ops::export::Export> { LogCtx::new(config::logs_are_json()) }
