pub mod scrape;
pub mod export;
