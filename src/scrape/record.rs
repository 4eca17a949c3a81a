use serde::Serialize;

use super::extract::RawFields;
use super::normalize::normalize_name;

/// A company as found on one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRecord {
    pub source_firm: String,
    pub company_name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// `None` when the card had no name.
pub fn build(source_name: &str, raw: RawFields) -> Option<CompanyRecord> {
    let company_name = raw.name?;
    Some(CompanyRecord {
        source_firm: normalize_name(source_name),
        company_name,
        url: raw.link,
        description: raw.description,
    })
}

/// Drops nameless cards, keeping the order of the rest.
pub fn build_all(source_name: &str, raws: Vec<RawFields>) -> Vec<CompanyRecord> {
    raws.into_iter().filter_map(|raw| build(source_name, raw)).collect()
}
