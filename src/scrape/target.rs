use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use super::selector::FieldSelector;

/// One listing page plus the selectors used to cut it into cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeTarget {
    pub source_name: String,
    pub source_url: String,
    pub container: FieldSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<FieldSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldSelector>,
}

impl ScrapeTarget {
    pub fn new(source_name: impl Into<String>, source_url: impl Into<String>, container: FieldSelector) -> Self {
        ScrapeTarget {
            source_name: source_name.into(),
            source_url: source_url.into(),
            container,
            name: None,
            link: None,
            description: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_name.trim().is_empty() { bail!("target with url {} has an empty source_name", self.source_url); }
        if Url::parse(&self.source_url).is_err() { bail!("Invalid URL for target {}: {}", self.source_name, self.source_url); }
        let selectors = [
            ("container", Some(&self.container)),
            ("name", self.name.as_ref()),
            ("link", self.link.as_ref()),
            ("description", self.description.as_ref()),
        ];
        for (field, sel) in selectors {
            if let Some(sel) = sel {
                if sel.tag.trim().is_empty() { bail!("target {}: {} selector has an empty tag", self.source_name, field); }
            }
        }
        Ok(())
    }
}

/// Targets from a JSON array file; every entry is validated.
pub fn load_targets(path: &Path) -> Result<Vec<ScrapeTarget>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading targets file {}", path.display()))?;
    parse_targets(&raw).with_context(|| format!("parsing targets file {}", path.display()))
}

pub fn parse_targets(raw: &str) -> Result<Vec<ScrapeTarget>> {
    let targets: Vec<ScrapeTarget> = serde_json::from_str(raw)?;
    if targets.is_empty() { bail!("no scrape targets configured"); }
    for t in &targets { t.validate()?; }
    Ok(targets)
}

/// Built-in target used when no targets file is given.
pub fn default_targets() -> Vec<ScrapeTarget> {
    let mut space_capital = ScrapeTarget::new(
        "Space Capital",
        "https://www.spacecapital.com/portfolio",
        FieldSelector::new("div")
            .with_attr("role", "listitem")
            .with_attr("class", "collection-item-2 w-dyn-item"),
    );
    space_capital.name = Some(FieldSelector::new("div").with_attr("class", "portfolio-card-text bold-pfcard-text"));
    space_capital.link = Some(FieldSelector::new("a").with_attr("class", "portfolio-linkblock2"));
    space_capital.description = Some(FieldSelector::new("div").with_attr("class", "porfoliocard-textwrap"));
    vec![space_capital]
}
