use scraper::{ElementRef, Html};

use super::normalize::normalize_name;
use super::selector::FieldSelector;
use super::target::ScrapeTarget;

/// Field values pulled out of one card, before any record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    /// Already normalized.
    pub name: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// One `RawFields` per container, in document order.
///
/// Absent sub-elements leave the field empty; they never drop the card here.
/// The description is the element's text content as-is, whitespace included.
pub fn extract(doc: &Html, target: &ScrapeTarget) -> Vec<RawFields> {
    let link_default = FieldSelector::new("a");
    let description_default = FieldSelector::new("p");
    let link_sel = target.link.as_ref().unwrap_or(&link_default);
    let description_sel = target.description.as_ref().unwrap_or(&description_default);

    target
        .container
        .find_all(doc)
        .into_iter()
        .map(|card| {
            let name_el = match &target.name {
                Some(sel) => sel.find_first(card),
                None => Some(card),
            };
            RawFields {
                name: name_el.map(|el| normalize_name(&text_of(el))),
                link: link_sel
                    .find_first(card)
                    .and_then(|el| el.value().attr("href"))
                    .map(str::to_string),
                description: description_sel.find_first(card).map(text_of),
            }
        })
        .collect()
}

/// Parses leniently; broken markup just yields fewer matches.
pub fn extract_html(html: &str, target: &ScrapeTarget) -> Vec<RawFields> {
    let doc = Html::parse_document(html);
    extract(&doc, target)
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}
