use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

/// Tag name plus attributes that must all match exactly.
///
/// Attributes not listed on the selector are ignored on the element, so an
/// empty `attrs` matches every element with the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl FieldSelector {
    pub fn new(tag: impl Into<String>) -> Self {
        FieldSelector { tag: tag.into(), attrs: BTreeMap::new() }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Tag and attribute names compare case-insensitively (the parser
    /// lowercases them); attribute values compare exactly.
    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        let node = el.value();
        if !node.name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| {
            node.attrs().any(|(k, v)| k.eq_ignore_ascii_case(name) && v == expected)
        })
    }

    /// Every matching element in the document, in document order.
    pub fn find_all<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| self.matches(el))
            .collect()
    }

    /// First matching element strictly below `scope`.
    pub fn find_first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| self.matches(el))
    }
}
