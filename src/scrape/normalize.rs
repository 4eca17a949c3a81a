use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.\s]+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

/// Map a display string to a slug over `[a-z0-9_-]`.
///
/// Runs of whitespace and periods become one hyphen, every other character
/// outside `[A-Za-z0-9_-]` is deleted, and the result is lowercased.
///
/// On top of those three steps, hyphens at either end are trimmed: `"Acme Corp."`
/// gives `"acme-corp"` rather than `"acme-corp-"`, and `"- leading dash"` gives
/// `"leading-dash"`. Hyphens that came from the input itself are trimmed too.
pub fn normalize_name(text: &str) -> String {
    let hyphenated = SEPARATORS.replace_all(text, "-");
    let kept = DISALLOWED.replace_all(&hyphenated, "");
    kept.trim_matches('-').to_ascii_lowercase()
}
