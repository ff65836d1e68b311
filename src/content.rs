use once_cell::sync::Lazy;
use regex::Regex;

pub static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^|\]]+?)(?:\|[^\]]+)?\]\]").unwrap());

/// Yields wikilink targets in markup order.
///
/// `[[Target]]` and `[[Target|label]]` both yield `Target`, untrimmed and
/// unnormalized. No dedup: a page linking the same target twice yields it
/// twice, and adjacency lists preserve that.
pub fn extract_links(text: &str) -> impl Iterator<Item = &str> {
    LINK_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}
