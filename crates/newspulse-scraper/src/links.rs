//! Candidate article link extraction from listing pages.

use std::collections::HashSet;

use scraper::{Html, Selector};

/// Upper bound on distinct links returned per listing page.
pub const MAX_LINKS: usize = 20;

/// Extract up to [`MAX_LINKS`] distinct article URLs from a listing page.
///
/// `rules` is an ordered list of CSS selectors; each may match zero or more
/// anchors, and a rule whose selector fails to parse is skipped rather than
/// aborting the extraction. Anchors must carry an `href` starting with
/// `origin`; fragments and query strings are stripped; duplicates are
/// dropped order-preserving (first occurrence wins).
#[must_use]
pub fn extract_links(html: &str, origin: &str, rules: &[&str]) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut links: Vec<String> = Vec::new();

    for rule in rules {
        let Ok(selector) = Selector::parse(rule) else {
            tracing::debug!(%rule, "skipping link rule — selector failed to parse");
            continue;
        };
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.starts_with(origin) {
                continue;
            }
            let stripped = strip_fragment_and_query(href);
            if stripped.is_empty() {
                continue;
            }
            if seen.insert(stripped.to_owned()) {
                links.push(stripped.to_owned());
                if links.len() >= MAX_LINKS {
                    return links;
                }
            }
        }
    }

    links
}

/// Cut everything from the first `#` or `?` onward.
fn strip_fragment_and_query(href: &str) -> &str {
    let end = href.find(['#', '?']).unwrap_or(href.len());
    &href[..end]
}
