//! Structured article extraction from detail pages.
//!
//! Every field is resolved by trying an ordered list of selector strategies;
//! each strategy is a fallible lookup returning an optional match, so a page
//! whose markup has drifted degrades field by field instead of failing
//! outright. A missing title or an undersized body rejects the article; a
//! missing or unparseable date does not.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use newspulse_core::Article;

use crate::dates::parse_date_string;
use crate::error::ExtractError;

/// Minimum character count for the trimmed article body.
const MIN_BODY_CHARS: usize = 100;
/// A title candidate must be longer than this to win.
const MIN_TITLE_CHARS: usize = 5;
/// Content blocks inside a matched container must be longer than this.
const MIN_BLOCK_CHARS: usize = 20;
/// Document-wide fallback paragraphs must be longer than this.
const MIN_FALLBACK_CHARS: usize = 50;
/// At most this many paragraphs are taken in the document-wide fallback.
const MAX_FALLBACK_BLOCKS: usize = 15;

/// A selector strategy: where to look and how to read the value out.
enum Probe {
    /// Element text content.
    Text(&'static str),
    /// `content` attribute of a meta tag.
    MetaContent(&'static str),
}

const TITLE_PROBES: &[Probe] = &[
    Probe::Text("h1.article__title"),
    Probe::Text("h1.m-article__title"),
    Probe::MetaContent(r#"meta[property="og:title"]"#),
    Probe::MetaContent(r#"meta[name="title"]"#),
    Probe::Text("title"),
];

const DATE_PROBES: &[Probe] = &[
    Probe::MetaContent(r#"meta[property="article:published_time"]"#),
    Probe::MetaContent(r#"meta[name="published_time"]"#),
    Probe::Text("div.article__info-date a"),
    Probe::Text("time.article__date"),
    Probe::Text("div.article__date"),
    Probe::MetaContent(r#"meta[itemprop="datePublished"]"#),
];

const BODY_CONTAINERS: &[&str] = &[
    "div.article__text",
    "div.article__body",
    "div.article-content",
    "article",
    r#"div[itemprop="articleBody"]"#,
];

const NOISE_TAGS: &[&str] = &["script", "style", "iframe"];
const NOISE_CLASSES: &[&str] = &["banner", "ad", "social"];

/// Extract a structured [`Article`] from a detail page.
///
/// # Errors
///
/// [`ExtractError::MissingTitle`] if no title strategy yields a candidate
/// longer than 5 characters; [`ExtractError::BodyTooShort`] if the body
/// ends up under 100 characters after trimming.
pub fn extract_article(html: &str, url: &str, source: &str) -> Result<Article, ExtractError> {
    let document = Html::parse_document(html);

    let title =
        probe_first(&document, TITLE_PROBES, MIN_TITLE_CHARS).ok_or_else(|| {
            ExtractError::MissingTitle {
                url: url.to_owned(),
            }
        })?;

    let published_at = match probe_first(&document, DATE_PROBES, 0) {
        Some(raw) => parse_date_string(&raw),
        None => {
            tracing::debug!(url, "no publication date found — defaulting to now");
            Utc::now()
        }
    };

    let body = extract_body(&document);
    let body_chars = body.trim().chars().count();
    if body_chars < MIN_BODY_CHARS {
        return Err(ExtractError::BodyTooShort {
            url: url.to_owned(),
            len: body_chars,
        });
    }

    Ok(Article {
        source: source.to_owned(),
        url: url.to_owned(),
        title,
        body,
        published_at: Some(published_at),
        retrieved_at: Utc::now(),
    })
}

/// Try each probe in order; return the first value longer than `min_chars`.
fn probe_first(document: &Html, probes: &[Probe], min_chars: usize) -> Option<String> {
    for probe in probes {
        let (raw_selector, from_meta) = match probe {
            Probe::Text(s) => (*s, false),
            Probe::MetaContent(s) => (*s, true),
        };
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };
        let value = if from_meta {
            element
                .value()
                .attr("content")
                .unwrap_or_default()
                .trim()
                .to_owned()
        } else {
            normalized_text(element)
        };
        if value.chars().count() > min_chars {
            return Some(value);
        }
    }
    None
}

/// Whitespace-collapsed text content of an element.
fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Assemble the body text: first container selector whose qualifying blocks
/// are non-empty wins; otherwise a document-wide paragraph scan.
fn extract_body(document: &Html) -> String {
    for raw_selector in BODY_CONTAINERS {
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };
        let Some(container) = document.select(&selector).next() else {
            continue;
        };
        let blocks = content_blocks(container);
        if !blocks.is_empty() {
            return blocks.join("\n");
        }
    }

    let Ok(paragraphs) = Selector::parse("p") else {
        return String::new();
    };
    document
        .select(&paragraphs)
        .map(normalized_text)
        .filter(|text| text.chars().count() > MIN_FALLBACK_CHARS)
        .take(MAX_FALLBACK_BLOCKS)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Qualifying paragraph and sub-heading texts within a container, excluding
/// anything living under a noise subtree.
fn content_blocks(container: ElementRef<'_>) -> Vec<String> {
    let Ok(selector) = Selector::parse("p, h2, h3, h4") else {
        return Vec::new();
    };
    container
        .select(&selector)
        .filter(|element| !in_noise_subtree(*element, container))
        .map(normalized_text)
        .filter(|text| text.chars().count() > MIN_BLOCK_CHARS)
        .collect()
}

/// True if the element, or any ancestor up to (not including) the container,
/// is a noise element: script/style/iframe, or carrying a banner/ad/social
/// class. The original markup cannot be mutated, so noise is excluded here
/// instead of being removed from the tree.
fn in_noise_subtree(element: ElementRef<'_>, container: ElementRef<'_>) -> bool {
    if is_noise(element) {
        return true;
    }
    for node in element.ancestors() {
        if node.id() == container.id() {
            break;
        }
        if let Some(ancestor) = ElementRef::wrap(node) {
            if is_noise(ancestor) {
                return true;
            }
        }
    }
    false
}

fn is_noise(element: ElementRef<'_>) -> bool {
    let value = element.value();
    NOISE_TAGS.contains(&value.name())
        || value.classes().any(|class| NOISE_CLASSES.contains(&class))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://news.example.com/2024/story.html";

    fn long_paragraph(n: usize) -> String {
        "word ".repeat(n).trim_end().to_owned()
    }

    fn article_page(title_block: &str, date_block: &str, body_paragraphs: &[String]) -> String {
        let body: String = body_paragraphs
            .iter()
            .map(|p| format!("<p>{p}</p>"))
            .collect();
        format!(
            "<html><head>{date_block}</head><body>{title_block}\
             <div class=\"article__text\">{body}</div></body></html>"
        )
    }

    #[test]
    fn extracts_full_article() {
        let html = article_page(
            "<h1 class=\"article__title\">Economy grows 3% this quarter</h1>",
            "<meta property=\"article:published_time\" content=\"2024-01-15T14:30:00Z\">",
            &[long_paragraph(30), long_paragraph(30)],
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert_eq!(article.title, "Economy grows 3% this quarter");
        assert_eq!(article.url, URL);
        assert_eq!(article.source, "ria");
        assert!(article.published_at.is_some());
        assert!(article.body.contains('\n'), "blocks should be newline-joined");
    }

    #[test]
    fn missing_title_rejects_article() {
        let html = article_page("", "", &[long_paragraph(40)]);
        let result = extract_article(&html, URL, "ria");
        assert!(matches!(result, Err(ExtractError::MissingTitle { .. })));
    }

    #[test]
    fn short_title_candidates_are_passed_over() {
        // h1 candidate is too short (<= 5 chars); og:title should win instead.
        let html = article_page(
            "<h1 class=\"article__title\">Oops</h1>\
             <meta property=\"og:title\" content=\"A proper headline\">",
            "",
            &[long_paragraph(40)],
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert_eq!(article.title, "A proper headline");
    }

    #[test]
    fn page_title_is_last_resort() {
        let html = format!(
            "<html><head><title>Headline from the title tag</title></head>\
             <body><div class=\"article__text\"><p>{}</p></div></body></html>",
            long_paragraph(40)
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert_eq!(article.title, "Headline from the title tag");
    }

    #[test]
    fn short_body_rejects_article() {
        let html = article_page(
            "<h1 class=\"article__title\">Economy grows 3% this quarter</h1>",
            "",
            &["Tiny.".to_owned()],
        );
        let result = extract_article(&html, URL, "ria");
        assert!(matches!(result, Err(ExtractError::BodyTooShort { .. })));
    }

    #[test]
    fn missing_date_defaults_instead_of_rejecting() {
        let before = Utc::now();
        let html = article_page(
            "<h1 class=\"article__title\">Economy grows 3% this quarter</h1>",
            "",
            &[long_paragraph(40)],
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert!(article.published_at.expect("defaulted date") >= before);
    }

    #[test]
    fn visible_date_is_used_when_meta_is_absent() {
        let html = format!(
            "<html><body><h1 class=\"article__title\">Economy grows 3% this quarter</h1>\
             <div class=\"article__date\">15.01.2024 14:30</div>\
             <div class=\"article__text\"><p>{}</p></div></body></html>",
            long_paragraph(40)
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        let published = article.published_at.expect("parsed date");
        assert_eq!(published.to_rfc3339(), "2024-01-15T14:30:00+00:00");
    }

    #[test]
    fn noise_subtrees_are_excluded_from_body() {
        let html = format!(
            "<html><body><h1 class=\"article__title\">Economy grows 3% this quarter</h1>\
             <div class=\"article__text\">\
               <p>{}</p>\
               <div class=\"banner\"><p>{}</p></div>\
               <p class=\"social\">{}</p>\
             </div></body></html>",
            long_paragraph(40),
            "advertisement ".repeat(10),
            "share this everywhere please ".repeat(5),
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert!(!article.body.contains("advertisement"));
        assert!(!article.body.contains("share this"));
    }

    #[test]
    fn short_blocks_are_dropped_from_body() {
        let html = article_page(
            "<h1 class=\"article__title\">Economy grows 3% this quarter</h1>",
            "",
            &[long_paragraph(40), "Short note".to_owned()],
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert!(!article.body.contains("Short note"));
    }

    #[test]
    fn subheadings_are_kept_in_body() {
        let html = format!(
            "<html><body><h1 class=\"article__title\">Economy grows 3% this quarter</h1>\
             <div class=\"article__text\">\
               <h2>A section heading long enough to keep</h2>\
               <p>{}</p>\
             </div></body></html>",
            long_paragraph(40)
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert!(article.body.starts_with("A section heading long enough to keep"));
    }

    #[test]
    fn container_fallback_walks_the_ordered_list() {
        // No div.article__text; the bare <article> tag should match instead.
        let html = format!(
            "<html><body><h1 class=\"article__title\">Economy grows 3% this quarter</h1>\
             <article><p>{}</p></article></body></html>",
            long_paragraph(40)
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert!(!article.body.is_empty());
    }

    #[test]
    fn document_wide_fallback_caps_paragraph_count() {
        let paragraphs: String = (0..MAX_FALLBACK_BLOCKS + 5)
            .map(|i| format!("<p>paragraph {i} {}</p>", long_paragraph(15)))
            .collect();
        let html = format!(
            "<html><body><h1 class=\"article__title\">Economy grows 3% this quarter</h1>\
             {paragraphs}</body></html>"
        );
        let article = extract_article(&html, URL, "ria").expect("expected article");
        assert_eq!(article.body.lines().count(), MAX_FALLBACK_BLOCKS);
    }
}
