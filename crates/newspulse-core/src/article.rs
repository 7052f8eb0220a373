use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single extracted news article, the unit handed from the scraper to
/// storage.
///
/// `url` is the canonical article URL and acts as the natural unique key —
/// storage deduplicates on it. `title` and `body` are always non-empty in a
/// value produced by the extractor; items failing those checks are rejected
/// before construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Identifier of the source adapter that produced this article.
    pub source: String,
    /// Absolute, scheme-qualified article URL.
    pub url: String,
    pub title: String,
    /// Plain text, newline-joined from qualifying content blocks.
    pub body: String,
    /// Publication time as claimed by the page. Unparseable or missing
    /// values are substituted with the retrieval instant at extraction
    /// time, so extractor output always carries `Some`.
    pub published_at: Option<DateTime<Utc>>,
    /// When this article was fetched, independent of `published_at`.
    pub retrieved_at: DateTime<Utc>,
}
