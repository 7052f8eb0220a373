//! Trailing-window recency filter.

use chrono::{DateTime, TimeDelta, Utc};

use newspulse_core::Article;

/// Keep only articles published within the trailing `window_hours`.
///
/// An article passes iff `published_at` is set and at or after
/// `now - window_hours`. Input order is preserved. Because extraction
/// defaults missing/unparseable dates to the retrieval instant, such
/// articles always pass.
#[must_use]
pub fn filter_recent(articles: Vec<Article>, window_hours: u64) -> Vec<Article> {
    let hours = i64::try_from(window_hours).unwrap_or(i64::MAX);
    let cutoff = TimeDelta::try_hours(hours)
        .and_then(|delta| Utc::now().checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let total = articles.len();
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|article| article.published_at.is_some_and(|t| t >= cutoff))
        .collect();

    tracing::debug!(
        total,
        kept = kept.len(),
        window_hours,
        "applied recency filter"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_published(hours_ago: i64) -> Article {
        let now = Utc::now();
        Article {
            source: "test".to_owned(),
            url: format!("https://news.example.com/{hours_ago}h.html"),
            title: "Economy grows 3%".to_owned(),
            body: "b".repeat(150),
            published_at: Some(now - TimeDelta::hours(hours_ago)),
            retrieved_at: now,
        }
    }

    #[test]
    fn keeps_only_articles_within_window() {
        let articles = vec![
            article_published(0),
            article_published(2),
            article_published(5),
        ];
        let kept = filter_recent(articles, 1);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].url.contains("/0h"));
    }

    #[test]
    fn wider_window_keeps_more() {
        let articles = vec![article_published(0), article_published(2)];
        assert_eq!(filter_recent(articles.clone(), 1).len(), 1);
        assert_eq!(filter_recent(articles, 3).len(), 2);
    }

    #[test]
    fn unset_date_is_dropped() {
        let mut article = article_published(0);
        article.published_at = None;
        assert!(filter_recent(vec![article], 24).is_empty());
    }

    #[test]
    fn defaulted_date_always_passes() {
        // Extraction substitutes "now" for unknown dates; such an article
        // must survive even a 1-hour window.
        let mut article = article_published(0);
        article.published_at = Some(Utc::now());
        assert_eq!(filter_recent(vec![article], 1).len(), 1);
    }

    #[test]
    fn input_order_is_preserved() {
        let articles = vec![
            article_published(0),
            article_published(2),
            article_published(1),
        ];
        let kept = filter_recent(articles, 3);
        let urls: Vec<&str> = kept.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://news.example.com/0h.html",
                "https://news.example.com/2h.html",
                "https://news.example.com/1h.html",
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_recent(Vec::new(), 1).is_empty());
    }
}
