//! RIA.ru economy-section adapter.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use newspulse_core::{AppConfig, Article};

use crate::error::ScraperError;
use crate::extract::extract_article;
use crate::fetch::{FetcherConfig, PageFetcher};
use crate::links::extract_links;
use crate::recency::filter_recent;
use crate::sources::{NewsSource, MAX_DETAIL_PAGES};

const SOURCE_NAME: &str = "ria";
const LISTING_URL: &str = "https://ria.ru/economy/";
const ORIGIN: &str = "https://ria.ru/";

/// Link selection rules, tried in order. The listing markup shifts between
/// site redesigns, so several generations of selectors are kept.
const LINK_RULES: &[&str] = &[
    "a[href*='/economy/']",
    "a[href*='/20'][href*='.html']",
    "div.list-item__content a.list-item__title",
    "a.cell-list__item-link[href*='/20']",
    "article a[href*='/20']",
];

/// Substrings marking an anti-bot interstitial instead of real content.
const CHALLENGE_MARKERS: &[&str] = &["captcha", "робот", "bot", "доступ ограничен"];

pub struct RiaSource {
    fetcher: PageFetcher,
    listing_url: String,
    origin: String,
    window_hours: u64,
    pacing_ms: (u64, u64),
}

impl RiaSource {
    /// Build the adapter against the production RIA endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Fetch`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::with_endpoints(config, LISTING_URL, ORIGIN)
    }

    /// Build the adapter against explicit endpoints. Production goes through
    /// [`RiaSource::new`]; integration tests point this at a local server.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Fetch`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn with_endpoints(
        config: &AppConfig,
        listing_url: &str,
        origin: &str,
    ) -> Result<Self, ScraperError> {
        let mut fetcher_config = FetcherConfig::from_app_config(config);
        fetcher_config.headers = browser_headers();
        fetcher_config.cookies = consent_cookies();
        fetcher_config.cookie_origin = Some(origin.to_owned());
        fetcher_config.challenge_markers = CHALLENGE_MARKERS
            .iter()
            .map(|marker| (*marker).to_owned())
            .collect();

        let fetcher = PageFetcher::new(fetcher_config)?;

        Ok(Self {
            fetcher,
            listing_url: listing_url.to_owned(),
            origin: origin.to_owned(),
            window_hours: config.recency_window_hours,
            pacing_ms: (config.detail_pacing_min_ms, config.detail_pacing_max_ms),
        })
    }

    /// Randomized pause between successive detail-page fetches.
    async fn pace(&self) {
        let (min, max) = self.pacing_ms;
        if max == 0 {
            return;
        }
        let ms = if min >= max {
            min
        } else {
            rand::rng().random_range(min..=max)
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Header set resembling a desktop browser session on a Russian-language
/// site. The user agent itself comes from the application config.
fn browser_headers() -> Vec<(String, String)> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
        ("Accept-Language", "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Cache-Control", "max-age=0"),
        ("DNT", "1"),
        ("Referer", "https://www.google.com/"),
    ]
    .iter()
    .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
    .collect()
}

/// Consent cookies a returning visitor would already carry.
fn consent_cookies() -> Vec<(String, String)> {
    vec![
        ("acceptCookies".to_owned(), "true".to_owned()),
        ("cookieConsent".to_owned(), "1".to_owned()),
    ]
}

#[async_trait]
impl NewsSource for RiaSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_recent_articles(&self) -> Result<Vec<Article>, ScraperError> {
        tracing::info!(source = SOURCE_NAME, url = %self.listing_url, "fetching listing page");
        let listing = self.fetcher.fetch(&self.listing_url).await?;

        let links = extract_links(&listing, &self.origin, LINK_RULES);
        tracing::info!(
            source = SOURCE_NAME,
            count = links.len(),
            "candidate article links"
        );
        if links.is_empty() {
            tracing::warn!(source = SOURCE_NAME, "listing page yielded no article links");
            return Ok(Vec::new());
        }

        let mut articles = Vec::new();
        for (index, link) in links.iter().take(MAX_DETAIL_PAGES).enumerate() {
            if index > 0 {
                self.pace().await;
            }

            let html = match self.fetcher.fetch(link).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(
                        source = SOURCE_NAME,
                        url = %link,
                        error = %e,
                        "skipping article — fetch failed"
                    );
                    continue;
                }
            };

            match extract_article(&html, link, SOURCE_NAME) {
                Ok(article) => {
                    tracing::debug!(
                        source = SOURCE_NAME,
                        url = %link,
                        title = %article.title,
                        "extracted article"
                    );
                    articles.push(article);
                }
                Err(e) => {
                    tracing::warn!(
                        source = SOURCE_NAME,
                        url = %link,
                        error = %e,
                        "skipping article — extraction failed"
                    );
                }
            }
        }

        Ok(filter_recent(articles, self.window_hours))
    }
}
