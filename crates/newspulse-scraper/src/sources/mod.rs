//! Source adapter abstraction.
//!
//! Each news origin implements [`NewsSource`]; the registry in
//! [`build_sources`] is an explicit compile-time mapping, not dynamic
//! discovery. Adapters own their fetcher (connection pool + cookie jar)
//! exclusively.

use async_trait::async_trait;

use newspulse_core::{AppConfig, Article};

use crate::error::ScraperError;

pub mod ria;

pub use ria::RiaSource;

/// Hard cap on detail pages visited per source per cycle.
pub const MAX_DETAIL_PAGES: usize = 10;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short identifier recorded on every article this source produces.
    fn name(&self) -> &str;

    /// Fetch articles published within the configured recency window.
    ///
    /// Single-article failures are handled inside the adapter (logged and
    /// skipped); an `Err` means this source produced nothing for the cycle,
    /// e.g. the listing page could not be fetched.
    async fn fetch_recent_articles(&self) -> Result<Vec<Article>, ScraperError>;
}

/// Build the registry of available sources.
///
/// A source whose adapter fails to construct is logged and omitted so the
/// remaining sources still run.
#[must_use]
pub fn build_sources(config: &AppConfig) -> Vec<Box<dyn NewsSource>> {
    let mut sources: Vec<Box<dyn NewsSource>> = Vec::new();

    match RiaSource::new(config) {
        Ok(source) => sources.push(Box::new(source)),
        Err(e) => {
            tracing::error!(source = "ria", error = %e, "failed to construct source adapter");
        }
    }

    sources
}
