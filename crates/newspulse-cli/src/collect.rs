//! Collection cycle handlers.
//!
//! Per-source failures are logged and skipped rather than propagated so a
//! single bad source does not abort the full cycle; nothing here returns an
//! error to the scheduler loop.

use newspulse_core::Article;
use newspulse_scraper::NewsSource;

/// Fetch one source's recent articles, degrading any failure to an empty
/// batch.
pub(crate) async fn collect_from_source(source: &dyn NewsSource) -> Vec<Article> {
    match source.fetch_recent_articles().await {
        Ok(articles) => {
            tracing::info!(
                source = source.name(),
                count = articles.len(),
                "collected articles"
            );
            articles
        }
        Err(e) => {
            tracing::error!(
                source = source.name(),
                error = %e,
                "source failed — contributing zero articles this cycle"
            );
            Vec::new()
        }
    }
}

/// Run one full collection cycle across every registered source.
///
/// Returns the number of newly-persisted articles. When `dry_run` is true
/// the collected articles are printed as JSON lines and nothing touches the
/// database.
pub(crate) async fn run_cycle(
    pool: &sqlx::PgPool,
    sources: &[Box<dyn NewsSource>],
    dry_run: bool,
) -> u64 {
    let started = std::time::Instant::now();
    let mut total_saved: u64 = 0;

    for source in sources {
        let articles = collect_from_source(source.as_ref()).await;
        if articles.is_empty() {
            continue;
        }

        if dry_run {
            for article in &articles {
                match serde_json::to_string(article) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "failed to render article as JSON"),
                }
            }
            continue;
        }

        match newspulse_db::save_articles(pool, &articles).await {
            Ok(saved) => {
                tracing::info!(
                    source = source.name(),
                    collected = articles.len(),
                    saved,
                    "persisted source batch"
                );
                total_saved += saved;
            }
            Err(e) => {
                tracing::error!(
                    source = source.name(),
                    error = %e,
                    "failed to persist batch"
                );
            }
        }
    }

    tracing::info!(
        total_saved,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "collection cycle complete"
    );
    total_saved
}
