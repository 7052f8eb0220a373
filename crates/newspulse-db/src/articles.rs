//! Database operations for the `articles` table.
//!
//! `save_articles` is the only operation the collection core calls; the
//! unprocessed-retrieval and marking operations are the hand-off contract
//! consumed by the downstream analysis pipeline.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use newspulse_core::Article;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub source: String,
    pub url: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub retrieved_at: DateTime<Utc>,
    pub is_processed: bool,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a batch of articles, ignoring any whose `url` already exists.
///
/// Returns the number of newly-inserted rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn save_articles(pool: &PgPool, articles: &[Article]) -> Result<u64, DbError> {
    if articles.is_empty() {
        return Ok(0);
    }

    let mut inserted: u64 = 0;
    for article in articles {
        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO articles (source, url, title, body, published_at, retrieved_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (url) DO NOTHING \
             RETURNING id",
        )
        .bind(&article.source)
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.published_at)
        .bind(article.retrieved_at)
        .fetch_optional(pool)
        .await?;

        if id.is_some() {
            inserted += 1;
        }
    }

    tracing::debug!(
        total = articles.len(),
        inserted,
        "saved article batch"
    );
    Ok(inserted)
}

/// Fetch articles not yet picked up by the analysis pipeline, newest first.
///
/// Ordered by `published_at DESC NULLS LAST`, then `id DESC` for a stable
/// order among rows sharing a timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_unprocessed(pool: &PgPool, limit: i64) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, source, url, title, body, published_at, retrieved_at, is_processed \
         FROM articles \
         WHERE is_processed = FALSE \
         ORDER BY published_at DESC NULLS LAST, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mark a single article as processed by the analysis pipeline.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has that id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_processed(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE articles SET is_processed = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
