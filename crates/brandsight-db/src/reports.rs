//! Database operations for the `reports` table.
//!
//! Reports are append-only. This module exposes no update or delete, and the
//! table carries a trigger rejecting both.

use brandsight_core::{ReportContent, ReviewItem, SentimentDistribution, StoredReport};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `reports` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub public_id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub keywords: Value,
    pub sentiment_distribution: Value,
    pub analyzed_reviews: Value,
    pub suggestions: Value,
    pub success: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportRow {
    /// Decode the JSONB columns into a [`StoredReport`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if a JSONB column does not match its schema.
    pub fn into_stored(self) -> Result<StoredReport, DbError> {
        Ok(StoredReport {
            id: self.public_id,
            content: ReportContent {
                owner_id: self.owner_id,
                title: self.title,
                description: self.description,
                icon: self.icon,
                keywords: decode::<Vec<String>>("keywords", self.keywords)?,
                sentiment_distribution: decode::<SentimentDistribution>(
                    "sentiment_distribution",
                    self.sentiment_distribution,
                )?,
                analyzed_reviews: decode::<Vec<ReviewItem>>(
                    "analyzed_reviews",
                    self.analyzed_reviews,
                )?,
                suggestions: decode::<Vec<String>>("suggestions", self.suggestions)?,
                success: self.success,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(column: &'static str, value: Value) -> Result<T, DbError> {
    serde_json::from_value(value).map_err(|source| DbError::Decode { column, source })
}

fn encode<T: serde::Serialize>(column: &'static str, value: &T) -> Result<Value, DbError> {
    serde_json::to_value(value).map_err(|source| DbError::Encode { column, source })
}

const REPORT_COLUMNS: &str = "id, public_id, owner_id, title, description, icon, keywords, \
     sentiment_distribution, analyzed_reviews, suggestions, success, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a new report and return the stored row.
///
/// The public id is generated here; `created_at`/`updated_at` come from the
/// database clock.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if a JSON column cannot be serialized, or
/// [`DbError::Sqlx`] if the insert fails (including an unknown owner id).
pub async fn insert_report(pool: &PgPool, content: &ReportContent) -> Result<ReportRow, DbError> {
    let keywords = encode("keywords", &content.keywords)?;
    let distribution = encode("sentiment_distribution", &content.sentiment_distribution)?;
    let reviews = encode("analyzed_reviews", &content.analyzed_reviews)?;
    let suggestions = encode("suggestions", &content.suggestions)?;

    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "INSERT INTO reports \
             (public_id, owner_id, title, description, icon, keywords, \
              sentiment_distribution, analyzed_reviews, suggestions, success) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&content.owner_id)
    .bind(&content.title)
    .bind(&content.description)
    .bind(&content.icon)
    .bind(keywords)
    .bind(distribution)
    .bind(reviews)
    .bind(suggestions)
    .bind(content.success)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return a single report by its public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_report_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<ReportRow>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// List every report for an owner, newest first.
///
/// Results are ordered by `created_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reports_by_owner(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<ReportRow>, DbError> {
    let rows = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports \
         WHERE owner_id = $1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
