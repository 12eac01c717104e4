//! Database operations for the `owners` table.

use brandsight_core::Owner;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `owners` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnerRow {
    pub id: i64,
    pub owner_id: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OwnerRow> for Owner {
    fn from(row: OwnerRow) -> Self {
        Self {
            owner_id: row.owner_id,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

/// Register an owner id. Idempotent.
///
/// Returns `true` when a new row was created, `false` when the owner already
/// existed (the stored display name is left untouched).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn register_owner(
    pool: &PgPool,
    owner_id: &str,
    display_name: Option<&str>,
) -> Result<bool, DbError> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO owners (owner_id, display_name) \
         VALUES ($1, $2) \
         ON CONFLICT (owner_id) DO NOTHING \
         RETURNING id",
    )
    .bind(owner_id)
    .bind(display_name)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Returns `true` if the owner id has been registered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn owner_exists(pool: &PgPool, owner_id: &str) -> Result<bool, DbError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM owners WHERE owner_id = $1)")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Fetch a registered owner, or `None` if the id is unknown.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_owner(pool: &PgPool, owner_id: &str) -> Result<Option<OwnerRow>, DbError> {
    let row = sqlx::query_as::<_, OwnerRow>(
        "SELECT id, owner_id, display_name, created_at FROM owners WHERE owner_id = $1",
    )
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
