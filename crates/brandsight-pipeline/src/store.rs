//! Report persistence.
//!
//! Reports are append-only: [`ReportStore::write`] creates a new record with a
//! fresh id and timestamps, and nothing updates or deletes it afterwards.

use std::collections::HashMap;

use async_trait::async_trait;
use brandsight_core::{Owner, ReportContent, StoredReport};
use brandsight_db::DbError;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Register an owner. Returns `true` when newly created.
    async fn register_owner(
        &self,
        owner_id: &str,
        display_name: Option<&str>,
    ) -> Result<bool, StoreError>;

    async fn owner_exists(&self, owner_id: &str) -> Result<bool, StoreError>;

    /// The registered owner, or `None` if the id is unknown.
    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError>;

    /// Persist new report content for its owner.
    async fn write(&self, content: &ReportContent) -> Result<StoredReport, StoreError>;

    async fn read_by_id(&self, id: Uuid) -> Result<Option<StoredReport>, StoreError>;

    /// All reports for `owner_id`, newest first.
    async fn read_all_by_owner(&self, owner_id: &str) -> Result<Vec<StoredReport>, StoreError>;

    /// Liveness check for the health route.
    async fn ping(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`ReportStore`] backed by the `owners` and `reports` tables.
#[derive(Debug, Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn register_owner(
        &self,
        owner_id: &str,
        display_name: Option<&str>,
    ) -> Result<bool, StoreError> {
        Ok(brandsight_db::register_owner(&self.pool, owner_id, display_name).await?)
    }

    async fn owner_exists(&self, owner_id: &str) -> Result<bool, StoreError> {
        Ok(brandsight_db::owner_exists(&self.pool, owner_id).await?)
    }

    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError> {
        Ok(brandsight_db::get_owner(&self.pool, owner_id)
            .await?
            .map(Owner::from))
    }

    async fn write(&self, content: &ReportContent) -> Result<StoredReport, StoreError> {
        let row = brandsight_db::insert_report(&self.pool, content)
            .await
            .map_err(|e| match e {
                DbError::Sqlx(sqlx::Error::Database(ref db)) if db.is_foreign_key_violation() => {
                    StoreError::UnknownOwner(content.owner_id.clone())
                }
                other => StoreError::Db(other),
            })?;
        Ok(row.into_stored()?)
    }

    async fn read_by_id(&self, id: Uuid) -> Result<Option<StoredReport>, StoreError> {
        match brandsight_db::get_report_by_public_id(&self.pool, id).await? {
            Some(row) => Ok(Some(row.into_stored()?)),
            None => Ok(None),
        }
    }

    async fn read_all_by_owner(&self, owner_id: &str) -> Result<Vec<StoredReport>, StoreError> {
        brandsight_db::list_reports_by_owner(&self.pool, owner_id)
            .await?
            .into_iter()
            .map(|row| row.into_stored().map_err(StoreError::from))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(brandsight_db::health_check(&self.pool).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    owners: HashMap<String, Owner>,
    /// Insertion order.
    reports: Vec<StoredReport>,
}

/// Process-local [`ReportStore`] for development and tests.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryReportStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn register_owner(
        &self,
        owner_id: &str,
        display_name: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.owners.contains_key(owner_id) {
            return Ok(false);
        }
        inner.owners.insert(
            owner_id.to_string(),
            Owner {
                owner_id: owner_id.to_string(),
                display_name: display_name.map(str::to_string),
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn owner_exists(&self, owner_id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.owners.contains_key(owner_id))
    }

    async fn get_owner(&self, owner_id: &str) -> Result<Option<Owner>, StoreError> {
        Ok(self.inner.read().await.owners.get(owner_id).cloned())
    }

    async fn write(&self, content: &ReportContent) -> Result<StoredReport, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.owners.contains_key(&content.owner_id) {
            return Err(StoreError::UnknownOwner(content.owner_id.clone()));
        }
        let now = Utc::now();
        let stored = StoredReport {
            id: Uuid::new_v4(),
            content: content.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.reports.push(stored.clone());
        Ok(stored)
    }

    async fn read_by_id(&self, id: Uuid) -> Result<Option<StoredReport>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn read_all_by_owner(&self, owner_id: &str) -> Result<Vec<StoredReport>, StoreError> {
        let inner = self.inner.read().await;
        // Reverse insertion order first so the stable sort keeps the later
        // write ahead on equal timestamps.
        let mut reports: Vec<StoredReport> = inner
            .reports
            .iter()
            .rev()
            .filter(|r| r.content.owner_id == owner_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
