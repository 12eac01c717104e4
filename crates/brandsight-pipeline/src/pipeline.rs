//! Analysis orchestration: classify, acquire, analyse, persist.

use std::sync::Arc;

use brandsight_core::{classify_url, AppConfig, Owner, SourceType, StoredReport};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::{AnalysisRequest, HttpSentimentEngine, SentimentEngine};
use crate::error::{PipelineError, Stage};
use crate::history::{list_history, History};
use crate::sources::{acquire, Acquisition, PlayStoreClient, ReviewSource};
use crate::store::ReportStore;

pub const DEFAULT_REVIEW_COUNT: u32 = 10;
pub const MAX_REVIEW_COUNT: u32 = 100;

/// One analysis submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub owner_id: String,
    #[serde(rename = "brandURL", alias = "brandUrl")]
    pub brand_url: String,
    #[serde(default)]
    pub review_count: Option<u32>,
}

/// Successful analysis result.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Report was produced and persisted.
    Completed(StoredReport),
    /// The URL is recognised but cannot be analysed yet. Nothing was stored.
    NotImplemented {
        message: String,
        source_type: SourceType,
    },
}

/// Runs analyses against a review source, an engine, and a report store.
#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn ReviewSource>,
    engine: Arc<dyn SentimentEngine>,
    store: Arc<dyn ReportStore>,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        source: Arc<dyn ReviewSource>,
        engine: Arc<dyn SentimentEngine>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            source,
            engine,
            store,
        }
    }

    /// Build the HTTP review source and engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UpstreamUnavailable`] if either HTTP client
    /// cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn ReportStore>,
    ) -> Result<Self, PipelineError> {
        let source = PlayStoreClient::new(
            &config.review_source_url,
            config.review_source_timeout_secs,
            &config.user_agent,
        )
        .map_err(|e| PipelineError::upstream(Stage::Acquire, e))?;
        let engine = HttpSentimentEngine::new(
            &config.engine_url,
            config.engine_timeout_secs,
            &config.user_agent,
        )
        .map_err(|e| PipelineError::upstream(Stage::Analyze, e))?;
        Ok(Self::new(Arc::new(source), Arc::new(engine), store))
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Analyse a brand URL for an owner and persist the report.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a blank or unknown owner, a review
    ///   count outside `1..=100`, an unsupported URL, or a store listing
    ///   without an app id.
    /// - [`PipelineError::UpstreamUnavailable`] if the review source or the
    ///   engine fails.
    /// - [`PipelineError::Persistence`] if the store fails.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutcome, PipelineError> {
        let owner_id = request.owner_id.trim();
        let source_type = classify_url(&request.brand_url);

        let result = self.run(owner_id, request, source_type).await;
        if let Err(ref e) = result {
            log_failure(owner_id, source_type, e);
        }
        result
    }

    async fn run(
        &self,
        owner_id: &str,
        request: &AnalyzeRequest,
        source_type: SourceType,
    ) -> Result<AnalysisOutcome, PipelineError> {
        if owner_id.is_empty() {
            return Err(PipelineError::validation("ownerId is required"));
        }
        let count = request.review_count.unwrap_or(DEFAULT_REVIEW_COUNT);
        if !(1..=MAX_REVIEW_COUNT).contains(&count) {
            return Err(PipelineError::validation(format!(
                "reviewCount must be between 1 and {MAX_REVIEW_COUNT}, got {count}"
            )));
        }
        let known = self
            .store
            .owner_exists(owner_id)
            .await
            .map_err(|e| PipelineError::persistence(Stage::Validate, e))?;
        if !known {
            return Err(PipelineError::validation(format!(
                "unknown owner '{owner_id}'"
            )));
        }

        let brand = match acquire(
            self.source.as_ref(),
            &request.brand_url,
            source_type,
            count,
        )
        .await?
        {
            Acquisition::Acquired(brand) => brand,
            Acquisition::NotImplemented { message } => {
                tracing::info!(
                    owner_id,
                    source_type = %source_type,
                    "analysis not implemented for source type"
                );
                return Ok(AnalysisOutcome::NotImplemented {
                    message,
                    source_type,
                });
            }
        };

        let analysis_request = AnalysisRequest {
            owner_id: owner_id.to_string(),
            source_type,
            title: brand.metadata.title,
            icon: brand.metadata.icon,
            description: brand.metadata.description,
            reviews: brand.reviews,
        };
        let content = self
            .engine
            .analyze(&analysis_request)
            .await
            .map_err(|e| PipelineError::upstream(Stage::Analyze, e))?;

        if !content.sentiment_distribution.is_consistent() {
            tracing::warn!(
                owner_id,
                app_id = %brand.app_id,
                total = content.sentiment_distribution.total(),
                "sentiment distribution does not sum to 100"
            );
        }
        if !content.success {
            tracing::warn!(owner_id, app_id = %brand.app_id, "engine reported an unsuccessful analysis");
        }

        let stored = self
            .store
            .write(&content)
            .await
            .map_err(|e| PipelineError::persistence(Stage::Persist, e))?;

        tracing::info!(
            owner_id,
            source_type = %source_type,
            report_id = %stored.id,
            reviews = stored.content.analyzed_reviews.len(),
            "report stored"
        );
        Ok(AnalysisOutcome::Completed(stored))
    }

    /// List an owner's reports, newest first.
    ///
    /// # Errors
    ///
    /// See [`list_history`].
    pub async fn history(&self, owner_id: &str) -> Result<History, PipelineError> {
        let result = list_history(self.store.as_ref(), owner_id).await;
        if let Err(ref e) = result {
            tracing::warn!(owner_id, stage = %e.stage(), error = %e, "history request failed");
        }
        result
    }

    /// Fetch one stored report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Persistence`] if the store cannot be read.
    pub async fn report(&self, id: Uuid) -> Result<Option<StoredReport>, PipelineError> {
        self.store
            .read_by_id(id)
            .await
            .map_err(|e| PipelineError::persistence(Stage::History, e))
    }

    /// Register an owner. Returns `true` when newly created.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] if `owner_id` is blank.
    /// - [`PipelineError::Persistence`] if the store fails.
    pub async fn register_owner(
        &self,
        owner_id: &str,
        display_name: Option<&str>,
    ) -> Result<bool, PipelineError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(PipelineError::validation("ownerId is required"));
        }
        let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());
        self.store
            .register_owner(owner_id, display_name)
            .await
            .map_err(|e| PipelineError::persistence(Stage::Persist, e))
    }

    /// Look up a registered owner. `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] if `owner_id` is blank.
    /// - [`PipelineError::Persistence`] if the store fails.
    pub async fn owner(&self, owner_id: &str) -> Result<Option<Owner>, PipelineError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(PipelineError::validation("ownerId is required"));
        }
        self.store
            .get_owner(owner_id)
            .await
            .map_err(|e| PipelineError::persistence(Stage::History, e))
    }
}

fn log_failure(owner_id: &str, source_type: SourceType, error: &PipelineError) {
    match error {
        PipelineError::Validation(_) => tracing::info!(
            owner_id,
            source_type = %source_type,
            stage = %error.stage(),
            error = %error,
            "analysis rejected"
        ),
        PipelineError::UpstreamUnavailable { .. } | PipelineError::Persistence { .. } => {
            tracing::error!(
                owner_id,
                source_type = %source_type,
                stage = %error.stage(),
                error = %error,
                "analysis failed"
            );
        }
    }
}
