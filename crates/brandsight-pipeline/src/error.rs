use brandsight_db::DbError;
use thiserror::Error;

/// Errors from the review acquisition boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("app '{app_id}' not found at review source")]
    AppNotFound { app_id: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid review source URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Errors from the sentiment analysis engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis engine returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("analysis engine response could not be parsed: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("invalid analysis engine URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Errors from a [`ReportStore`](crate::store::ReportStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("owner '{0}' is not registered")]
    UnknownOwner(String),
}

/// Pipeline step a failure happened in. Logged with every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Acquire,
    Analyze,
    Persist,
    History,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Acquire => "acquire",
            Stage::Analyze => "analyze",
            Stage::Persist => "persist",
            Stage::History => "history",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-visible failure of an analysis or history request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed input or unknown owner. Nothing was fetched or written.
    #[error("{0}")]
    Validation(String),

    /// A review source or the analysis engine failed. Nothing was written.
    #[error("upstream unavailable during {stage}: {source}")]
    UpstreamUnavailable {
        stage: Stage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The report store failed to read or write.
    #[error("report store failure during {stage}: {source}")]
    Persistence {
        stage: Stage,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn upstream(
        stage: Stage,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::UpstreamUnavailable {
            stage,
            source: Box::new(source),
        }
    }

    pub(crate) fn persistence(stage: Stage, source: StoreError) -> Self {
        Self::Persistence { stage, source }
    }

    /// Stage the failure belongs to.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validate,
            Self::UpstreamUnavailable { stage, .. } | Self::Persistence { stage, .. } => *stage,
        }
    }
}
