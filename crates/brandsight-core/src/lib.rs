//! Shared domain types and configuration for BrandSight.

pub mod app_config;
pub mod config;
pub mod owner;
pub mod report;
pub mod source;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, StoreBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use owner::Owner;
pub use report::{
    ReportContent, ReviewItem, Sentiment, SentimentDistribution, StoredReport,
};
pub use source::{classify_url, extract_app_id, extract_place_token, SourceType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
