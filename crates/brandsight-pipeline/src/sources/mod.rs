//! Review acquisition.
//!
//! A [`ReviewSource`] returns listing metadata and the most recent reviews
//! for one app. [`PlayStoreClient`] talks to the review gateway over HTTP.

mod play_store;

use async_trait::async_trait;
use brandsight_core::{extract_app_id, extract_place_token, ReviewItem, SourceType};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, SourceError, Stage};

pub use play_store::PlayStoreClient;

/// Listing metadata for an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// Metadata plus the reviews to analyse.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredBrand {
    pub app_id: String,
    pub metadata: AppMetadata,
    pub reviews: Vec<ReviewItem>,
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch title, icon, and description for `app_id`.
    async fn app_metadata(&self, app_id: &str) -> Result<AppMetadata, SourceError>;

    /// Fetch up to `count` reviews for `app_id`, newest first.
    async fn recent_reviews(&self, app_id: &str, count: u32)
        -> Result<Vec<ReviewItem>, SourceError>;
}

/// Result of acquiring a brand URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    /// Listing metadata and reviews ready for analysis.
    Acquired(AcquiredBrand),
    /// Recognised platform without an acquisition path yet.
    NotImplemented { message: String },
}

/// Message returned for map place URLs.
pub const MAP_PLACE_MESSAGE: &str =
    "Map place analysis is not available yet. Use an app store listing URL instead.";

/// Dispatch acquisition on the classified source type.
///
/// Store listings fetch metadata, then at most `count` reviews (newest
/// first). Map places return [`Acquisition::NotImplemented`] without any
/// network call.
///
/// # Errors
///
/// - [`PipelineError::Validation`] for an unknown source type or a store
///   listing without an app id. No request is sent in either case.
/// - [`PipelineError::UpstreamUnavailable`] if the review source fails.
pub async fn acquire(
    source: &dyn ReviewSource,
    brand_url: &str,
    source_type: SourceType,
    count: u32,
) -> Result<Acquisition, PipelineError> {
    match source_type {
        SourceType::StoreApp => {
            let app_id = extract_app_id(brand_url).ok_or_else(|| {
                PipelineError::validation("store listing URL is missing the app id")
            })?;
            let brand = fetch_app(source, &app_id, count)
                .await
                .map_err(|e| PipelineError::upstream(Stage::Acquire, e))?;
            Ok(Acquisition::Acquired(brand))
        }
        SourceType::MapPlace => {
            let place = extract_place_token(brand_url);
            tracing::info!(place = ?place, "map place acquisition not implemented");
            Ok(Acquisition::NotImplemented {
                message: MAP_PLACE_MESSAGE.to_string(),
            })
        }
        SourceType::Unknown => Err(PipelineError::validation("unsupported brand URL")),
    }
}

async fn fetch_app(
    source: &dyn ReviewSource,
    app_id: &str,
    count: u32,
) -> Result<AcquiredBrand, SourceError> {
    let metadata = source.app_metadata(app_id).await?;
    let mut reviews = source.recent_reviews(app_id, count).await?;
    reviews.truncate(usize::try_from(count).unwrap_or(usize::MAX));

    tracing::debug!(
        app_id,
        requested = count,
        received = reviews.len(),
        "acquired reviews"
    );

    Ok(AcquiredBrand {
        app_id: app_id.to_string(),
        metadata,
        reviews,
    })
}
