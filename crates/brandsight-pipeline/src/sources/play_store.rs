//! HTTP client for the store review gateway.
//!
//! The gateway exposes two JSON endpoints:
//!
//! - `GET {base}/apps/{id}` returns `{ "title", "icon", "description" }`
//! - `GET {base}/apps/{id}/reviews?sort=newest&num=N` returns
//!   `{ "data": [{ "userName", "score", "text" }] }`

use std::time::Duration;

use async_trait::async_trait;
use brandsight_core::ReviewItem;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{AppMetadata, ReviewSource};
use crate::error::SourceError;

const ANONYMOUS_USER: &str = "Anonymous";

#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    data: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReview {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    text: Option<String>,
}

/// Why a gateway review was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    NoText,
    NoScore,
}

impl RawReview {
    fn into_item(self) -> Result<ReviewItem, Skip> {
        let text = self.text.map(|t| t.trim().to_string()).unwrap_or_default();
        if text.is_empty() {
            return Err(Skip::NoText);
        }
        let rating = score_to_rating(self.score).ok_or(Skip::NoScore)?;
        let user = self
            .user_name
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| ANONYMOUS_USER.to_string());
        Ok(ReviewItem::new(user, rating, text))
    }
}

/// Star rating for a gateway score. `None` when the score is absent or not finite.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn score_to_rating(score: Option<f64>) -> Option<u8> {
    score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(1.0, 5.0) as u8)
}

/// Review gateway client.
///
/// Use [`PlayStoreClient::new`] with the configured gateway URL, or point
/// [`PlayStoreClient::with_base_url`] at a mock server in tests.
pub struct PlayStoreClient {
    client: Client,
    base_url: Url,
}

impl PlayStoreClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Self::with_client(client, base_url)
    }

    /// Creates a client with default timeouts against a custom base URL.
    ///
    /// # Errors
    ///
    /// Same as [`PlayStoreClient::new`].
    pub fn with_base_url(base_url: &str) -> Result<Self, SourceError> {
        Self::new(base_url, 30, "brandsight/0.1 (review-analysis)")
    }

    fn with_client(client: Client, base_url: &str) -> Result<Self, SourceError> {
        let invalid = |reason: String| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    fn app_url(&self, app_id: &str, tail: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push("apps")
            .push(app_id)
            .extend(tail);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        app_id: &str,
    ) -> Result<T, SourceError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::AppNotFound {
                app_id: app_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl ReviewSource for PlayStoreClient {
    async fn app_metadata(&self, app_id: &str) -> Result<AppMetadata, SourceError> {
        let url = self.app_url(app_id, &[])?;
        self.get_json(url, app_id).await
    }

    async fn recent_reviews(
        &self,
        app_id: &str,
        count: u32,
    ) -> Result<Vec<ReviewItem>, SourceError> {
        let mut url = self.app_url(app_id, &["reviews"])?;
        url.query_pairs_mut()
            .append_pair("sort", "newest")
            .append_pair("num", &count.to_string());

        let response: ReviewsResponse = self.get_json(url, app_id).await?;
        let mut reviews = Vec::with_capacity(response.data.len());
        let (mut no_text, mut no_score) = (0usize, 0usize);
        for raw in response.data {
            match raw.into_item() {
                Ok(item) => reviews.push(item),
                Err(Skip::NoText) => no_text += 1,
                Err(Skip::NoScore) => no_score += 1,
            }
        }
        if no_text > 0 {
            tracing::debug!(app_id, dropped = no_text, "skipped reviews without text");
        }
        if no_score > 0 {
            tracing::warn!(app_id, dropped = no_score, "skipped reviews without a usable score");
        }
        Ok(reviews)
    }
}
