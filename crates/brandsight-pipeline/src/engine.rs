//! Sentiment analysis engine boundary.
//!
//! The engine receives the acquired brand and its reviews and returns report
//! content: per-review sentiment, the overall distribution, keywords, and
//! suggestions. [`HttpSentimentEngine`] posts to `{base}/analyze`.

use std::time::Duration;

use async_trait::async_trait;
use brandsight_core::{ReportContent, ReviewItem, SentimentDistribution, SourceType};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Longest engine error body carried into an [`EngineError`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Everything the engine needs to analyse one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub owner_id: String,
    pub source_type: SourceType,
    pub title: String,
    pub icon: String,
    pub description: String,
    pub reviews: Vec<ReviewItem>,
}

#[async_trait]
pub trait SentimentEngine: Send + Sync {
    /// Analyse the request and return report content for `request.owner_id`.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ReportContent, EngineError>;
}

#[derive(Serialize)]
struct EngineRequestBody<'a> {
    #[serde(flatten)]
    request: &'a AnalysisRequest,
    /// Older engine builds read the owner from `uid`.
    uid: &'a str,
}

/// Wire shape of a successful engine reply. `title`, `description`, `icon`
/// and `success` are required; a reply missing any of them is a deserialize
/// error, not an empty report.
#[derive(Debug, Deserialize)]
struct EngineResponse {
    title: String,
    description: String,
    icon: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    sentiment_distribution: SentimentDistribution,
    #[serde(default)]
    analyzed_reviews: Vec<ReviewItem>,
    #[serde(default)]
    suggestions: Vec<String>,
    success: bool,
}

impl EngineResponse {
    /// The report is always attributed to the requesting owner. Review
    /// ratings outside `1..=5` are clamped into range.
    fn into_content(self, request: &AnalysisRequest) -> ReportContent {
        let mut analyzed_reviews = self.analyzed_reviews;
        for review in &mut analyzed_reviews {
            if !(1..=5).contains(&review.rating) {
                tracing::warn!(
                    owner_id = %request.owner_id,
                    user = %review.user,
                    rating = review.rating,
                    "engine returned a rating outside 1..=5; clamping"
                );
                review.rating = review.rating.clamp(1, 5);
            }
        }
        ReportContent {
            owner_id: request.owner_id.clone(),
            title: self.title,
            description: self.description,
            icon: self.icon,
            keywords: self.keywords,
            sentiment_distribution: self.sentiment_distribution,
            analyzed_reviews,
            suggestions: self.suggestions,
            success: self.success,
        }
    }
}

/// HTTP client for the analysis engine.
pub struct HttpSentimentEngine {
    client: Client,
    analyze_url: Url,
}

impl HttpSentimentEngine {
    /// # Errors
    ///
    /// Returns [`EngineError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`EngineError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let analyze_url = Url::parse(&normalised)
            .and_then(|u| u.join("analyze"))
            .map_err(|e| EngineError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            analyze_url,
        })
    }

    /// Creates an engine client with default timeouts (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`HttpSentimentEngine::new`].
    pub fn with_base_url(base_url: &str) -> Result<Self, EngineError> {
        Self::new(base_url, 60, "brandsight/0.1 (review-analysis)")
    }
}

#[async_trait]
impl SentimentEngine for HttpSentimentEngine {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ReportContent, EngineError> {
        let body = EngineRequestBody {
            request,
            uid: &request.owner_id,
        };
        let response = self
            .client
            .post(self.analyze_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(EngineError::UnexpectedStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: EngineResponse =
            serde_json::from_str(&text).map_err(EngineError::Deserialize)?;
        Ok(parsed.into_content(request))
    }
}
