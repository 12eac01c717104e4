//! Shared stand-ins for route tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use brandsight_core::{ReportContent, ReviewItem, Sentiment, SentimentDistribution};
use brandsight_pipeline::{
    AnalysisRequest, AppMetadata, EngineError, MemoryReportStore, Pipeline, ReportStore,
    ReviewSource, SentimentEngine, SourceError,
};

use super::{build_app, AppState};
use crate::middleware::{AnalyzeQuota, AuthState};

pub(crate) const OWNER: &str = "owner-1";
pub(crate) const TOKEN: &str = "secret";

/// Serves a fixed listing with as many reviews as requested.
pub(crate) struct FixedSource;

#[async_trait]
impl ReviewSource for FixedSource {
    async fn app_metadata(&self, app_id: &str) -> Result<AppMetadata, SourceError> {
        if app_id == "com.missing.app" {
            return Err(SourceError::AppNotFound {
                app_id: app_id.to_string(),
            });
        }
        Ok(AppMetadata {
            title: "Spotify: Music and Podcasts".to_string(),
            icon: "https://cdn.example.com/spotify.png".to_string(),
            description: "Listen to songs and podcasts.".to_string(),
        })
    }

    async fn recent_reviews(
        &self,
        _app_id: &str,
        count: u32,
    ) -> Result<Vec<ReviewItem>, SourceError> {
        Ok((0..count)
            .map(|i| ReviewItem::new(format!("user{i}"), 4, format!("review {i}")))
            .collect())
    }
}

/// Labels every review negative, or fails when `fail` is set.
#[derive(Default)]
pub(crate) struct TestEngine {
    pub fail: bool,
}

#[async_trait]
impl SentimentEngine for TestEngine {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ReportContent, EngineError> {
        if self.fail {
            return Err(EngineError::UnexpectedStatus {
                status: 500,
                body: "model not loaded".to_string(),
            });
        }
        let analyzed_reviews = request
            .reviews
            .iter()
            .cloned()
            .map(|mut r| {
                r.sentiment = Some(Sentiment::Negative);
                r.confidence = Some(0.8);
                r
            })
            .collect();
        Ok(ReportContent {
            owner_id: request.owner_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            icon: request.icon.clone(),
            keywords: vec!["crash".to_string()],
            sentiment_distribution: SentimentDistribution {
                negative: 100.0,
                neutral: 0.0,
                positive: 0.0,
            },
            analyzed_reviews,
            suggestions: vec!["Fix the crash on launch.".to_string()],
            success: true,
        })
    }
}

/// App with an empty in-memory store. An empty `api_keys` disables auth.
pub(crate) fn test_app(
    engine: Arc<dyn SentimentEngine>,
    api_keys: &str,
) -> (Router, Arc<MemoryReportStore>) {
    test_app_with_quota(engine, api_keys, AnalyzeQuota::per_hour(1_000))
}

pub(crate) fn test_app_with_quota(
    engine: Arc<dyn SentimentEngine>,
    api_keys: &str,
    quota: AnalyzeQuota,
) -> (Router, Arc<MemoryReportStore>) {
    let store = Arc::new(MemoryReportStore::new());
    let pipeline = Pipeline::new(Arc::new(FixedSource), engine, store.clone());
    let auth = AuthState::from_keys(api_keys, true).expect("auth");
    let app = build_app(AppState { pipeline }, auth, quota);
    (app, store)
}

/// [`test_app`] with [`OWNER`] registered and auth on for [`TOKEN`].
pub(crate) async fn seeded_app(engine: Arc<dyn SentimentEngine>) -> (Router, Arc<MemoryReportStore>) {
    let (app, store) = test_app(engine, TOKEN);
    store.register_owner(OWNER, None).await.expect("register owner");
    (app, store)
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn post_json(uri: &str, body: &serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// POST an arbitrary body with the test token.
pub(crate) fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_owned()))
        .expect("request")
}

pub(crate) async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}
