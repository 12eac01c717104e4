use axum::{extract::State, Extension, Json};
use brandsight_core::{SourceType, StoredReport};
use brandsight_pipeline::{AnalysisOutcome, AnalyzeRequest};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiJson, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(super) enum AnalyzeData {
    Completed(StoredReport),
    NotImplemented {
        message: String,
        source_type: SourceType,
    },
}

impl From<AnalysisOutcome> for AnalyzeData {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Completed(report) => AnalyzeData::Completed(report),
            AnalysisOutcome::NotImplemented {
                message,
                source_type,
            } => AnalyzeData::NotImplemented {
                message,
                source_type,
            },
        }
    }
}

/// POST /api/v1/analyze: analyse a brand URL and store the report.
pub(super) async fn analyze_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let outcome = state
        .pipeline
        .analyze(&body)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: outcome.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
