use axum::{extract::State, Extension, Json};
use brandsight_core::StoredReport;
use brandsight_pipeline::History;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiJson, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HistoryRequest {
    pub owner_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryResponse {
    pub count: usize,
    pub data: Vec<StoredReport>,
    pub meta: ResponseMeta,
}

/// POST /api/v1/history: every report an owner has, newest first.
pub(super) async fn list_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<HistoryRequest>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state
        .pipeline
        .history(&body.owner_id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    match history {
        History::Empty => Err(ApiError::new(
            req_id.0,
            "empty_result",
            "no reports found for this owner",
        )),
        History::Reports(data) => Ok(Json(HistoryResponse {
            count: data.len(),
            data,
            meta: ResponseMeta::new(req_id.0),
        })),
    }
}
