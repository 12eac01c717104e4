use axum::{
    extract::{Path, State},
    Extension, Json,
};
use brandsight_core::StoredReport;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// GET /api/v1/reports/{id}: one stored report.
pub(super) async fn get_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StoredReport>>, ApiError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("'{id}' is not a valid report id"),
        ));
    };

    let report = state
        .pipeline
        .report(id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "report not found"))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}
