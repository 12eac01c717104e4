use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use brandsight_core::Owner;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiJson, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterOwnerRequest {
    pub owner_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterOwnerResponse {
    pub owner_id: String,
    pub created: bool,
}

/// POST /api/v1/owners: register an owner id. Idempotent.
pub(super) async fn register_owner(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<RegisterOwnerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterOwnerResponse>>), ApiError> {
    let created = state
        .pipeline
        .register_owner(&body.owner_id, body.name.as_deref())
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    let status = if created {
        tracing::info!(owner_id = %body.owner_id.trim(), "owner registered");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ApiResponse {
            data: RegisterOwnerResponse {
                owner_id: body.owner_id.trim().to_owned(),
                created,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/owners/{id}: the registered owner and display name.
pub(super) async fn get_owner(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(owner_id): Path<String>,
) -> Result<Json<ApiResponse<Owner>>, ApiError> {
    let owner = state
        .pipeline
        .owner(&owner_id)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "owner not found"))?;

    Ok(Json(ApiResponse {
        data: owner,
        meta: ResponseMeta::new(req_id.0),
    }))
}
