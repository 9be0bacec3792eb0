use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::submission::SubmissionListing;
use crate::handlers::StatusQuery;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, ValidatedSuperadmin};
use crate::services::submission_service::SubmissionDetail;
use crate::services::SubmissionService;

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub remarks: String,
}

/// GET /api/superadmin/submissions?status=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Vec<SubmissionListing>> {
    Ok(ApiResponse::success(
        SubmissionService::new(&state).list(query.status.as_deref()).await?,
    ))
}

/// GET /api/superadmin/submissions/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<SubmissionDetail> {
    Ok(ApiResponse::success(SubmissionService::new(&state).get(id, None).await?))
}

/// PUT /api/superadmin/submissions/:id/approve - applies the proposal
pub async fn approve(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    Path(id): Path<i64>,
) -> ApiResult<SubmissionDetail> {
    Ok(ApiResponse::success(
        SubmissionService::new(&state).approve(superadmin.id, id).await?,
    ))
}

/// PUT /api/superadmin/submissions/:id/reject - remarks are required
pub async fn reject(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<RejectRequest>,
) -> ApiResult<SubmissionDetail> {
    Ok(ApiResponse::success(
        SubmissionService::new(&state)
            .reject(superadmin.id, id, &payload.remarks)
            .await?,
    ))
}
