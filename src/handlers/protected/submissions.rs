use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::submission::SubmissionListing;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, ValidatedAdmin};
use crate::services::submission_service::{NewProposal, SubmissionDetail};
use crate::services::SubmissionService;

#[derive(Debug, Deserialize)]
pub struct CreateSubmission {
    pub section: String,
    pub record_id: Option<i64>,
    pub proposed_data: Value,
}

/// GET /api/admin/submissions
pub async fn list(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<Vec<SubmissionListing>> {
    Ok(ApiResponse::success(
        SubmissionService::new(&state).list_for_organization(admin.organization_id).await?,
    ))
}

/// POST /api/admin/submissions - propose an organization or program change
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    ApiJson(payload): ApiJson<CreateSubmission>,
) -> ApiResult<SubmissionDetail> {
    let detail = SubmissionService::new(&state)
        .submit(
            admin.id,
            admin.organization_id,
            NewProposal {
                section: payload.section,
                record_id: payload.record_id,
                proposed_data: payload.proposed_data,
            },
        )
        .await?;
    Ok(ApiResponse::created(detail))
}

/// GET /api/admin/submissions/:id - includes the field diff
pub async fn get(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<SubmissionDetail> {
    Ok(ApiResponse::success(
        SubmissionService::new(&state).get(id, Some(admin.organization_id)).await?,
    ))
}

/// PUT /api/admin/submissions/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<SubmissionDetail> {
    Ok(ApiResponse::success(
        SubmissionService::new(&state)
            .cancel(admin.id, admin.organization_id, id)
            .await?,
    ))
}
