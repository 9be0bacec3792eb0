use axum::extract::{Path, Query, State};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::highlight::Highlight;
use crate::database::models::news::NewsListing;
use crate::database::models::organization::Organization;
use crate::database::models::program::ProgramListing;
use crate::handlers::StatusQuery;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::organization_service::OrganizationProfile;
use crate::services::program_service::VolunteerApplication;
use crate::services::{HighlightService, NewsService, OrganizationService, ProgramService};

#[derive(Debug, Serialize)]
pub struct ApplicationReceived {
    pub id: i64,
    pub program_id: i64,
    pub status: &'static str,
}

/// GET /organizations - active organizations
pub async fn organizations(State(state): State<AppState>) -> ApiResult<Vec<Organization>> {
    Ok(ApiResponse::success(OrganizationService::new(&state).list_active().await?))
}

/// GET /organizations/:acronym - profile with programs, news and published highlights
pub async fn organization(
    State(state): State<AppState>,
    Path(acronym): Path<String>,
) -> ApiResult<OrganizationProfile> {
    Ok(ApiResponse::success(
        OrganizationService::new(&state).public_profile(&acronym).await?,
    ))
}

/// GET /programs?status=
pub async fn programs(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Vec<ProgramListing>> {
    Ok(ApiResponse::success(
        ProgramService::new(&state).list_public(query.status.as_deref()).await?,
    ))
}

/// GET /programs/:id
pub async fn program(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ProgramListing> {
    Ok(ApiResponse::success(ProgramService::new(&state).get_public(id).await?))
}

/// POST /programs/:id/volunteers - volunteer sign-up
pub async fn apply(
    State(state): State<AppState>,
    Path(program_id): Path<i64>,
    ApiJson(application): ApiJson<VolunteerApplication>,
) -> ApiResult<ApplicationReceived> {
    let id = ProgramService::new(&state).apply(program_id, application).await?;
    Ok(ApiResponse::created(ApplicationReceived {
        id,
        program_id,
        status: "pending",
    }))
}

/// GET /news
pub async fn news(State(state): State<AppState>) -> ApiResult<Vec<NewsListing>> {
    Ok(ApiResponse::success(NewsService::new(&state).list_public().await?))
}

/// GET /highlights
pub async fn highlights(State(state): State<AppState>) -> ApiResult<Vec<Highlight>> {
    Ok(ApiResponse::success(HighlightService::new(&state).list_published().await?))
}
