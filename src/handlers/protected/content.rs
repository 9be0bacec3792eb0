// Programs, volunteers, news and highlights owned by the admin's organization.
// Program creation and edits go through submissions.

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::highlight::Highlight;
use crate::database::models::news::News;
use crate::database::models::program::Program;
use crate::database::models::volunteer::VolunteerListing;
use crate::handlers::StatusBody;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Message, ValidatedAdmin};
use crate::services::highlight_service::HighlightInput;
use crate::services::news_service::NewsInput;
use crate::services::{HighlightService, NewsService, ProgramService};

/// GET /api/admin/programs
pub async fn programs(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<Vec<Program>> {
    Ok(ApiResponse::success(
        ProgramService::new(&state).list_for_organization(admin.organization_id).await?,
    ))
}

/// DELETE /api/admin/programs/:id
pub async fn delete_program(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    ProgramService::new(&state).delete(admin.organization_id, id).await?;
    Ok(ApiResponse::message("Program deleted"))
}

/// GET /api/admin/volunteers
pub async fn volunteers(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<Vec<VolunteerListing>> {
    Ok(ApiResponse::success(
        ProgramService::new(&state).list_volunteers(admin.organization_id).await?,
    ))
}

/// PUT /api/admin/volunteers/:id/status - approve or decline a pending application
pub async fn volunteer_status(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<StatusBody>,
) -> ApiResult<VolunteerListing> {
    let decided = ProgramService::new(&state)
        .decide_volunteer(admin.organization_id, id, payload.status.trim())
        .await?;
    Ok(ApiResponse::success(decided))
}

/// GET /api/admin/news
pub async fn news(State(state): State<AppState>, Extension(admin): Extension<ValidatedAdmin>) -> ApiResult<Vec<News>> {
    Ok(ApiResponse::success(
        NewsService::new(&state).list_for_organization(admin.organization_id).await?,
    ))
}

/// POST /api/admin/news
pub async fn create_news(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    ApiJson(payload): ApiJson<NewsInput>,
) -> ApiResult<News> {
    Ok(ApiResponse::created(
        NewsService::new(&state).create(admin.organization_id, payload).await?,
    ))
}

/// GET /api/admin/news/:id
pub async fn news_item(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<News> {
    Ok(ApiResponse::success(NewsService::new(&state).get(admin.organization_id, id).await?))
}

/// PUT /api/admin/news/:id
pub async fn update_news(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<NewsInput>,
) -> ApiResult<News> {
    Ok(ApiResponse::success(
        NewsService::new(&state).update(admin.organization_id, id, payload).await?,
    ))
}

/// DELETE /api/admin/news/:id
pub async fn delete_news(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    NewsService::new(&state).delete(admin.organization_id, id).await?;
    Ok(ApiResponse::message("News deleted"))
}

/// GET /api/admin/highlights
pub async fn highlights(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<Vec<Highlight>> {
    Ok(ApiResponse::success(
        HighlightService::new(&state).list_for_organization(admin.organization_id).await?,
    ))
}

/// POST /api/admin/highlights
pub async fn create_highlight(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    ApiJson(payload): ApiJson<HighlightInput>,
) -> ApiResult<Highlight> {
    Ok(ApiResponse::created(
        HighlightService::new(&state).create(admin.organization_id, payload).await?,
    ))
}

/// GET /api/admin/highlights/:id
pub async fn highlight(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<Highlight> {
    Ok(ApiResponse::success(
        HighlightService::new(&state).get(admin.organization_id, id).await?,
    ))
}

/// PUT /api/admin/highlights/:id
pub async fn update_highlight(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<HighlightInput>,
) -> ApiResult<Highlight> {
    Ok(ApiResponse::success(
        HighlightService::new(&state).update(admin.organization_id, id, payload).await?,
    ))
}

/// DELETE /api/admin/highlights/:id
pub async fn delete_highlight(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    HighlightService::new(&state).delete(admin.organization_id, id).await?;
    Ok(ApiResponse::message("Highlight deleted"))
}
