// Accounts, organizations and newsletter subscribers across the platform

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::admin::AdminListing;
use crate::database::models::organization::Organization;
use crate::database::models::subscriber::Subscriber;
use crate::handlers::StatusBody;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Message, ValidatedSuperadmin};
use crate::services::organization_service::{CreatedAdmin, NewAdminAccount};
use crate::services::{OrganizationService, SubscriptionService};

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub org_acronym: String,
    pub org_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriberQuery {
    #[serde(default)]
    pub verified_only: bool,
}

/// GET /api/superadmin/admins
pub async fn admins(State(state): State<AppState>) -> ApiResult<Vec<AdminListing>> {
    Ok(ApiResponse::success(OrganizationService::new(&state).list_admins().await?))
}

/// POST /api/superadmin/admins - creates the organization and its admin together
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    ApiJson(payload): ApiJson<CreateAdminRequest>,
) -> ApiResult<CreatedAdmin> {
    let created = OrganizationService::new(&state)
        .create_admin(NewAdminAccount {
            org_acronym: payload.org_acronym,
            org_name: payload.org_name,
            email: payload.email,
            password: payload.password,
        })
        .await?;
    tracing::info!(superadmin_id = superadmin.id, admin_id = created.admin_id, "Admin created by superadmin");
    Ok(ApiResponse::created(created))
}

/// PUT /api/superadmin/admins/:id/status
pub async fn admin_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<StatusBody>,
) -> ApiResult<Message> {
    OrganizationService::new(&state)
        .set_admin_status(id, payload.status.trim())
        .await?;
    Ok(ApiResponse::message("Admin status updated"))
}

/// DELETE /api/superadmin/admins/:id
pub async fn delete_admin(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    OrganizationService::new(&state).delete_admin(id).await?;
    Ok(ApiResponse::message("Admin deleted"))
}

/// GET /api/superadmin/organizations
pub async fn organizations(State(state): State<AppState>) -> ApiResult<Vec<Organization>> {
    Ok(ApiResponse::success(OrganizationService::new(&state).list_all().await?))
}

/// PUT /api/superadmin/organizations/:id/status
pub async fn organization_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<StatusBody>,
) -> ApiResult<Organization> {
    Ok(ApiResponse::success(
        OrganizationService::new(&state).set_status(id, payload.status.trim()).await?,
    ))
}

/// DELETE /api/superadmin/organizations/:id
pub async fn delete_organization(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    OrganizationService::new(&state).delete(id).await?;
    Ok(ApiResponse::message("Organization deleted"))
}

/// GET /api/superadmin/subscribers?verified_only=
pub async fn subscribers(
    State(state): State<AppState>,
    Query(query): Query<SubscriberQuery>,
) -> ApiResult<Vec<Subscriber>> {
    Ok(ApiResponse::success(
        SubscriptionService::new(&state).list(query.verified_only).await?,
    ))
}

/// DELETE /api/superadmin/subscribers/:id
pub async fn delete_subscriber(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    SubscriptionService::new(&state).remove(id).await?;
    Ok(ApiResponse::message("Subscriber removed"))
}
