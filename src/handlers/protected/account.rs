use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::organization::Organization;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Message, ValidatedAdmin};
use crate::services::session_service::LoginResponse;
use crate::services::{EmailChangeService, OrganizationService, SessionService};

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailChangeRequest {
    pub new_email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailChangeVerify {
    pub otp: String,
}

/// GET /api/admin/me
pub async fn me(State(state): State<AppState>, Extension(admin): Extension<ValidatedAdmin>) -> ApiResult<Value> {
    Ok(ApiResponse::success(SessionService::new(&state).admin_profile(admin.id).await?))
}

/// PUT /api/admin/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Message> {
    SessionService::new(&state)
        .change_password(Role::Admin, admin.id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(ApiResponse::message("Password updated"))
}

/// POST /api/admin/email-change/request - mails a code to the new address
pub async fn request_email_change(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    ApiJson(payload): ApiJson<EmailChangeRequest>,
) -> ApiResult<Message> {
    EmailChangeService::new(&state)
        .request(Role::Admin, admin.id, &payload.new_email, &payload.password)
        .await?;
    Ok(ApiResponse::message("A verification code was sent to the new email address"))
}

/// POST /api/admin/email-change/verify - returns a fresh token with the new email
pub async fn verify_email_change(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    ApiJson(payload): ApiJson<EmailChangeVerify>,
) -> ApiResult<LoginResponse> {
    let response = EmailChangeService::new(&state)
        .verify(Role::Admin, admin.id, &payload.otp)
        .await?;
    Ok(ApiResponse::success(response))
}

/// GET /api/admin/organization
pub async fn organization(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<Organization> {
    Ok(ApiResponse::success(
        OrganizationService::new(&state).get(admin.organization_id).await?,
    ))
}
