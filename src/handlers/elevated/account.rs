use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::superadmin::Superadmin;
use crate::handlers::protected::account::{ChangePasswordRequest, EmailChangeRequest, EmailChangeVerify};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Message, ValidatedSuperadmin};
use crate::services::session_service::LoginResponse;
use crate::services::{EmailChangeService, SessionService};

/// GET /api/superadmin/me
pub async fn me(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
) -> ApiResult<Superadmin> {
    Ok(ApiResponse::success(
        SessionService::new(&state).superadmin_profile(superadmin.id).await?,
    ))
}

/// PUT /api/superadmin/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Message> {
    SessionService::new(&state)
        .change_password(Role::Superadmin, superadmin.id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(ApiResponse::message("Password updated"))
}

/// POST /api/superadmin/email-change/request
pub async fn request_email_change(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    ApiJson(payload): ApiJson<EmailChangeRequest>,
) -> ApiResult<Message> {
    EmailChangeService::new(&state)
        .request(Role::Superadmin, superadmin.id, &payload.new_email, &payload.password)
        .await?;
    Ok(ApiResponse::message("A verification code was sent to the new email address"))
}

/// POST /api/superadmin/email-change/verify
pub async fn verify_email_change(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    ApiJson(payload): ApiJson<EmailChangeVerify>,
) -> ApiResult<LoginResponse> {
    let response = EmailChangeService::new(&state)
        .verify(Role::Superadmin, superadmin.id, &payload.otp)
        .await?;
    Ok(ApiResponse::success(response))
}
