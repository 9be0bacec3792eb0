use axum::extract::State;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Role;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Message};
use crate::services::session_service::LoginResponse;
use crate::services::SessionService;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SuperadminLoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// POST /auth/admin/login - organization admin sign-in
pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AdminLoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = SessionService::new(&state)
        .admin_login(&payload.email, &payload.password)
        .await?;
    Ok(ApiResponse::success(response))
}

/// POST /auth/superadmin/login - accepts username or email
pub async fn superadmin_login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SuperadminLoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = SessionService::new(&state)
        .superadmin_login(&payload.username_or_email, &payload.password)
        .await?;
    Ok(ApiResponse::success(response))
}

/// POST /auth/password/forgot - same answer whether or not the account exists
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> ApiResult<Message> {
    SessionService::new(&state)
        .forgot_password(&payload.email, payload.role)
        .await?;
    Ok(ApiResponse::message(
        "If an account with that email exists, a reset link has been sent",
    ))
}

/// POST /auth/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Message> {
    SessionService::new(&state)
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(ApiResponse::message("Password has been reset, you can now log in"))
}
