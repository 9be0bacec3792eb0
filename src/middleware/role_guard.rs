use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::{admin, organization, superadmin};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Admin account re-read from the database for this request
#[derive(Clone, Debug, Serialize)]
pub struct ValidatedAdmin {
    pub id: i64,
    pub organization_id: i64,
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidatedSuperadmin {
    pub id: i64,
    pub username: String,
    pub email: String,
}

fn auth_user(request: &Request) -> Result<AuthUser, ApiError> {
    request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required"))
}

/// Role check on the claim first, then the admin and its organization must
/// still exist and be active.
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let user = auth_user(&request)?;
    if user.role != Role::Admin {
        tracing::warn!(account_id = user.id, role = %user.role, "Admin route refused");
        return Err(ApiError::forbidden("Admin access required"));
    }

    let account = admin::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    if !account.is_active() {
        tracing::warn!(admin_id = account.id, "Inactive admin attempted access");
        return Err(ApiError::forbidden("Account is inactive"));
    }

    let org = organization::find_by_id(&state.pool, account.organization_id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Organization no longer exists"))?;

    if !org.is_active() {
        tracing::warn!(admin_id = account.id, organization_id = org.id, "Admin of inactive organization attempted access");
        return Err(ApiError::forbidden("Organization is inactive"));
    }

    request.extensions_mut().insert(ValidatedAdmin {
        id: account.id,
        organization_id: account.organization_id,
        email: account.email,
    });

    Ok(next.run(request).await)
}

pub async fn require_superadmin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = auth_user(&request)?;
    if user.role != Role::Superadmin {
        tracing::warn!(account_id = user.id, role = %user.role, "Superadmin route refused");
        return Err(ApiError::forbidden("Superadmin access required"));
    }

    let account = superadmin::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    request.extensions_mut().insert(ValidatedSuperadmin {
        id: account.id,
        username: account.username,
        email: account.email,
    });

    Ok(next.run(request).await)
}
