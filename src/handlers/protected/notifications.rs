use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::notification::{self, Notification};
use crate::middleware::{ApiResponse, ApiResult, Message, ValidatedAdmin};

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

/// GET /api/admin/notifications
pub async fn list(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::success(
        notification::list_for(&state.pool, Role::Admin, admin.id).await?,
    ))
}

/// PUT /api/admin/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    notification::mark_read(&state.pool, id, Role::Admin, admin.id).await?;
    Ok(ApiResponse::message("Notification marked as read"))
}

/// PUT /api/admin/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(admin): Extension<ValidatedAdmin>,
) -> ApiResult<MarkedRead> {
    let updated = notification::mark_all_read(&state.pool, Role::Admin, admin.id).await?;
    Ok(ApiResponse::success(MarkedRead { updated }))
}
