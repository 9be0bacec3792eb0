use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::auth::Role;
use crate::database::models::notification::{self, Notification};
use crate::handlers::protected::notifications::MarkedRead;
use crate::middleware::{ApiResponse, ApiResult, Message, ValidatedSuperadmin};

/// GET /api/superadmin/notifications - includes broadcasts to all superadmins
pub async fn list(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::success(
        notification::list_for(&state.pool, Role::Superadmin, superadmin.id).await?,
    ))
}

/// PUT /api/superadmin/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    notification::mark_read(&state.pool, id, Role::Superadmin, superadmin.id).await?;
    Ok(ApiResponse::message("Notification marked as read"))
}

/// PUT /api/superadmin/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(superadmin): Extension<ValidatedSuperadmin>,
) -> ApiResult<MarkedRead> {
    let updated = notification::mark_all_read(&state.pool, Role::Superadmin, superadmin.id).await?;
    Ok(ApiResponse::success(MarkedRead { updated }))
}
