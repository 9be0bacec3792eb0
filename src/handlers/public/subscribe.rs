use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, Message};
use crate::services::subscription_service::SubscribeOutcome;
use crate::services::SubscriptionService;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub outcome: SubscribeOutcome,
    pub message: &'static str,
}

/// POST /subscribe - 201 for a new address, 200 when a pending address gets a fresh link
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubscribeRequest>,
) -> ApiResult<SubscribeResponse> {
    let outcome = SubscriptionService::new(&state).subscribe(&payload.email).await?;

    Ok(match outcome {
        SubscribeOutcome::Created => ApiResponse::with_status(
            SubscribeResponse {
                outcome,
                message: "Check your inbox to confirm your subscription",
            },
            StatusCode::CREATED,
        ),
        SubscribeOutcome::Resent => ApiResponse::success(SubscribeResponse {
            outcome,
            message: "A new confirmation link has been sent",
        }),
    })
}

/// GET /subscribe/confirm?token=
pub async fn confirm(State(state): State<AppState>, Query(query): Query<TokenQuery>) -> ApiResult<Message> {
    let subscriber = SubscriptionService::new(&state).confirm(&query.token).await?;
    Ok(ApiResponse::message(format!(
        "{} is now subscribed to FAITH CommUNITY updates",
        subscriber.email
    )))
}

/// GET /subscribe/unsubscribe?token=
pub async fn unsubscribe(State(state): State<AppState>, Query(query): Query<TokenQuery>) -> ApiResult<Message> {
    SubscriptionService::new(&state).unsubscribe(&query.token).await?;
    Ok(ApiResponse::message("You have been unsubscribed"))
}
