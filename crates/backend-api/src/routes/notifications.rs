use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use voltchat_push::SubscriptionInfo;

use crate::{routes::auth::SuccessResponse, util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: Option<String>,
    /// Whether the server can actually deliver notifications.
    pub enabled: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    #[schema(value_type = Object)]
    pub subscription: SubscriptionInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnsubscribeResponse {
    pub success: bool,
    pub removed: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
}

#[utoipa::path(
    get,
    path = "/api/notifications/vapid-public-key",
    tag = "Notifications",
    responses(
        (status = 200, description = "Application server key for PushManager.subscribe", body = VapidKeyResponse)
    )
)]
pub async fn vapid_public_key(State(state): State<AppState>) -> Json<VapidKeyResponse> {
    let push = state.push();
    Json(VapidKeyResponse {
        public_key: push.public_key().map(str::to_string),
        enabled: push.is_enabled(),
    })
}

#[utoipa::path(
    post,
    path = "/api/notifications/subscribe",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscription stored, replacing any previous one", body = SuccessResponse),
        (status = 400, description = "Endpoint or keys invalid", body = crate::error::ErrorResponse)
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubscribeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    state.push().subscribe(&user.email, payload.subscription).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/subscribe",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Subscription removed if there was one", body = UnsubscribeResponse)
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UnsubscribeResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let removed = state.push().unsubscribe(&user.email).await;
    Ok(Json(UnsubscribeResponse {
        success: true,
        removed,
    }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/send",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Delivered to every other subscriber", body = SendNotificationResponse),
        (status = 400, description = "Message missing", body = crate::error::ErrorResponse),
        (status = 503, description = "Push delivery is not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    if !state.push().is_enabled() {
        return Err(ApiError::service_unavailable(
            "Push notifications are not configured",
        ));
    }

    let text = payload.message.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }

    let sender_name = payload
        .sender_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&user.display_name);

    let notification = state.push().new_message_payload(sender_name, text);
    let report = state
        .push()
        .broadcast(&notification, Some(&user.email))
        .await?;

    info!(
        sender = %user.username,
        sent = report.attempted,
        failed = report.failed,
        "notification sent"
    );

    Ok(Json(SendNotificationResponse {
        success: true,
        sent: report.attempted,
        failed: report.failed,
    }))
}
