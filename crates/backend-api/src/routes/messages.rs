use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use voltchat_chats::Message;

use crate::{
    routes::servers::forbid_non_members,
    state::participant,
    util::{require_bearer, server_or_general},
    ApiError, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MessagesQuery {
    /// Defaults to the general server.
    pub server_id: Option<String>,
    /// Only messages with a timestamp strictly greater than this.
    pub since: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ServerQuery {
    pub server_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PollQuery {
    pub server_id: Option<String>,
    pub last_message_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Message>,
    pub online_users: Vec<String>,
    pub has_new: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub server_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub message: Message,
    pub online_users: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearMessagesResponse {
    pub success: bool,
    pub cleared: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PollResponse {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Message>,
}

#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(MessagesQuery),
    responses(
        (status = 200, description = "Feed for the server and who is online", body = MessagesResponse),
        (status = 403, description = "Private server the caller does not belong to", body = crate::error::ErrorResponse),
        (status = 404, description = "Server not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let server_id = server_or_general(query.server_id);

    state
        .chats()
        .can_read(&server_id, &user.email)
        .await
        .map_err(forbid_non_members)?;

    state.chats().touch(&server_id, &user.username).await;
    let messages = state.chats().messages_since(&server_id, query.since).await?;
    let online_users = state.chats().online_users(&server_id).await;

    Ok(Json(MessagesResponse {
        success: true,
        has_new: !messages.is_empty(),
        messages,
        online_users,
    }))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    request_body = PostMessageRequest,
    responses(
        (status = 200, description = "Message stored and published", body = PostMessageResponse),
        (status = 400, description = "Empty or oversized text", body = crate::error::ErrorResponse),
        (status = 403, description = "Private server the caller does not belong to", body = crate::error::ErrorResponse)
    )
)]
pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let server_id = server_or_general(payload.server_id);

    state
        .chats()
        .can_read(&server_id, &user.email)
        .await
        .map_err(forbid_non_members)?;

    let message = state
        .chats()
        .post_message(&server_id, &participant(&user), &payload.text)
        .await?;
    let online_users = state.chats().online_users(&server_id).await;

    if state.push().notify_on_message() {
        let push = state.push().clone();
        let sender_email = user.email.clone();
        let notification = push.new_message_payload(&message.display_name, &message.text);
        tokio::spawn(async move {
            match push.broadcast(&notification, Some(&sender_email)).await {
                Ok(report) => info!(
                    attempted = report.attempted,
                    failed = report.failed,
                    "message notification dispatched"
                ),
                Err(error) => warn!(%error, "message notification failed"),
            }
        });
    }

    Ok(Json(PostMessageResponse {
        success: true,
        message,
        online_users,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(ServerQuery),
    responses(
        (status = 200, description = "Feed emptied", body = ClearMessagesResponse),
        (status = 403, description = "Caller is not an administrator", body = crate::error::ErrorResponse),
        (status = 404, description = "Server not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn clear_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ServerQuery>,
) -> Result<Json<ClearMessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    if !state.is_admin(&user) {
        return Err(ApiError::forbidden("Only administrators can clear messages"));
    }

    let server_id = server_or_general(query.server_id);
    let cleared = state.chats().clear(&server_id).await?;
    info!(server_id = %server_id, admin = %user.username, cleared, "feed cleared by admin");

    Ok(Json(ClearMessagesResponse {
        success: true,
        cleared,
    }))
}

#[utoipa::path(
    get,
    path = "/api/poll",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(PollQuery),
    responses(
        (status = 200, description = "Messages after the last one the client has", body = PollResponse),
        (status = 403, description = "Private server the caller does not belong to", body = crate::error::ErrorResponse)
    )
)]
pub async fn poll_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PollQuery>,
) -> Result<Json<PollResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;
    let server_id = server_or_general(query.server_id);

    state
        .chats()
        .can_read(&server_id, &user.email)
        .await
        .map_err(forbid_non_members)?;

    state.chats().touch(&server_id, &user.username).await;
    let last_message_id = query
        .last_message_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let messages = state
        .chats()
        .messages_after(&server_id, last_message_id)
        .await?;

    Ok(Json(PollResponse { messages }))
}
