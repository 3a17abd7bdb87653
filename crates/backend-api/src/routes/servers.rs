use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use voltchat_chats::{ChatError, ServerMember, ServerView};

use crate::{state::participant, util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ServersResponse {
    #[schema(value_type = Vec<Object>)]
    pub servers: Vec<ServerView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServerResponse {
    #[schema(value_type = Object)]
    pub server: ServerView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MembersResponse {
    #[schema(value_type = Vec<Object>)]
    pub members: Vec<ServerMember>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveServerResponse {
    pub success: bool,
    /// True when the owner left and the server was removed.
    pub deleted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinServerRequest {
    #[serde(default)]
    pub invite_code: String,
}

#[utoipa::path(
    get,
    path = "/api/servers",
    tag = "Servers",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Public servers and the caller's memberships", body = ServersResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_servers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ServersResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let servers = state.chats().list_servers(&user.email).await;
    Ok(Json(ServersResponse { servers }))
}

#[utoipa::path(
    post,
    path = "/api/servers",
    tag = "Servers",
    security(("bearerAuth" = [])),
    request_body = CreateServerRequest,
    responses(
        (status = 200, description = "Private server created, caller is owner", body = ServerResponse),
        (status = 400, description = "Invalid name or description", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_server(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateServerRequest>,
) -> Result<Json<ServerResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let server = state
        .chats()
        .create_server(
            &payload.name,
            payload.description.as_deref(),
            &participant(&user),
        )
        .await?;

    Ok(Json(ServerResponse { server }))
}

#[utoipa::path(
    post,
    path = "/api/servers/join",
    tag = "Servers",
    security(("bearerAuth" = [])),
    request_body = JoinServerRequest,
    responses(
        (status = 200, description = "Joined as member", body = ServerResponse),
        (status = 400, description = "Already a member", body = crate::error::ErrorResponse),
        (status = 404, description = "Invalid invite code", body = crate::error::ErrorResponse)
    )
)]
pub async fn join_server(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<JoinServerRequest>,
) -> Result<Json<ServerResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    if payload.invite_code.trim().is_empty() {
        return Err(ApiError::bad_request("Invite code is required"));
    }

    let server = state
        .chats()
        .join_server(&payload.invite_code, &participant(&user))
        .await?;

    Ok(Json(ServerResponse { server }))
}

#[utoipa::path(
    get,
    path = "/api/servers/{server_id}",
    tag = "Servers",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Server with live member count", body = ServerResponse),
        (status = 404, description = "Server not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_server(
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<Json<ServerResponse>, ApiError> {
    let server = state.chats().get_server(&server_id).await?;
    Ok(Json(ServerResponse { server }))
}

#[utoipa::path(
    delete,
    path = "/api/servers/{server_id}",
    tag = "Servers",
    security(("bearerAuth" = [])),
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Left the server", body = LeaveServerResponse),
        (status = 400, description = "Not a member, or the general server", body = crate::error::ErrorResponse),
        (status = 404, description = "Server not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn leave_server(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(server_id): Path<String>,
) -> Result<Json<LeaveServerResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let deleted = state.chats().leave_server(&server_id, &user.email).await?;
    Ok(Json(LeaveServerResponse {
        success: true,
        deleted,
    }))
}

#[utoipa::path(
    get,
    path = "/api/servers/{server_id}/members",
    tag = "Servers",
    security(("bearerAuth" = [])),
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Members in join order", body = MembersResponse),
        (status = 403, description = "Private server the caller does not belong to", body = crate::error::ErrorResponse),
        (status = 404, description = "Server not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(server_id): Path<String>,
) -> Result<Json<MembersResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    state
        .chats()
        .can_read(&server_id, &user.email)
        .await
        .map_err(forbid_non_members)?;

    let members = state.chats().members(&server_id).await?;
    Ok(Json(MembersResponse { members }))
}

/// Reading a private server without membership is a 403, not the 400 that leaving one gives.
pub(crate) fn forbid_non_members(error: ChatError) -> ApiError {
    match error {
        ChatError::NotMember => ApiError::forbidden("You are not a member of this server"),
        other => other.into(),
    }
}
