use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub username: String,
    pub display_name: String,
    pub profile_picture: String,
    pub bio: String,
    /// Earliest server membership, or account creation, in epoch milliseconds.
    pub join_date: i64,
    pub server_count: usize,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicUserResponse {
    pub user: PublicUser,
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Username, case-insensitive")),
    responses(
        (status = 200, description = "Public profile", body = PublicUserResponse),
        (status = 400, description = "Username missing", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicUserResponse>, ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }

    let profile = state.authenticator().public_profile_seed(&username).await;
    let stats = state.chats().membership_stats(&profile.username).await;

    let is_admin = match profile.email.as_deref() {
        Some(_) => state
            .authenticator()
            .find_by_username(&profile.username)
            .await
            .is_some_and(|user| state.is_admin(&user)),
        None => false,
    };

    Ok(Json(PublicUserResponse {
        user: PublicUser {
            join_date: stats
                .first_joined_at
                .unwrap_or_else(|| profile.created_at.timestamp_millis()),
            server_count: stats.server_count,
            is_admin,
            username: profile.username,
            display_name: profile.display_name,
            profile_picture: profile.profile_picture,
            bio: profile.bio,
        },
    }))
}
