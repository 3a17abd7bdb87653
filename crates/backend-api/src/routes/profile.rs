use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use voltchat_auth::{ProfileUpdate, ThemeColors};

use crate::{routes::auth::UserResponse, util::require_bearer, ApiError, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl UpdateProfileRequest {
    fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            display_name: self.display_name,
            profile_picture: self.profile_picture,
            bio: self.bio,
            theme: self.theme,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ThemeColorsPayload {
    pub primary: String,
    pub background: String,
    pub surface: String,
    pub text: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateThemeRequest {
    #[serde(default)]
    pub name: String,
    pub colors: ThemeColorsPayload,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::for_state(user, &state),
    }))
}

#[utoipa::path(
    post,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid profile field", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let updated = state
        .authenticator()
        .update_profile(&user.id, payload.into_update())
        .await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::for_state(updated, &state),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/profile/picture",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Uploaded picture removed, generated avatar restored", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_picture(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let updated = state.authenticator().reset_profile_picture(&user.id).await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::for_state(updated, &state),
    }))
}

#[utoipa::path(
    post,
    path = "/api/profile/themes",
    tag = "Profile",
    security(("bearerAuth" = [])),
    request_body = CreateThemeRequest,
    responses(
        (status = 200, description = "Theme saved to the profile", body = ProfileResponse),
        (status = 400, description = "Invalid theme", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateThemeRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let colors = ThemeColors {
        primary: payload.colors.primary,
        background: payload.colors.background,
        surface: payload.colors.surface,
        text: payload.colors.text,
    };
    let (updated, _) = state
        .authenticator()
        .add_custom_theme(&user.id, &payload.name, colors)
        .await?;

    Ok(Json(ProfileResponse {
        user: UserResponse::for_state(updated, &state),
    }))
}
