use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use voltchat_auth::{AuthSession, User};

use crate::{util::require_bearer, ApiError, AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: UserResponse) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
            user,
        }
    }
}

/// The signed-in user as the web client stores it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub profile_picture: String,
    pub custom_profile_picture: Option<String>,
    pub bio: String,
    pub theme: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub custom_themes: Vec<voltchat_auth::CustomTheme>,
    pub is_guest: bool,
    pub is_admin: bool,
}

impl UserResponse {
    pub fn new(user: User, is_admin: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
            profile_picture: user.profile_picture,
            custom_profile_picture: user.custom_profile_picture,
            bio: user.bio,
            theme: user.theme,
            custom_themes: user.custom_themes,
            is_guest: false,
            is_admin,
        }
    }

    pub fn for_state(user: User, state: &AppState) -> Self {
        let is_admin = state.is_admin(&user);
        Self::new(user, is_admin)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, registering the email on first use", body = SessionResponse),
        (status = 400, description = "Email or password missing", body = crate::error::ErrorResponse),
        (status = 401, description = "Wrong password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (user, session) = state
        .authenticator()
        .login(
            &payload.email,
            &payload.password,
            payload.display_name.as_deref(),
        )
        .await?;

    info!(username = %user.username, "session issued");
    let user = UserResponse::for_state(user, &state);
    Ok(Json(SessionResponse::new(session, user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Session closed", body = SuccessResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    state.authenticator().logout(&token).await;
    Ok(Json(SuccessResponse { success: true }))
}
