use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use voltchat_auth::themes::{builtin_themes, Theme};

#[derive(Debug, Serialize, ToSchema)]
pub struct ThemesResponse {
    #[schema(value_type = Vec<Object>)]
    pub themes: Vec<Theme>,
}

#[utoipa::path(
    get,
    path = "/api/themes",
    tag = "Profile",
    responses((status = 200, description = "Built-in theme catalogue", body = ThemesResponse))
)]
pub async fn list_themes() -> Json<ThemesResponse> {
    Json(ThemesResponse {
        themes: builtin_themes().to_vec(),
    })
}
