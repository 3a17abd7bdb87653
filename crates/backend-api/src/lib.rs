//! HTTP surface of Voltarian Networking: JSON routes, the SSE stream, the
//! OpenAPI document and, optionally, the built web client.

mod docs;
mod error;
mod state;
mod util;

pub mod routes;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse};
pub use state::{participant, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Profile updates carry the picture as a base64 data URL, so a 5 MiB image
/// arrives as roughly 7 MiB of JSON.
const PROFILE_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config().http.static_dir.clone();

    let router = Router::new()
        .route("/health", get(routes::health::health_check))
        // Accounts
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route(
            "/api/profile",
            get(routes::profile::get_profile)
                .post(routes::profile::update_profile)
                .layer(DefaultBodyLimit::max(PROFILE_BODY_LIMIT)),
        )
        .route(
            "/api/profile/picture",
            delete(routes::profile::reset_picture),
        )
        .route("/api/profile/themes", post(routes::profile::create_theme))
        .route("/api/themes", get(routes::themes::list_themes))
        .route("/api/users/:username", get(routes::users::get_public_profile))
        // Servers
        .route(
            "/api/servers",
            get(routes::servers::list_servers).post(routes::servers::create_server),
        )
        .route("/api/servers/join", post(routes::servers::join_server))
        .route(
            "/api/servers/:server_id",
            get(routes::servers::get_server).delete(routes::servers::leave_server),
        )
        .route(
            "/api/servers/:server_id/members",
            get(routes::servers::list_members),
        )
        // Messages
        .route(
            "/api/messages",
            get(routes::messages::list_messages)
                .post(routes::messages::post_message)
                .delete(routes::messages::clear_messages),
        )
        .route("/api/poll", get(routes::messages::poll_messages))
        .route("/api/stream", get(routes::stream::event_stream))
        // Push
        .route(
            "/api/notifications/vapid-public-key",
            get(routes::notifications::vapid_public_key),
        )
        .route(
            "/api/notifications/subscribe",
            post(routes::notifications::subscribe).delete(routes::notifications::unsubscribe),
        )
        .route(
            "/api/notifications/send",
            post(routes::notifications::send_notification),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/docs/openapi.json", ApiDoc::openapi()));

    let router = match static_dir {
        Some(dir) => {
            info!(static_dir = %dir, "serving web client");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router.layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, CACHE_CONTROL])
}
