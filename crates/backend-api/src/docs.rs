use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Voltarian Networking API",
        description = "Group chat servers, message feeds, profiles and web push"
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::profile::reset_picture,
        crate::routes::profile::create_theme,
        crate::routes::themes::list_themes,
        crate::routes::users::get_public_profile,
        crate::routes::servers::list_servers,
        crate::routes::servers::create_server,
        crate::routes::servers::join_server,
        crate::routes::servers::get_server,
        crate::routes::servers::leave_server,
        crate::routes::servers::list_members,
        crate::routes::messages::list_messages,
        crate::routes::messages::post_message,
        crate::routes::messages::clear_messages,
        crate::routes::messages::poll_messages,
        crate::routes::stream::event_stream,
        crate::routes::notifications::vapid_public_key,
        crate::routes::notifications::subscribe,
        crate::routes::notifications::unsubscribe,
        crate::routes::notifications::send_notification
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::auth::SuccessResponse,
            crate::routes::profile::ProfileResponse,
            crate::routes::profile::UpdateProfileRequest,
            crate::routes::profile::ThemeColorsPayload,
            crate::routes::profile::CreateThemeRequest,
            crate::routes::themes::ThemesResponse,
            crate::routes::users::PublicUser,
            crate::routes::users::PublicUserResponse,
            crate::routes::servers::ServersResponse,
            crate::routes::servers::ServerResponse,
            crate::routes::servers::MembersResponse,
            crate::routes::servers::LeaveServerResponse,
            crate::routes::servers::CreateServerRequest,
            crate::routes::servers::JoinServerRequest,
            crate::routes::messages::MessagesResponse,
            crate::routes::messages::PostMessageRequest,
            crate::routes::messages::PostMessageResponse,
            crate::routes::messages::ClearMessagesResponse,
            crate::routes::messages::PollResponse,
            crate::routes::notifications::VapidKeyResponse,
            crate::routes::notifications::SubscribeRequest,
            crate::routes::notifications::UnsubscribeResponse,
            crate::routes::notifications::SendNotificationRequest,
            crate::routes::notifications::SendNotificationResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Login and session management"),
        (name = "Profile", description = "Own profile, pictures and themes"),
        (name = "Users", description = "Public profiles"),
        (name = "Servers", description = "Chat servers and membership"),
        (name = "Messages", description = "Message feeds, polling and the event stream"),
        (name = "Notifications", description = "Web push subscriptions and dispatch")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Session token".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
