use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;
use voltchat_auth::AuthError;
use voltchat_chats::ChatError;
use voltchat_push::PushError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn logged(status: StatusCode, source: &str, message: String) -> Self {
        if status.is_server_error() {
            error!(status = %status, source, message = %message, "request failed");
        } else {
            debug!(status = %status, source, message = %message, "request rejected");
        }
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::internal_server_error("Internal server error")
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = match error {
            AuthError::MissingCredentials
            | AuthError::InvalidProfile(_)
            | AuthError::InvalidTheme(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::logged(status, "auth", error.to_string())
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        let status = match error {
            ChatError::ServerNotFound { .. } | ChatError::InvalidInvite => StatusCode::NOT_FOUND,
            ChatError::AlreadyMember
            | ChatError::NotMember
            | ChatError::CannotLeaveGeneral
            | ChatError::Validation { .. } => StatusCode::BAD_REQUEST,
        };
        Self::logged(status, "chats", error.to_string())
    }
}

impl From<PushError> for ApiError {
    fn from(error: PushError) -> Self {
        let status = match error {
            PushError::InvalidSubscription(_) => StatusCode::BAD_REQUEST,
            PushError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            PushError::WebPush(_) | PushError::Delivery(_) | PushError::Payload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::logged(status, "push", error.to_string())
    }
}
