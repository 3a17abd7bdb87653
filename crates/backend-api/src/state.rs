use std::{sync::Arc, time::Duration};

use voltchat_auth::{AuthSession, Authenticator, User};
use voltchat_chats::{ChatService, Participant};
use voltchat_config::AppConfig;
use voltchat_push::PushService;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    chats: ChatService,
    push: PushService,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        authenticator: Authenticator,
        chats: ChatService,
        push: PushService,
    ) -> Self {
        Self {
            authenticator,
            chats,
            push,
            config: Arc::new(config),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn chats(&self) -> &ChatService {
        &self.chats
    }

    pub fn push(&self) -> &PushService {
        &self.push
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.config.chat.heartbeat_interval_seconds.max(1))
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }

    pub fn is_admin(&self, user: &User) -> bool {
        self.authenticator.is_admin(user)
    }
}

/// The chat-side identity of an account.
pub fn participant(user: &User) -> Participant {
    Participant {
        user_id: user.id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        profile_picture: user.effective_picture().to_string(),
    }
}
