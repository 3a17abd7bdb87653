use anyhow::{Context, Result};
use tracing::info;
use voltchat_auth::Authenticator;
use voltchat_chats::ChatService;
use voltchat_config::AppConfig;
use voltchat_push::PushService;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub authenticator: Authenticator,
    pub chats: ChatService,
    pub push: PushService,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let authenticator = Authenticator::new(&config.auth);
        if config.auth.seed_demo_users {
            authenticator
                .seed_demo_accounts()
                .await
                .context("failed to seed demo accounts")?;
        }

        let chats = ChatService::new(&config.chat);
        let push = PushService::from_config(&config.push)
            .context("failed to initialise push service")?;

        info!(
            admin_domain = %config.auth.admin_domain,
            max_messages = config.chat.max_messages_per_server,
            push_enabled = push.is_enabled(),
            "backend services ready"
        );

        Ok(Self {
            authenticator,
            chats,
            push,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
