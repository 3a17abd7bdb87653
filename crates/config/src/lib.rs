use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "voltchat.toml",
    "config/voltchat.toml",
    "crates/config/voltchat.toml",
    "../voltchat.toml",
    "../config/voltchat.toml",
    "../crates/config/voltchat.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub push: PushConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    /// Directory with the built web client. Unknown paths fall back to it.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Accounts whose email ends with `@<admin_domain>` may clear chats.
    #[serde(default = "AuthConfig::default_admin_domain")]
    pub admin_domain: String,
    #[serde(default = "AuthConfig::default_seed_demo_users")]
    pub seed_demo_users: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            admin_domain: Self::default_admin_domain(),
            seed_demo_users: Self::default_seed_demo_users(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }

    fn default_admin_domain() -> String {
        "voltaccept.com".to_string()
    }

    const fn default_seed_demo_users() -> bool {
        true
    }
}

/// Limits applied to every server's message feed.
///
/// ```
/// use voltchat_config::ChatConfig;
///
/// let chat = ChatConfig::default();
/// assert_eq!(chat.max_messages_per_server, 100);
/// assert_eq!(chat.presence_window_seconds, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub max_messages_per_server: usize,
    pub max_message_length: usize,
    pub presence_window_seconds: u64,
    pub heartbeat_interval_seconds: u64,
    pub event_buffer: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_messages_per_server: 100,
            max_message_length: 2000,
            presence_window_seconds: 30,
            heartbeat_interval_seconds: 30,
            event_buffer: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub enabled: bool,
    pub subject: String,
    pub vapid_public_key: Option<String>,
    /// PKCS#8 or SEC1 PEM of the VAPID signing key.
    #[serde(skip_serializing)]
    pub vapid_private_key_pem: Option<String>,
    pub notify_on_message: bool,
    pub icon: String,
    pub badge: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subject: "mailto:admin@voltaccept.com".to_string(),
            vapid_public_key: None,
            vapid_private_key_pem: None,
            notify_on_message: true,
            icon: "/icon-192x192.png".to_string(),
            badge: "/icon-96x96.png".to_string(),
        }
    }
}

impl PushConfig {
    /// Push delivery needs both the switch and a signing key.
    pub fn delivery_enabled(&self) -> bool {
        self.enabled
            && self
                .vapid_private_key_pem
                .as_deref()
                .is_some_and(|pem| !pem.trim().is_empty())
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use voltchat_config::load;
///
/// std::env::remove_var("VOLTCHAT_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl_i64 = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())
        .context("invalid default for http.address")?
        .set_default("http.port", i64::from(defaults.http.port))
        .context("invalid default for http.port")?
        .set_default("auth.session_ttl_seconds", session_ttl_i64)
        .context("invalid default for auth.session_ttl_seconds")?
        .set_default("auth.admin_domain", defaults.auth.admin_domain.clone())
        .context("invalid default for auth.admin_domain")?
        .set_default("auth.seed_demo_users", defaults.auth.seed_demo_users)
        .context("invalid default for auth.seed_demo_users")?;

    let environment_overrides = config::Environment::with_prefix("VOLTCHAT").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("VOLTCHAT_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via VOLTCHAT_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.normalise();

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

impl AppConfig {
    fn normalise(&mut self) {
        if self.auth.session_ttl_seconds > i64::MAX as u64 {
            self.auth.session_ttl_seconds = i64::MAX as u64;
        }

        let domain = self.auth.admin_domain.trim().trim_start_matches('@');
        self.auth.admin_domain = domain.to_ascii_lowercase();

        self.chat.max_messages_per_server = self.chat.max_messages_per_server.max(1);
        self.chat.event_buffer = self.chat.event_buffer.max(1);
        self.chat.heartbeat_interval_seconds = self.chat.heartbeat_interval_seconds.max(1);
    }
}
