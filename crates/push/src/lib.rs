use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{info, warn};
use voltchat_config::PushConfig;

pub mod payload;
pub mod sender;
pub mod subscription;

pub use payload::{PushData, PushPayload};
pub use sender::{PushSender, WebPushSender};
pub use subscription::{PushSubscription, SubscriptionInfo, SubscriptionKeys, SubscriptionRegistry};

#[derive(Debug, Error)]
pub enum PushError {
    #[error("{0}")]
    InvalidSubscription(String),
    #[error("push notifications are not configured")]
    Disabled,
    #[error("push delivery failed: {0}")]
    WebPush(#[from] web_push::WebPushError),
    #[error("push delivery failed: {0}")]
    Delivery(String),
    #[error("payload encoding failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct PushService {
    registry: SubscriptionRegistry,
    sender: Option<Arc<dyn PushSender>>,
    public_key: Option<String>,
    icon: String,
    badge: String,
    notify_on_message: bool,
}

impl PushService {
    /// Builds the web-push backed service. Delivery stays off without a signing key.
    pub fn from_config(config: &PushConfig) -> Result<Self, PushError> {
        let sender: Option<Arc<dyn PushSender>> = match config.vapid_private_key_pem.as_deref() {
            Some(pem) if config.delivery_enabled() => {
                Some(Arc::new(WebPushSender::new(pem, &config.subject)?))
            }
            _ => None,
        };

        if sender.is_none() {
            info!("push delivery disabled, no VAPID signing key configured");
        }

        Ok(Self::build(config, sender))
    }

    pub fn with_sender(config: &PushConfig, sender: Arc<dyn PushSender>) -> Self {
        Self::build(config, Some(sender))
    }

    fn build(config: &PushConfig, sender: Option<Arc<dyn PushSender>>) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            sender: sender.filter(|_| config.enabled),
            public_key: config
                .vapid_public_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            notify_on_message: config.notify_on_message,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    pub fn notify_on_message(&self) -> bool {
        self.notify_on_message && self.is_enabled()
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub async fn subscribe(&self, email: &str, subscription: SubscriptionInfo) -> Result<(), PushError> {
        self.registry.upsert(email, subscription).await?;
        info!(email, "push subscription stored");
        Ok(())
    }

    pub async fn unsubscribe(&self, email: &str) -> bool {
        let removed = self.registry.remove(email).await;
        if removed {
            info!(email, "push subscription removed");
        }
        removed
    }

    pub fn new_message_payload(&self, sender: &str, text: &str) -> PushPayload {
        PushPayload::new_message(sender, text, &self.icon, &self.badge)
    }

    /// Sends `payload` to every subscriber except `exclude_email`, dropping subscriptions that fail.
    pub async fn broadcast(
        &self,
        payload: &PushPayload,
        exclude_email: Option<&str>,
    ) -> Result<DispatchReport, PushError> {
        let sender = self.sender.as_ref().ok_or(PushError::Disabled)?;
        let body = payload.to_bytes()?;
        let recipients = self.registry.recipients(exclude_email).await;

        let deliveries = recipients.iter().map(|recipient| {
            let body = body.as_slice();
            async move {
                let result = sender.send(&recipient.subscription, body).await;
                (recipient, result)
            }
        });

        let mut report = DispatchReport {
            attempted: recipients.len(),
            failed: 0,
        };

        for (recipient, result) in join_all(deliveries).await {
            if let Err(error) = result {
                warn!(email = %recipient.user_email, %error, "push delivery failed, removing subscription");
                self.registry
                    .remove_endpoint(&recipient.user_email, &recipient.subscription.endpoint)
                    .await;
                report.failed += 1;
            }
        }

        info!(attempted = report.attempted, failed = report.failed, "push broadcast finished");
        Ok(report)
    }
}
