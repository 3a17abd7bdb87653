//! Delivery seam between the fan-out logic and the push services.

use async_trait::async_trait;
use tracing::debug;
use web_push::{
    ContentEncoding, IsahcWebPushClient, VapidSignatureBuilder, WebPushClient,
    WebPushMessageBuilder,
};

use crate::{PushError, SubscriptionInfo};

/// Time push services keep an undelivered notification, in seconds.
const NOTIFICATION_TTL: u32 = 24 * 60 * 60;

#[async_trait]
pub trait PushSender: Send + Sync + 'static {
    async fn send(&self, subscription: &SubscriptionInfo, payload: &[u8]) -> Result<(), PushError>;
}

/// Signs with VAPID and encrypts with `aes128gcm`.
pub struct WebPushSender {
    client: IsahcWebPushClient,
    private_key_pem: String,
    subject: String,
}

impl WebPushSender {
    pub fn new(private_key_pem: &str, subject: &str) -> Result<Self, PushError> {
        // malformed keys fail here instead of on first send
        VapidSignatureBuilder::from_pem_no_sub(private_key_pem.as_bytes())?;

        Ok(Self {
            client: IsahcWebPushClient::new()?,
            private_key_pem: private_key_pem.to_string(),
            subject: subject.to_string(),
        })
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(&self, subscription: &SubscriptionInfo, payload: &[u8]) -> Result<(), PushError> {
        let info = web_push::SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut signature =
            VapidSignatureBuilder::from_pem(self.private_key_pem.as_bytes(), &info)?;
        signature.add_claim("sub", self.subject.as_str());

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_ttl(NOTIFICATION_TTL);
        builder.set_vapid_signature(signature.build()?);

        self.client.send(builder.build()?).await?;
        debug!(endpoint = %subscription.endpoint, "push notification delivered");
        Ok(())
    }
}
