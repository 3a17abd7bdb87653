use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use voltchat_config::PushConfig;
use voltchat_push::{
    DispatchReport, PushError, PushSender, PushService, SubscriptionInfo, SubscriptionKeys,
};

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Records every delivery and fails for the configured endpoints.
#[derive(Default)]
struct RecordingSender {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
    failing: HashSet<String>,
}

impl RecordingSender {
    fn failing(endpoints: &[&str]) -> Self {
        Self {
            failing: endpoints.iter().map(|e| e.to_string()).collect(),
            ..Self::default()
        }
    }

    fn endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self
            .delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect();
        endpoints.sort();
        endpoints
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    async fn send(&self, subscription: &SubscriptionInfo, payload: &[u8]) -> Result<(), PushError> {
        if self.failing.contains(&subscription.endpoint) {
            return Err(PushError::Delivery("410 Gone".into()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.to_vec()));
        Ok(())
    }
}

struct TestContext {
    push: PushService,
    sender: Arc<RecordingSender>,
}

impl TestContext {
    fn new(sender: RecordingSender) -> Self {
        let sender = Arc::new(sender);
        let config = PushConfig {
            vapid_public_key: Some("BPublicKey".into()),
            ..PushConfig::default()
        };
        Self {
            push: PushService::with_sender(&config, sender.clone()),
            sender,
        }
    }

    async fn subscribe(&self, email: &str, endpoint: &str) -> TestResult {
        self.push
            .subscribe(
                email,
                SubscriptionInfo {
                    endpoint: endpoint.into(),
                    keys: SubscriptionKeys {
                        p256dh: "p256dh".into(),
                        auth: "auth".into(),
                    },
                },
            )
            .await?;
        Ok(())
    }
}

#[tokio::test]
async fn broadcast_skips_sender_and_reaches_everyone_else() -> TestResult {
    let ctx = TestContext::new(RecordingSender::default());
    ctx.subscribe("amy@example.com", "https://push.example/amy").await?;
    ctx.subscribe("bob@example.com", "https://push.example/bob").await?;
    ctx.subscribe("cat@example.com", "https://push.example/cat").await?;

    let payload = ctx.push.new_message_payload("amy", "hello there");
    let report = ctx
        .push
        .broadcast(&payload, Some("AMY@example.com"))
        .await?;

    assert_eq!(
        report,
        DispatchReport {
            attempted: 2,
            failed: 0
        }
    );
    assert_eq!(
        ctx.sender.endpoints(),
        vec!["https://push.example/bob", "https://push.example/cat"]
    );

    let delivered = ctx.sender.delivered.lock().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&delivered[0].1)?;
    assert_eq!(json["title"], "New Message - Voltarian Networking");
    assert_eq!(json["body"], "amy: hello there");
    assert_eq!(json["tag"], "new-message");
    assert_eq!(json["icon"], "/icon-192x192.png");
    Ok(())
}

#[tokio::test]
async fn failed_deliveries_remove_subscriptions() -> TestResult {
    let ctx = TestContext::new(RecordingSender::failing(&["https://push.example/gone"]));
    ctx.subscribe("ok@example.com", "https://push.example/ok").await?;
    ctx.subscribe("gone@example.com", "https://push.example/gone").await?;

    let payload = ctx.push.new_message_payload("system", "ping");
    let report = ctx.push.broadcast(&payload, None).await?;
    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(ctx.push.registry().len().await, 1);

    let report = ctx.push.broadcast(&payload, None).await?;
    assert_eq!(report.attempted, 1);
    assert_eq!(report.failed, 0);
    Ok(())
}

#[tokio::test]
async fn unsubscribe_reports_whether_anything_was_removed() -> TestResult {
    let ctx = TestContext::new(RecordingSender::default());
    ctx.subscribe("amy@example.com", "https://push.example/amy").await?;

    assert!(ctx.push.unsubscribe("amy@example.com").await);
    assert!(!ctx.push.unsubscribe("amy@example.com").await);
    Ok(())
}

#[tokio::test]
async fn service_without_signing_key_is_disabled() -> TestResult {
    let push = PushService::from_config(&PushConfig::default())?;
    assert!(!push.is_enabled());
    assert!(!push.notify_on_message());
    assert!(push.public_key().is_none());

    let payload = push.new_message_payload("amy", "hi");
    let error = push.broadcast(&payload, None).await.expect_err("disabled");
    assert!(matches!(error, PushError::Disabled));
    Ok(())
}

#[tokio::test]
async fn switched_off_service_ignores_sender() {
    let config = PushConfig {
        enabled: false,
        ..PushConfig::default()
    };
    let push = PushService::with_sender(&config, Arc::new(RecordingSender::default()));
    assert!(!push.is_enabled());
}

#[tokio::test]
async fn public_key_is_exposed_when_configured() {
    let ctx = TestContext::new(RecordingSender::default());
    assert_eq!(ctx.push.public_key(), Some("BPublicKey"));
    assert!(ctx.push.notify_on_message());
}
