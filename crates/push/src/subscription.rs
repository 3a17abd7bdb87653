use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::PushError;

/// Browser `PushSubscription.toJSON()` output. Extra fields such as `expirationTime` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl SubscriptionInfo {
    pub fn validate(&self) -> Result<(), PushError> {
        if !self.endpoint.starts_with("https://") {
            return Err(PushError::InvalidSubscription(
                "Subscription endpoint must be an https URL".to_string(),
            ));
        }
        if self.keys.p256dh.trim().is_empty() || self.keys.auth.trim().is_empty() {
            return Err(PushError::InvalidSubscription(
                "Subscription keys are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PushSubscription {
    pub user_email: String,
    pub subscription: SubscriptionInfo,
    pub created_at: DateTime<Utc>,
}

/// One subscription per email address.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    entries: Arc<RwLock<Vec<PushSubscription>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, email: &str, subscription: SubscriptionInfo) -> Result<(), PushError> {
        subscription.validate()?;

        let entry = PushSubscription {
            user_email: email.to_string(),
            subscription,
            created_at: Utc::now(),
        };

        let mut entries = self.entries.write().await;
        match entries
            .iter_mut()
            .find(|existing| existing.user_email.eq_ignore_ascii_case(email))
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    pub async fn remove(&self, email: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| !entry.user_email.eq_ignore_ascii_case(email));
        entries.len() != before
    }

    /// Removes the entry for `email` only while it still points at `endpoint`.
    pub async fn remove_endpoint(&self, email: &str, endpoint: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| {
            !(entry.user_email.eq_ignore_ascii_case(email) && entry.subscription.endpoint == endpoint)
        });
        entries.len() != before
    }

    pub async fn recipients(&self, exclude_email: Option<&str>) -> Vec<PushSubscription> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| exclude_email.map_or(true, |excluded| !entry.user_email.eq_ignore_ascii_case(excluded)))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
