use chrono::Utc;
use serde::Serialize;

pub const NEW_MESSAGE_TITLE: &str = "New Message - Voltarian Networking";
pub const NEW_MESSAGE_TAG: &str = "new-message";
const PREVIEW_CHARS: usize = 100;

/// The JSON document the service worker turns into a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub data: PushData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushData {
    pub url: String,
    pub timestamp: i64,
}

impl PushPayload {
    pub fn new_message(sender: &str, text: &str, icon: &str, badge: &str) -> Self {
        Self {
            title: NEW_MESSAGE_TITLE.to_string(),
            body: format!("{sender}: {}", preview(text)),
            icon: icon.to_string(),
            badge: badge.to_string(),
            tag: NEW_MESSAGE_TAG.to_string(),
            data: PushData {
                url: "/".to_string(),
                timestamp: Utc::now().timestamp_millis(),
            },
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
