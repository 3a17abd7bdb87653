//! Events fanned out to realtime subscribers.

use serde::Serialize;

use crate::entities::Message;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    /// A message was posted.
    Message { message: Message },

    /// A feed was emptied by an administrator.
    Clear {
        #[serde(rename = "serverId")]
        server_id: String,
    },

    /// The owner left and the server is gone. Nothing follows for this server.
    Deleted {
        #[serde(rename = "serverId")]
        server_id: String,
    },
}

impl ChatEvent {
    pub fn server_id(&self) -> &str {
        match self {
            ChatEvent::Message { message } => &message.server_id,
            ChatEvent::Clear { server_id } | ChatEvent::Deleted { server_id } => server_id,
        }
    }

    pub fn event_type_name(&self) -> &'static str {
        match self {
            ChatEvent::Message { .. } => "message",
            ChatEvent::Clear { .. } => "clear",
            ChatEvent::Deleted { .. } => "deleted",
        }
    }

    /// Whether subscribers of this server should stop listening.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Deleted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_event_serialises_with_type_tag() {
        let event = ChatEvent::Clear {
            server_id: "general".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"type": "clear", "serverId": "general"}));
        assert_eq!(event.server_id(), "general");
        assert!(!event.is_terminal());
    }

    #[test]
    fn deleted_event_is_terminal() {
        let event = ChatEvent::Deleted {
            server_id: "server_1_abc".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"type": "deleted", "serverId": "server_1_abc"}));
        assert!(event.is_terminal());
    }
}
