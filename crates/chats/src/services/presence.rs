//! Who has read or posted in a server recently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Clone)]
pub struct PresenceTracker {
    window: Duration,
    seen: Arc<RwLock<HashMap<String, HashMap<String, Instant>>>>,
}

impl PresenceTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn touch(&self, server_id: &str, username: &str) {
        let now = Instant::now();
        let mut seen = self.seen.write().await;
        let server = seen.entry(server_id.to_string()).or_default();
        server.insert(username.to_string(), now);
        server.retain(|_, last| now.duration_since(*last) <= self.window);
    }

    /// Usernames seen within the window, sorted.
    pub async fn online_users(&self, server_id: &str) -> Vec<String> {
        let seen = self.seen.read().await;
        let Some(server) = seen.get(server_id) else {
            return Vec::new();
        };

        let mut users: Vec<String> = server
            .iter()
            .filter(|(_, last)| last.elapsed() <= self.window)
            .map(|(username, _)| username.clone())
            .collect();
        users.sort();
        users
    }

    pub async fn forget_server(&self, server_id: &str) {
        self.seen.write().await.remove(server_id);
    }
}
