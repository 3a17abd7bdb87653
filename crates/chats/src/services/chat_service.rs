//! Servers, memberships and message feeds behind a single lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use voltchat_config::ChatConfig;

use crate::entities::{
    MembershipStats, Message, Participant, Role, Server, ServerMember, ServerView,
    GENERAL_SERVER_ID,
};
use crate::services::presence::PresenceTracker;
use crate::types::{ChatError, ChatEvent, ChatResult};
use crate::utils::ids;
use crate::utils::validation::{
    optional_text, required_text, MAX_SERVER_DESCRIPTION_LENGTH, MAX_SERVER_NAME_LENGTH,
};

const ONE_DAY_MS: i64 = 86_400_000;

#[derive(Clone)]
pub struct ChatService {
    state: Arc<RwLock<ChatState>>,
    presence: PresenceTracker,
    events: broadcast::Sender<ChatEvent>,
    max_messages: usize,
    max_message_length: usize,
}

struct ChatState {
    servers: Vec<Server>,
    members: Vec<ServerMember>,
    feeds: HashMap<String, Feed>,
}

#[derive(Default)]
struct Feed {
    messages: VecDeque<Message>,
    last_timestamp: i64,
}

impl ChatState {
    fn seeded() -> Self {
        let general = Server {
            id: GENERAL_SERVER_ID.to_string(),
            name: "General Chat".to_string(),
            description: "The main community chat room".to_string(),
            owner_id: "system".to_string(),
            owner_email: "system@voltaccept.com".to_string(),
            created_at: ids::now_millis() - ONE_DAY_MS,
            invite_code: GENERAL_SERVER_ID.to_string(),
            is_public: true,
        };

        Self {
            servers: vec![general],
            members: Vec::new(),
            feeds: HashMap::new(),
        }
    }

    fn server(&self, id: &str) -> ChatResult<&Server> {
        self.servers
            .iter()
            .find(|server| server.id == id)
            .ok_or_else(|| ChatError::server_not_found(id))
    }

    fn membership(&self, server_id: &str, email: &str) -> Option<&ServerMember> {
        self.members
            .iter()
            .find(|member| member.server_id == server_id && member.user_email == email)
    }

    fn member_count(&self, server_id: &str) -> usize {
        self.members
            .iter()
            .filter(|member| member.server_id == server_id)
            .count()
    }

    fn view(&self, server: &Server, membership: Option<&ServerMember>) -> ServerView {
        ServerView {
            server: server.clone(),
            member_count: self.member_count(&server.id),
            user_role: membership.map(|member| member.role),
            joined_at: membership.map(|member| member.joined_at),
        }
    }

    fn unique_invite_code(&self) -> String {
        loop {
            let code = ids::invite_code();
            if !self.servers.iter().any(|server| server.invite_code == code) {
                return code;
            }
        }
    }
}

impl ChatService {
    pub fn new(config: &ChatConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        Self {
            state: Arc::new(RwLock::new(ChatState::seeded())),
            presence: PresenceTracker::new(Duration::from_secs(config.presence_window_seconds)),
            events,
            max_messages: config.max_messages_per_server.max(1),
            max_message_length: config.max_message_length,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Public servers plus the servers `email` belongs to, in creation order.
    pub async fn list_servers(&self, email: &str) -> Vec<ServerView> {
        let state = self.state.read().await;
        state
            .servers
            .iter()
            .filter_map(|server| {
                let membership = state.membership(&server.id, email);
                if membership.is_none() && !server.is_public {
                    return None;
                }
                let mut view = state.view(server, membership);
                if view.user_role.is_none() {
                    view.user_role = Some(Role::Member);
                }
                Some(view)
            })
            .collect()
    }

    pub async fn get_server(&self, server_id: &str) -> ChatResult<ServerView> {
        let state = self.state.read().await;
        let server = state.server(server_id)?;
        Ok(state.view(server, None))
    }

    pub async fn create_server(
        &self,
        name: &str,
        description: Option<&str>,
        owner: &Participant,
    ) -> ChatResult<ServerView> {
        let name = required_text(name, "Server name", MAX_SERVER_NAME_LENGTH)?;
        let description =
            optional_text(description, "Description", MAX_SERVER_DESCRIPTION_LENGTH)?;

        let now = ids::now_millis();
        let mut state = self.state.write().await;

        let server = Server {
            id: ids::server_id(now),
            name,
            description,
            owner_id: owner.username.clone(),
            owner_email: owner.email.clone(),
            created_at: now,
            invite_code: state.unique_invite_code(),
            is_public: false,
        };
        let membership = member_of(&server.id, owner, Role::Owner, now);

        state.servers.push(server.clone());
        state.members.push(membership.clone());

        info!(server_id = %server.id, name = %server.name, owner = %owner.username, "server created");
        Ok(state.view(&server, Some(&membership)))
    }

    pub async fn join_server(
        &self,
        invite_code: &str,
        participant: &Participant,
    ) -> ChatResult<ServerView> {
        let invite_code = invite_code.trim();
        let mut state = self.state.write().await;

        let server = state
            .servers
            .iter()
            .find(|server| server.invite_code == invite_code)
            .cloned()
            .ok_or(ChatError::InvalidInvite)?;

        if state.membership(&server.id, &participant.email).is_some() {
            return Err(ChatError::AlreadyMember);
        }

        let membership = member_of(&server.id, participant, Role::Member, ids::now_millis());
        state.members.push(membership.clone());

        info!(server_id = %server.id, username = %participant.username, "user joined server");
        Ok(state.view(&server, Some(&membership)))
    }

    /// Removes the caller's membership. Returns `true` when the owner left and the server went with them.
    pub async fn leave_server(&self, server_id: &str, email: &str) -> ChatResult<bool> {
        let mut state = self.state.write().await;

        state.server(server_id)?;
        if server_id == GENERAL_SERVER_ID {
            return Err(ChatError::CannotLeaveGeneral);
        }

        let membership = state
            .membership(server_id, email)
            .cloned()
            .ok_or(ChatError::NotMember)?;

        if membership.role == Role::Owner {
            state.members.retain(|member| member.server_id != server_id);
            state.servers.retain(|server| server.id != server_id);
            state.feeds.remove(server_id);
            drop(state);

            self.presence.forget_server(server_id).await;
            info!(server_id, owner = %membership.username, "server deleted by owner");
            self.publish(ChatEvent::Deleted {
                server_id: server_id.to_string(),
            });
            return Ok(true);
        }

        state
            .members
            .retain(|member| !(member.server_id == server_id && member.user_email == email));

        info!(server_id, username = %membership.username, "user left server");
        Ok(false)
    }

    /// Members in join order.
    pub async fn members(&self, server_id: &str) -> ChatResult<Vec<ServerMember>> {
        let state = self.state.read().await;
        state.server(server_id)?;
        Ok(state
            .members
            .iter()
            .filter(|member| member.server_id == server_id)
            .cloned()
            .collect())
    }

    pub async fn membership_stats(&self, username: &str) -> MembershipStats {
        let state = self.state.read().await;
        state
            .members
            .iter()
            .filter(|member| member.username.eq_ignore_ascii_case(username))
            .fold(MembershipStats::default(), |stats, member| MembershipStats {
                server_count: stats.server_count + 1,
                first_joined_at: Some(
                    stats
                        .first_joined_at
                        .map_or(member.joined_at, |first| first.min(member.joined_at)),
                ),
            })
    }

    /// Public servers are readable by everyone, private ones by members only.
    pub async fn can_read(&self, server_id: &str, email: &str) -> ChatResult<()> {
        let state = self.state.read().await;
        let server = state.server(server_id)?;
        if server.is_public || state.membership(server_id, email).is_some() {
            Ok(())
        } else {
            Err(ChatError::NotMember)
        }
    }

    pub async fn post_message(
        &self,
        server_id: &str,
        author: &Participant,
        text: &str,
    ) -> ChatResult<Message> {
        let text = required_text(text, "Message", self.max_message_length)?;

        let message = {
            let mut state = self.state.write().await;
            state.server(server_id)?;

            let feed = state.feeds.entry(server_id.to_string()).or_default();
            let now = ids::now_millis();
            let timestamp = now.max(feed.last_timestamp + 1);

            let message = Message {
                id: ids::message_id(timestamp),
                text,
                username: author.username.clone(),
                display_name: author.display_name.clone(),
                profile_picture: author.profile_picture.clone(),
                timestamp,
                server_id: server_id.to_string(),
            };

            feed.last_timestamp = timestamp;
            feed.messages.push_back(message.clone());
            while feed.messages.len() > self.max_messages {
                feed.messages.pop_front();
            }
            message
        };

        self.presence.touch(server_id, &author.username).await;
        info!(server_id, message_id = %message.id, username = %author.username, "message posted");

        self.publish(ChatEvent::Message {
            message: message.clone(),
        });
        Ok(message)
    }

    /// Messages oldest first, limited to those newer than `since` when given.
    pub async fn messages_since(
        &self,
        server_id: &str,
        since: Option<i64>,
    ) -> ChatResult<Vec<Message>> {
        let state = self.state.read().await;
        state.server(server_id)?;

        let Some(feed) = state.feeds.get(server_id) else {
            return Ok(Vec::new());
        };

        Ok(feed
            .messages
            .iter()
            .filter(|message| since.map_or(true, |since| message.timestamp > since))
            .cloned()
            .collect())
    }

    /// Messages after `last_message_id`, or the whole feed when that id is unknown.
    pub async fn messages_after(
        &self,
        server_id: &str,
        last_message_id: Option<&str>,
    ) -> ChatResult<Vec<Message>> {
        let state = self.state.read().await;
        state.server(server_id)?;

        let Some(feed) = state.feeds.get(server_id) else {
            return Ok(Vec::new());
        };

        let start = last_message_id
            .and_then(|id| feed.messages.iter().position(|message| message.id == id))
            .map_or(0, |index| index + 1);

        Ok(feed.messages.iter().skip(start).cloned().collect())
    }

    /// Empties a feed. Callers are expected to have checked admin rights.
    pub async fn clear(&self, server_id: &str) -> ChatResult<usize> {
        let cleared = {
            let mut state = self.state.write().await;
            state.server(server_id)?;
            state
                .feeds
                .get_mut(server_id)
                .map_or(0, |feed| std::mem::take(&mut feed.messages).len())
        };

        info!(server_id, cleared, "messages cleared");
        self.publish(ChatEvent::Clear {
            server_id: server_id.to_string(),
        });
        Ok(cleared)
    }

    pub async fn touch(&self, server_id: &str, username: &str) {
        self.presence.touch(server_id, username).await;
    }

    pub async fn online_users(&self, server_id: &str) -> Vec<String> {
        self.presence.online_users(server_id).await
    }

    fn publish(&self, event: ChatEvent) {
        let kind = event.event_type_name();
        match self.events.send(event) {
            Ok(receivers) => debug!(kind, receivers, "chat event published"),
            Err(_) => debug!(kind, "chat event dropped, no subscribers"),
        }
    }
}

fn member_of(server_id: &str, participant: &Participant, role: Role, now: i64) -> ServerMember {
    ServerMember {
        server_id: server_id.to_string(),
        user_id: participant.user_id.clone(),
        user_email: participant.email.clone(),
        username: participant.username.clone(),
        display_name: participant.display_name.clone(),
        joined_at: now,
        role,
    }
}
