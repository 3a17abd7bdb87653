//! # Voltchat Chats Crate
//!
//! Servers, memberships, per-server message feeds and presence for the
//! Voltarian Networking chat backend. Everything lives in memory behind a
//! `tokio::sync::RwLock` and is lost on restart.
//!
//! ## Architecture
//!
//! - **Entities**: Server, ServerMember, Message
//! - **Services**: `ChatService` for servers and feeds, `PresenceTracker` for who is online
//! - **Types**: errors and the realtime `ChatEvent`
//!
//! ## Usage
//!
//! ```rust
//! use voltchat_chats::{ChatService, Participant, GENERAL_SERVER_ID};
//! use voltchat_config::ChatConfig;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let chats = ChatService::new(&ChatConfig::default());
//! let author = Participant {
//!     user_id: "u1".into(),
//!     email: "amy@example.com".into(),
//!     username: "amy".into(),
//!     display_name: "Amy".into(),
//!     profile_picture: String::new(),
//! };
//! let message = chats.post_message(GENERAL_SERVER_ID, &author, "hello").await?;
//! assert_eq!(message.text, "hello");
//! # Ok::<(), voltchat_chats::ChatError>(())
//! # }).unwrap();
//! ```

pub mod entities;
pub mod services;
pub mod types;
mod utils;

pub use entities::{
    MembershipStats, Message, Participant, Role, Server, ServerMember, ServerView,
    GENERAL_SERVER_ID,
};
pub use services::{ChatService, PresenceTracker};
pub use types::{ChatError, ChatEvent, ChatResult};
