pub mod chat_service;
pub mod presence;

pub use chat_service::ChatService;
pub use presence::PresenceTracker;
