pub mod message;
pub mod server;

pub use message::Message;
pub use server::{
    MembershipStats, Participant, Role, Server, ServerMember, ServerView, GENERAL_SERVER_ID,
};
