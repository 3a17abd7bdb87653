//! Error types for servers and message feeds.

use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Server not found")]
    ServerNotFound { id: String },

    #[error("Invalid invite code")]
    InvalidInvite,

    #[error("You are already a member of this server")]
    AlreadyMember,

    #[error("You are not a member of this server")]
    NotMember,

    #[error("Cannot leave the general server")]
    CannotLeaveGeneral,

    #[error("{message}")]
    Validation { message: String },
}

impl ChatError {
    pub fn server_not_found(id: impl Into<String>) -> Self {
        Self::ServerNotFound { id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
