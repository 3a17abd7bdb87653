use serde::{Deserialize, Serialize};

/// The public room every account can read.
pub const GENERAL_SERVER_ID: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Username of the owner.
    pub owner_id: String,
    pub owner_email: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub invite_code: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMember {
    pub server_id: String,
    pub user_id: String,
    pub user_email: String,
    pub username: String,
    pub display_name: String,
    pub joined_at: i64,
    pub role: Role,
}

/// A server as seen by one caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerView {
    #[serde(flatten)]
    pub server: Server,
    pub member_count: usize,
    pub user_role: Option<Role>,
    pub joined_at: Option<i64>,
}

/// Identity of the account acting on a server or feed.
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipStats {
    pub server_count: usize,
    pub first_joined_at: Option<i64>,
}
