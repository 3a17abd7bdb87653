use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub username: String,
    pub display_name: String,
    pub profile_picture: String,
    /// Milliseconds since the Unix epoch, strictly increasing within a feed.
    pub timestamp: i64,
    pub server_id: String,
}
