use serde::{Deserialize, Serialize};

/// A public board post. Board identity is case-insensitive; `recipients`
/// empty means public (visible to anyone who reads the board).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub board: String,
    pub id: u64,
    pub author: String,
    pub recipients: Vec<String>,
    pub body: String,
    pub created_at: i64,
}

impl MailMessage {
    /// Addressed-to test: case-insensitive equality against each recipient.
    /// An empty recipient list means the post is public.
    pub fn addressed_to(&self, name: &str) -> bool {
        self.recipients.is_empty() || self.recipients.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// A queued player-to-player message delivered at next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineTell {
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub queued_at: i64,
}
