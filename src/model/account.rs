use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Channel, Role};

/// The persisted per-channel preference triple. The in-memory `ChannelPrefs`
/// also carries a scrollback ring buffer, which is runtime-only and is not
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChannelPrefs {
    #[serde(default = "default_true")]
    pub subscribed: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub alias: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for StoredChannelPrefs {
    fn default() -> Self {
        StoredChannelPrefs {
            subscribed: true,
            muted: false,
            alias: None,
        }
    }
}

/// A persistent account record: credential hash, role flags, login
/// bookkeeping, and per-player preferences that must survive reconnects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub password_hash: String,
    pub created_at: i64,
    pub last_login: Option<i64>,
    pub total_logins: u32,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub home: Option<String>,
    #[serde(default)]
    pub channel_prefs: HashMap<Channel, StoredChannelPrefs>,
}

impl Account {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
