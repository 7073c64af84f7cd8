use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{Item, QuestProgress};
use crate::model::Channel;

/// Capability-gating role flags. A player may hold any combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Moderator,
    Builder,
}

#[derive(Debug, Clone, Default)]
pub struct CombatStats {
    pub level: u32,
    pub experience: u32,
    pub health: u32,
    pub max_health: u32,
    pub mana: u32,
    pub max_mana: u32,
}

impl CombatStats {
    pub fn starting() -> Self {
        CombatStats {
            level: 1,
            experience: 0,
            health: 20,
            max_health: 20,
            mana: 10,
            max_mana: 10,
        }
    }
}

/// Per-channel subscription, mute, alias, and scrollback state. Owned by the
/// player record so it survives reconnects of the same account.
#[derive(Debug, Clone)]
pub struct ChannelPrefs {
    pub subscribed: bool,
    pub muted: bool,
    pub alias: Option<String>,
    pub history: VecDeque<(i64, String)>,
}

impl Default for ChannelPrefs {
    fn default() -> Self {
        ChannelPrefs {
            subscribed: true,
            muted: false,
            alias: None,
            history: VecDeque::new(),
        }
    }
}

/// Bounded outgoing message queue. Full queue drops the newest message
/// rather than blocking the sender - this is the explicit anti-backpressure
/// design described for the channel engine.
pub const OUTPUT_QUEUE_CAPACITY: usize = 32;

pub struct Player {
    pub name: String,
    pub account: String,
    pub room: String,
    pub home: String,
    pub roles: HashSet<Role>,
    pub alive: bool,
    pub window: (u16, u16),
    pub terminal: String,
    pub inventory: Vec<Item>,
    pub combat: CombatStats,
    pub channels: HashMap<Channel, ChannelPrefs>,
    pub quest_log: HashMap<String, QuestProgress>,
    pub output: mpsc::Sender<String>,
}

impl Player {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn channel_prefs(&mut self, channel: Channel) -> &mut ChannelPrefs {
        self.channels.entry(channel).or_default()
    }

    /// Non-blocking enqueue onto the player's output queue. A full queue
    /// silently drops the message for this recipient.
    pub fn enqueue(&self, line: String) {
        let _ = self.output.try_send(line);
    }
}
