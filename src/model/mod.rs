//! Plain data types shared across the world store, persistence layer, and
//! command handlers.
//!
//! Cross references between these types (Player <-> Room <-> NPC) are never
//! stored as owning pointers; every reference is a stable id (room id,
//! player name, account name) resolved back through the owning store at the
//! point of use.

mod account;
mod channel;
mod item;
mod mail;
mod npc;
mod player;
mod quest;
mod room;

pub use account::{Account, StoredChannelPrefs};
pub use channel::{Channel, CHANNEL_HISTORY_DEFAULT, CHANNEL_HISTORY_LIMIT};
pub use item::Item;
pub use mail::{MailMessage, OfflineTell};
pub use npc::{DamageResult, Npc};
pub use player::{ChannelPrefs, CombatStats, Player, Role, OUTPUT_QUEUE_CAPACITY};
pub use quest::{Quest, QuestObjective, QuestProgress};
pub use room::{Reset, ResetKind, Revision, Room};
