use serde::{Deserialize, Serialize};

use super::Item;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    pub greet: Option<String>,
    pub level: u32,
    pub max_health: u32,
    pub health: u32,
    pub experience: u32,
    #[serde(default)]
    pub loot: Vec<Item>,
}

impl Npc {
    pub fn new(name: impl Into<String>, level: u32, max_health: u32, experience: u32) -> Self {
        Npc {
            name: name.into(),
            greet: None,
            level,
            max_health,
            health: max_health,
            experience,
            loot: Vec::new(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Applies damage, clamping health to the [0, max_health] invariant.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }
}

/// Outcome of a combat blow landed on an NPC.
#[derive(Debug, Clone)]
pub struct DamageResult {
    pub npc_name: String,
    pub damage: u32,
    pub defeated: bool,
    pub loot: Vec<Item>,
    pub experience: u32,
}
