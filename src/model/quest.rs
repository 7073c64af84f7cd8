use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Item;

/// A single requirement of a quest, as a tagged variant rather than a class
/// hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QuestObjective {
    Kill { npc: String, count: u32 },
    Item { item: String, count: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub description: String,
    pub giver_npc: String,
    pub turn_in_npc: Option<String>,
    #[serde(default)]
    pub required_kills: Vec<QuestObjective>,
    #[serde(default)]
    pub required_items: Vec<QuestObjective>,
    pub reward_xp: u32,
    #[serde(default)]
    pub reward_items: Vec<Item>,
    pub completion_message: String,
}

/// A player's progress against a single quest's objectives.
#[derive(Debug, Clone, Default)]
pub struct QuestProgress {
    pub accepted: bool,
    pub completed: bool,
    pub kill_counts: HashMap<String, u32>,
}

impl Quest {
    /// Whether the kill and item requirements are currently satisfied for
    /// the given progress record and inventory snapshot.
    pub fn is_complete(&self, progress: &QuestProgress, inventory: &[Item]) -> bool {
        let kills_done = self.required_kills.iter().all(|obj| match obj {
            QuestObjective::Kill { npc, count } => {
                progress.kill_counts.get(&npc.to_ascii_lowercase()).copied().unwrap_or(0) >= *count
            }
            QuestObjective::Item { .. } => true,
        });
        let items_done = self.required_items.iter().all(|obj| match obj {
            QuestObjective::Item { item, count } => {
                let have = inventory
                    .iter()
                    .filter(|i| i.name.eq_ignore_ascii_case(item))
                    .count() as u32;
                have >= *count
            }
            QuestObjective::Kill { .. } => true,
        });
        kills_done && items_done
    }
}
