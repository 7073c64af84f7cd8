use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Item, Npc};

/// A declarative rule that re-spawns an NPC or item up to a configured
/// count, applied on load or on explicit `reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResetKind {
    Npc,
    Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reset {
    pub kind: ResetKind,
    pub name: String,
    /// Auto-greet line for an NPC reset, or the long description for an
    /// item reset.
    pub text: Option<String>,
    pub count: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub max_health: u32,
    #[serde(default)]
    pub experience: u32,
}

/// A snapshot of a room's title and description, indexed by a per-room
/// monotonic number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub number: u64,
    pub title: String,
    pub description: String,
    pub editor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub title: String,
    pub description: String,
    /// direction -> destination room id
    pub exits: BTreeMap<String, String>,
    pub npcs: Vec<Npc>,
    pub items: Vec<Item>,
    pub resets: Vec<Reset>,
    pub revisions: Vec<Revision>,
}

impl Room {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        let title = title.into();
        let description = description.into();
        Room {
            id: id.into(),
            title: title.clone(),
            description: description.clone(),
            exits: BTreeMap::new(),
            npcs: Vec::new(),
            items: Vec::new(),
            resets: Vec::new(),
            revisions: vec![Revision {
                number: 1,
                title,
                description,
                editor: "system".to_string(),
            }],
        }
    }

    pub fn next_revision_number(&self) -> u64 {
        self.revisions.iter().map(|r| r.number).max().unwrap_or(0) + 1
    }

    pub fn push_revision(&mut self, editor: &str) {
        let number = self.next_revision_number();
        self.revisions.push(Revision {
            number,
            title: self.title.clone(),
            description: self.description.clone(),
            editor: editor.to_string(),
        });
    }

    /// Renders the exits list sorted alphabetically by direction key, or
    /// "none" if there are no exits.
    pub fn exits_description(&self) -> String {
        if self.exits.is_empty() {
            "none".to_string()
        } else {
            self.exits.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}
