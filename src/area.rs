//! Area loading: turns a JSON area file on disk into the Room/NPC/Item/Reset
//! and Quest records the World Store operates on. The file format and the
//! loading mechanics are an external collaborator with a narrow contract;
//! this module is deliberately thin.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::model::{Item, Npc, Quest, Reset, ResetKind, Room};

#[derive(Debug, Deserialize)]
struct AreaFile {
    #[allow(dead_code)]
    name: String,
    rooms: Vec<RoomFile>,
}

#[derive(Debug, Deserialize)]
struct RoomFile {
    id: String,
    title: String,
    description: String,
    #[serde(default)]
    exits: BTreeMap<String, String>,
    #[serde(default)]
    npcs: Vec<Npc>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    resets: Vec<ResetFile>,
    #[serde(default)]
    quests: Vec<Quest>,
}

#[derive(Debug, Deserialize)]
struct ResetFile {
    kind: ResetKind,
    name: String,
    text: Option<String>,
    count: u32,
    #[serde(default)]
    level: u32,
    #[serde(default)]
    max_health: u32,
    #[serde(default)]
    experience: u32,
}

/// The loaded contents of an area: rooms (with their initial NPC/item/reset
/// population) and the quests the area defines.
pub struct AreaData {
    pub rooms: Vec<Room>,
    pub quests: Vec<Quest>,
}

/// Injected collaborator returning Room/NPC/Item/Reset and Quest records.
/// Implementations may read from disk, an embedded default, or (in tests)
/// an in-memory fixture.
pub trait AreaLoader: Send + Sync {
    fn load(&self) -> Result<AreaData, String>;
}

/// Reads a single JSON area file from disk in the format described by the
/// persistent state layout: `{ "name": ..., "rooms": [...] }`.
pub struct JsonFileAreaLoader {
    pub path: PathBuf,
}

impl AreaLoader for JsonFileAreaLoader {
    fn load(&self) -> Result<AreaData, String> {
        let raw = fs::read_to_string(&self.path).map_err(|e| e.to_string())?;
        let file: AreaFile = serde_json::from_str(&raw).map_err(|e| e.to_string())?;

        let mut rooms = Vec::with_capacity(file.rooms.len());
        let mut quests = Vec::new();
        for r in file.rooms {
            let mut room = Room::new(r.id, r.title, r.description);
            room.exits = r.exits;
            room.npcs = r.npcs;
            room.items = r.items;
            room.resets = r
                .resets
                .into_iter()
                .map(|f| Reset {
                    kind: f.kind,
                    name: f.name,
                    text: f.text,
                    count: f.count,
                    level: f.level,
                    max_health: f.max_health,
                    experience: f.experience,
                })
                .collect();
            quests.extend(r.quests);
            rooms.push(room);
        }

        if rooms.is_empty() {
            return Err("area file defines no rooms".to_string());
        }

        // Every exit destination must resolve to a room in the same file.
        let ids: std::collections::HashSet<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        for room in &rooms {
            for dest in room.exits.values() {
                if !ids.contains(dest.as_str()) {
                    return Err(format!(
                        "room '{}' has an exit to unknown room '{}'",
                        room.id, dest
                    ));
                }
            }
        }

        Ok(AreaData { rooms, quests })
    }
}

/// A minimal built-in two-room area used when no `-areas` file is supplied,
/// so the server is playable out of the box.
pub struct DefaultAreaLoader;

impl AreaLoader for DefaultAreaLoader {
    fn load(&self) -> Result<AreaData, String> {
        let mut start = Room::new("start", "The Emberhold Gatehouse", "A warm hearth crackles in the gatehouse of Emberhold.");
        let mut second = Room::new("second", "The Second Room", "A smaller chamber beyond the gatehouse.");
        start.exits.insert("east".to_string(), "second".to_string());
        second.exits.insert("west".to_string(), "start".to_string());
        Ok(AreaData {
            rooms: vec![start, second],
            quests: Vec::new(),
        })
    }
}
