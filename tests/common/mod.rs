//! Shared fixtures for the scenario-level integration tests: an in-memory
//! two-room area, and thin wrappers around `World::add_player` /
//! `AppState` construction so each test file can drive the dispatcher
//! directly instead of opening a socket.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use emberhold::area::{AreaData, AreaLoader};
use emberhold::commands::{AppState, Registry};
use emberhold::model::{Item, Npc, Quest, QuestObjective, Role, Room};
use emberhold::stores::{AccountStore, MailStore, TellStore};
use emberhold::world::World;
use tokio::sync::mpsc;

pub struct FixedArea(pub Vec<Room>, pub Vec<Quest>);

impl AreaLoader for FixedArea {
    fn load(&self) -> Result<AreaData, String> {
        Ok(AreaData { rooms: self.0.clone(), quests: self.1.clone() })
    }
}

/// Two rooms ("start", "garden") linked both ways, a goblin guarding the
/// garden, a coin on its ground, and a quest a guard in "start" offers.
pub fn two_room_world() -> World {
    let mut start = Room::new("start", "The Gatehouse", "A warm hearth crackles here.");
    let mut garden = Room::new("garden", "The Garden", "Overgrown hedges line a gravel path.");
    start.exits.insert("east".to_string(), "garden".to_string());
    garden.exits.insert("west".to_string(), "start".to_string());

    let mut guard = Npc::new("Guard", 5, 40, 0);
    guard.greet = Some("The guard nods at you.".to_string());
    start.npcs.push(guard);

    let mut goblin = Npc::new("Goblin", 1, 10, 25);
    goblin.loot.push(Item::new("Coin", "a small copper coin"));
    garden.npcs.push(goblin);
    garden.items.push(Item::new("Shovel", "a rusty garden shovel"));

    let quest = Quest {
        id: "clear-garden".to_string(),
        name: "Clear the Garden".to_string(),
        description: "The guard wants the goblin in the garden dealt with.".to_string(),
        giver_npc: "Guard".to_string(),
        turn_in_npc: Some("Guard".to_string()),
        required_kills: vec![QuestObjective::Kill { npc: "Goblin".to_string(), count: 1 }],
        required_items: vec![],
        reward_xp: 50,
        reward_items: vec![],
        completion_message: "The guard thanks you for clearing the garden.".to_string(),
    };

    World::new(Arc::new(FixedArea(vec![start, garden], vec![quest])), "start").unwrap()
}

/// Adds a player with the given roles and returns the receiving end of
/// their output queue.
pub fn spawn_player(world: &World, name: &str, room: &str, roles: &[Role]) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    world.add_player(name, room, room, roles.iter().copied().collect::<HashSet<Role>>(), tx).unwrap();
    rx
}

/// Drains every line currently queued for a player without blocking.
pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(line) = rx.try_recv() {
        out.push(line);
    }
    out
}

pub fn test_app(world: World, accounts_path: &std::path::Path, mail_path: &std::path::Path, tells_path: &std::path::Path) -> Arc<AppState> {
    Arc::new(AppState {
        world: Arc::new(world),
        accounts: Arc::new(AccountStore::load(accounts_path).unwrap()),
        mail: Arc::new(MailStore::load(mail_path).unwrap()),
        tells: Arc::new(TellStore::load(tells_path).unwrap()),
        registry: Arc::new(Registry::new()),
        portal: None,
        admin_account: "admin".to_string(),
    })
}
