//! World Store (C3): the single coordinator for rooms, NPCs, items,
//! connected players, resets, revisions, and the disabled-command set.
//! Every structural mutation goes through one `parking_lot::RwLock` - reads
//! take the shared lock, mutations take the exclusive lock, and no handler
//! holds the lock while doing I/O (persistence lives in the separate
//! account/mail/tell stores).

pub mod combat;
pub mod channel;
pub mod inventory;
pub mod matching;
pub mod quest;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::area::AreaLoader;
use crate::error::WorldError;
use crate::model::{Player, Quest, Reset, ResetKind, Revision, Role, Room};

use matching::find_match_index;

pub struct WorldInner {
    pub rooms: HashMap<String, Room>,
    pub players: HashMap<String, Player>,
    pub quests: HashMap<String, Quest>,
    pub disabled_commands: HashSet<String>,
    pub everyone_admin: bool,
    pub lock_critical_ops: bool,
    pub start_room: String,
}

pub struct World {
    inner: RwLock<WorldInner>,
    area_loader: Arc<dyn AreaLoader>,
}

/// Outcome of a successful `go <direction>`.
pub struct MoveOutcome {
    pub from_room: String,
    pub to_room: String,
}

impl World {
    pub fn new(area_loader: Arc<dyn AreaLoader>, start_room: impl Into<String>) -> Result<Self, String> {
        let data = area_loader.load()?;
        let rooms = data.rooms.into_iter().map(|r| (r.id.clone(), r)).collect();
        let quests = data.quests.into_iter().map(|q| (q.id.clone(), q)).collect();
        Ok(World {
            inner: RwLock::new(WorldInner {
                rooms,
                players: HashMap::new(),
                quests,
                disabled_commands: HashSet::new(),
                everyone_admin: false,
                lock_critical_ops: false,
                start_room: start_room.into(),
            }),
            area_loader,
        })
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, WorldInner> {
        self.inner.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, WorldInner> {
        self.inner.write()
    }

    pub fn start_room(&self) -> String {
        self.inner.read().start_room.clone()
    }

    // ---- Player lifecycle -------------------------------------------------

    /// Inserts a fresh player, or revives one left behind with `alive =
    /// false` by a race between disconnect and `remove_player`. Errors if a
    /// player with this name is already alive.
    pub fn add_player(&self, name: &str, room: &str, home: &str, roles: HashSet<Role>, output: mpsc::Sender<String>) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        if let Some(existing) = w.players.get_mut(name) {
            if existing.alive {
                return Err(WorldError::PlayerAlreadyConnected(name.to_string()));
            }
            existing.alive = true;
            existing.output = output;
            existing.roles = roles;
            return Ok(());
        }
        w.players.insert(
            name.to_string(),
            Player {
                name: name.to_string(),
                account: name.to_string(),
                room: room.to_string(),
                home: home.to_string(),
                roles,
                alive: true,
                window: (80, 24),
                terminal: String::new(),
                inventory: Vec::new(),
                combat: crate::model::CombatStats::starting(),
                channels: HashMap::new(),
                quest_log: HashMap::new(),
                output,
            },
        );
        Ok(())
    }

    /// Marks the player non-alive and drops their output sender, which
    /// closes the queue and stops the writer task.
    pub fn remove_player(&self, name: &str) {
        let mut w = self.inner.write();
        if let Some(p) = w.players.get_mut(name) {
            p.alive = false;
            let (tx, _rx) = mpsc::channel(1);
            p.output = tx;
        }
    }

    /// Case-insensitive prefix-unique lookup, matching the uniform target
    /// rule (exact, then unique prefix, then substring) against connected,
    /// Alive player names.
    pub fn find_player(&self, token: &str) -> Option<String> {
        let w = self.inner.read();
        let alive: Vec<&String> = w.players.values().filter(|p| p.alive).map(|p| &p.name).collect();
        let idx = find_match_index(token, &alive, |n| n.as_str())?;
        Some(alive[idx].clone())
    }

    pub fn player_room(&self, name: &str) -> Option<String> {
        self.inner.read().players.get(name).map(|p| p.room.clone())
    }

    /// `RenamePlayer`: swaps a player's display name in the world's name
    /// index. Fails if the target name is already taken by another alive
    /// player.
    pub fn rename_player(&self, old: &str, new: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        if w.players.get(new).map(|p| p.alive).unwrap_or(false) {
            return Err(WorldError::PlayerAlreadyConnected(new.to_string()));
        }
        let mut player = w.players.remove(old).ok_or_else(|| WorldError::PlayerNotFound(old.to_string()))?;
        player.name = new.to_string();
        w.players.insert(new.to_string(), player);
        Ok(())
    }

    /// Records the negotiated terminal window size and terminal-type string
    /// for a connected player, called whenever the session renegotiates
    /// (initial handshake, NAWS resize). A no-op if the player has since
    /// disconnected or been renamed out from under the caller.
    pub fn update_terminal_info(&self, name: &str, width: u16, height: u16, terminal_type: &str) {
        let mut w = self.inner.write();
        if let Some(player) = w.players.get_mut(name) {
            player.window = (width, height);
            if !terminal_type.is_empty() {
                player.terminal = terminal_type.to_string();
            }
        }
    }

    // ---- Movement -----------------------------------------------------

    pub fn mv(&self, player: &str, direction: &str) -> Result<MoveOutcome, WorldError> {
        let mut w = self.inner.write();
        let current = w.players.get(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?.room.clone();
        let dest = {
            let room = w.rooms.get(&current).ok_or_else(|| WorldError::RoomNotFound(current.clone()))?;
            room.exits.get(&direction.to_ascii_lowercase()).cloned().ok_or(WorldError::UnknownDirection)?
        };
        if !w.rooms.contains_key(&dest) {
            return Err(WorldError::RoomNotFound(dest));
        }
        w.players.get_mut(player).unwrap().room = dest.clone();
        Ok(MoveOutcome { from_room: current, to_room: dest })
    }

    /// Unchecked teleport used by goto/teleport/summon/recall.
    pub fn move_to_room(&self, player: &str, dest: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        if !w.rooms.contains_key(dest) {
            return Err(WorldError::RoomNotFound(dest.to_string()));
        }
        w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?.room = dest.to_string();
        Ok(())
    }

    /// Rooms reachable from `room` by a single exit, used by whisper's
    /// adjacent-rooms broadcast scope.
    pub fn adjacent_rooms(&self, room: &str) -> Vec<String> {
        self.inner.read().rooms.get(room).map(|r| r.exits.values().cloned().collect()).unwrap_or_default()
    }

    // ---- Room editing ---------------------------------------------------

    pub fn create_room(&self, id: &str, title: &str, description: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        if w.rooms.contains_key(id) {
            return Err(WorldError::RoomIdTaken(id.to_string()));
        }
        w.rooms.insert(id.to_string(), Room::new(id, title, description));
        Ok(())
    }

    pub fn update_room_title(&self, id: &str, title: &str, editor: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        room.title = title.to_string();
        room.push_revision(editor);
        Ok(())
    }

    pub fn update_room_description(&self, id: &str, description: &str, editor: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        room.description = description.to_string();
        room.push_revision(editor);
        Ok(())
    }

    pub fn set_exit(&self, id: &str, direction: &str, dest: &str, editor: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        if !w.rooms.contains_key(dest) {
            return Err(WorldError::RoomNotFound(dest.to_string()));
        }
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        room.exits.insert(direction.to_ascii_lowercase(), dest.to_string());
        room.push_revision(editor);
        Ok(())
    }

    pub fn clear_exit(&self, id: &str, direction: &str, editor: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        room.exits.remove(&direction.to_ascii_lowercase());
        room.push_revision(editor);
        Ok(())
    }

    pub fn link_rooms(&self, from: &str, direction: &str, to: &str, reverse_direction: &str, editor: &str) -> Result<(), WorldError> {
        {
            let w = self.inner.read();
            if !w.rooms.contains_key(from) {
                return Err(WorldError::RoomNotFound(from.to_string()));
            }
            if !w.rooms.contains_key(to) {
                return Err(WorldError::RoomNotFound(to.to_string()));
            }
        }
        self.set_exit(from, direction, to, editor)?;
        self.set_exit(to, reverse_direction, from, editor)
    }

    pub fn revert_room_to_revision(&self, id: &str, number: u64, editor: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        let target: Revision = room.revisions.iter().find(|r| r.number == number).cloned().ok_or(WorldError::RevisionNotFound(number))?;
        room.title = target.title;
        room.description = target.description;
        room.push_revision(editor);
        Ok(())
    }

    // ---- Reset management ------------------------------------------------

    pub fn upsert_room_npc_reset(&self, id: &str, name: &str, greet: Option<String>, count: u32, level: u32, max_health: u32, experience: u32) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        match room.resets.iter_mut().find(|r| matches!(r.kind, ResetKind::Npc) && r.name.eq_ignore_ascii_case(name)) {
            Some(r) => {
                r.text = greet;
                r.count = count;
                r.level = level;
                r.max_health = max_health;
                r.experience = experience;
            }
            None => room.resets.push(Reset {
                kind: ResetKind::Npc,
                name: name.to_string(),
                text: greet,
                count,
                level,
                max_health,
                experience,
            }),
        }
        Ok(())
    }

    pub fn remove_room_npc_reset(&self, id: &str, name: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        room.resets.retain(|r| !(matches!(r.kind, ResetKind::Npc) && r.name.eq_ignore_ascii_case(name)));
        Ok(())
    }

    pub fn upsert_room_item_reset(&self, id: &str, name: &str, description: Option<String>, count: u32) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        match room.resets.iter_mut().find(|r| matches!(r.kind, ResetKind::Item) && r.name.eq_ignore_ascii_case(name)) {
            Some(r) => {
                r.text = description;
                r.count = count;
            }
            None => room.resets.push(Reset {
                kind: ResetKind::Item,
                name: name.to_string(),
                text: description,
                count,
                level: 0,
                max_health: 0,
                experience: 0,
            }),
        }
        Ok(())
    }

    pub fn remove_room_item_reset(&self, id: &str, name: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        room.resets.retain(|r| !(matches!(r.kind, ResetKind::Item) && r.name.eq_ignore_ascii_case(name)));
        Ok(())
    }

    /// Ensures the room's NPC/item collections contain at least `count`
    /// entries matching each reset's name (case-insensitive), creating
    /// missing ones from the template. Extras are left alone, and running
    /// this twice on an untouched room is a no-op.
    pub fn apply_room_resets(&self, id: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let room = w.rooms.get_mut(id).ok_or_else(|| WorldError::RoomNotFound(id.to_string()))?;
        for reset in &room.resets {
            match reset.kind {
                ResetKind::Npc => {
                    let have = room.npcs.iter().filter(|n| n.name.eq_ignore_ascii_case(&reset.name)).count() as u32;
                    for _ in have..reset.count {
                        let mut npc = crate::model::Npc::new(&reset.name, reset.level.max(1), reset.max_health.max(1), reset.experience);
                        npc.greet = reset.text.clone();
                        room.npcs.push(npc);
                    }
                }
                ResetKind::Item => {
                    let have = room.items.iter().filter(|i| i.name.eq_ignore_ascii_case(&reset.name)).count() as u32;
                    for _ in have..reset.count {
                        room.items.push(crate::model::Item::new(reset.name.clone(), reset.text.clone().unwrap_or_default()));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn apply_all_resets(&self) {
        let ids: Vec<String> = self.inner.read().rooms.keys().cloned().collect();
        for id in ids {
            let _ = self.apply_room_resets(&id);
        }
    }

    /// Deep-copies the NPC/item/reset slices from `source` into `dest`,
    /// overwriting whatever was there.
    pub fn clone_room_population(&self, source: &str, dest: &str) -> Result<(), WorldError> {
        let mut w = self.inner.write();
        let (npcs, items, resets) = {
            let s = w.rooms.get(source).ok_or_else(|| WorldError::RoomNotFound(source.to_string()))?;
            (s.npcs.clone(), s.items.clone(), s.resets.clone())
        };
        let d = w.rooms.get_mut(dest).ok_or_else(|| WorldError::RoomNotFound(dest.to_string()))?;
        d.npcs = npcs;
        d.items = items;
        d.resets = resets;
        Ok(())
    }

    // ---- Command-enable flags -------------------------------------------

    pub fn set_command_disabled(&self, name: &str, disabled: bool) {
        let mut w = self.inner.write();
        if disabled {
            w.disabled_commands.insert(name.to_ascii_lowercase());
        } else {
            w.disabled_commands.remove(&name.to_ascii_lowercase());
        }
    }

    pub fn command_disabled(&self, name: &str) -> bool {
        self.inner.read().disabled_commands.contains(&name.to_ascii_lowercase())
    }

    pub fn configure_privileges(&self, everyone_admin: bool, lock_critical_ops: bool) {
        let mut w = self.inner.write();
        w.everyone_admin = everyone_admin;
        w.lock_critical_ops = lock_critical_ops;
    }

    pub fn everyone_admin(&self) -> bool {
        self.inner.read().everyone_admin
    }

    pub fn lock_critical_ops(&self) -> bool {
        self.inner.read().lock_critical_ops
    }

    // ---- Reboot -----------------------------------------------------------

    /// Reloads area data from the external loader and resets every
    /// connected player to the start room. On reload failure the existing
    /// world is left untouched.
    pub fn reboot(&self) -> Result<Vec<String>, WorldError> {
        let data = self.area_loader.load().map_err(WorldError::ReloadFailed)?;
        let mut w = self.inner.write();
        w.rooms = data.rooms.into_iter().map(|r| (r.id.clone(), r)).collect();
        w.quests = data.quests.into_iter().map(|q| (q.id.clone(), q)).collect();
        let start = w.start_room.clone();
        let mut reconnected = Vec::new();
        for p in w.players.values_mut() {
            if p.alive {
                p.room = start.clone();
                reconnected.push(p.name.clone());
            }
        }
        drop(w);
        self.apply_all_resets();
        Ok(reconnected)
    }
}
