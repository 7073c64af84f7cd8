//! Reset / NPC / Combat Runtime (C6): damage application, XP awards, and
//! the level-up curve. Target matching reuses the uniform rule from
//! `matching`.

use crate::error::WorldError;
use crate::model::{DamageResult, Item};

use super::matching::find_match_index;
use super::World;

/// HP/Mana granted per level-up, and the XP curve: level N needs
/// N * 100 total experience to reach N + 1.
const HP_PER_LEVEL: u32 = 10;
const MANA_PER_LEVEL: u32 = 5;

fn xp_for_next_level(level: u32) -> u32 {
    level * 100
}

/// `attack`'s base damage: level * 3 plus a small constant.
pub fn attack_damage(level: u32) -> u32 {
    level * 3 + 2
}

/// `cast bolt`'s damage: level * 3 + 10.
pub fn bolt_damage(level: u32) -> u32 {
    level * 3 + 10
}

pub struct PlayerDamageResult {
    pub target: String,
    pub defeated: bool,
    pub previous_room: Option<String>,
}

impl World {
    /// Applies damage to the first NPC in `room` matching `target`. On
    /// defeat, removes the NPC and returns its loot; the caller is
    /// responsible for awarding XP and room narration.
    pub fn apply_damage_to_npc(&self, room: &str, target: &str, amount: u32) -> Result<DamageResult, WorldError> {
        let mut w = self.write();
        let r = w.rooms.get_mut(room).ok_or_else(|| WorldError::RoomNotFound(room.to_string()))?;
        let idx = find_match_index(target, &r.npcs, |n| n.name.as_str()).ok_or(WorldError::NpcNotFound)?;
        let npc = &mut r.npcs[idx];
        npc.apply_damage(amount);
        let defeated = npc.is_defeated();
        let npc_name = npc.name.clone();
        let damage = amount.min(npc.max_health);
        let experience = if npc.experience > 0 { npc.experience } else { npc.level * 25 };
        let loot: Vec<Item> = if defeated { npc.loot.clone() } else { Vec::new() };
        if defeated {
            let defeated_npc = r.npcs.remove(idx);
            r.items.extend(defeated_npc.loot);
        }
        Ok(DamageResult { npc_name, damage, defeated, loot, experience })
    }

    /// Applies damage to another alive player visible in the same room. On
    /// defeat, moves the target to their Home room (falling back to the
    /// start room if unset) and reports the room they left.
    pub fn apply_damage_to_player(&self, target_token: &str, room: &str, amount: u32) -> Result<PlayerDamageResult, WorldError> {
        let mut w = self.write();
        let names: Vec<String> = w.players.values().filter(|p| p.alive && p.room == room).map(|p| p.name.clone()).collect();
        let idx = find_match_index(target_token, &names, |n| n.as_str()).ok_or_else(|| WorldError::PlayerNotFound(target_token.to_string()))?;
        let target_name = names[idx].clone();
        let start = w.start_room.clone();
        let target = w.players.get_mut(&target_name).unwrap();
        target.combat.health = target.combat.health.saturating_sub(amount);
        if target.combat.health > 0 {
            return Ok(PlayerDamageResult { target: target_name, defeated: false, previous_room: None });
        }
        target.combat.health = 0;
        let previous_room = target.room.clone();
        let dest = if target.home.is_empty() { start } else { target.home.clone() };
        target.room = dest;
        target.combat.health = target.combat.max_health;
        Ok(PlayerDamageResult { target: target_name, defeated: true, previous_room: Some(previous_room) })
    }

    /// Awards `xp` to `player`, applying the level curve. Returns the
    /// number of level-ups granted.
    pub fn award_experience(&self, player: &str, xp: u32) -> Result<u32, WorldError> {
        let mut w = self.write();
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        p.combat.experience += xp;
        let mut levels = 0;
        while p.combat.experience >= xp_for_next_level(p.combat.level) {
            p.combat.experience -= xp_for_next_level(p.combat.level);
            p.combat.level += 1;
            p.combat.max_health += HP_PER_LEVEL;
            p.combat.max_mana += MANA_PER_LEVEL;
            p.combat.health = p.combat.max_health;
            p.combat.mana = p.combat.max_mana;
            levels += 1;
        }
        Ok(levels)
    }

    /// `cast heal`: restores 15 + level * 5 HP, up to MaxHealth, for 10
    /// mana. Fails with `Capability`-style validation left to the handler.
    pub fn cast_heal(&self, player: &str) -> Result<u32, WorldError> {
        let mut w = self.write();
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        let healed = (15 + p.combat.level * 5).min(p.combat.max_health - p.combat.health);
        p.combat.health += healed;
        Ok(healed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaData;
    use crate::model::{Npc, Room};
    use std::sync::Arc;

    struct FixedArea(Vec<Room>);
    impl crate::area::AreaLoader for FixedArea {
        fn load(&self) -> Result<AreaData, String> {
            Ok(AreaData { rooms: self.0.clone(), quests: vec![] })
        }
    }

    fn one_room_world(npc: Npc) -> World {
        let mut room = Room::new("r1", "Room", "desc");
        room.npcs.push(npc);
        World::new(Arc::new(FixedArea(vec![room])), "r1").unwrap()
    }

    #[test]
    fn defeated_npc_drops_loot_and_is_removed() {
        let mut npc = Npc::new("Goblin", 1, 10, 25);
        npc.loot.push(Item::new("Coin", "a small coin"));
        let world = one_room_world(npc);
        let result = world.apply_damage_to_npc("r1", "goblin", 20).unwrap();
        assert!(result.defeated);
        assert_eq!(result.loot.len(), 1);
        assert_eq!(world.read().rooms["r1"].npcs.len(), 0);
        assert_eq!(world.read().rooms["r1"].items.len(), 1);
    }

    #[test]
    fn award_experience_levels_up_and_scales_stats() {
        let world = one_room_world(Npc::new("Goblin", 1, 10, 25));
        world.add_player("Hero", "r1", "r1", Default::default(), tokio::sync::mpsc::channel(32).0).unwrap();
        let levels = world.award_experience("Hero", 150).unwrap();
        assert_eq!(levels, 1);
        let w = world.read();
        let hero = &w.players["Hero"];
        assert_eq!(hero.combat.level, 2);
        assert_eq!(hero.combat.max_health, 30);
        assert_eq!(hero.combat.max_mana, 15);
    }
}
