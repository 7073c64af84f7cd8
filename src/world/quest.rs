//! Quest API: giver/turn-in NPC lookups, acceptance, kill-progress
//! tracking, and completion checks against a player's inventory.

use crate::error::WorldError;
use crate::model::{Item, Quest, QuestProgress};

use super::World;

pub struct QuestCompletion {
    pub message: String,
    pub reward_xp: u32,
    pub reward_items: Vec<Item>,
}

impl World {
    /// Quests whose giver NPC is present in `room`.
    pub fn available_quests(&self, room: &str) -> Vec<Quest> {
        let w = self.read();
        let Some(r) = w.rooms.get(room) else { return Vec::new() };
        w.quests
            .values()
            .filter(|q| r.npcs.iter().any(|n| n.name.eq_ignore_ascii_case(&q.giver_npc)))
            .cloned()
            .collect()
    }

    pub fn accept_quest(&self, player: &str, quest_token: &str) -> Result<Quest, WorldError> {
        let mut w = self.write();
        let quest = w
            .quests
            .values()
            .find(|q| q.id.eq_ignore_ascii_case(quest_token) || q.name.eq_ignore_ascii_case(quest_token))
            .cloned()
            .ok_or_else(|| WorldError::QuestNotFound(quest_token.to_string()))?;
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        let progress = p.quest_log.entry(quest.id.clone()).or_default();
        if progress.accepted {
            return Err(WorldError::QuestAlreadyAccepted);
        }
        progress.accepted = true;
        Ok(quest)
    }

    pub fn snapshot_quest_log(&self, player: &str) -> Result<std::collections::HashMap<String, QuestProgress>, WorldError> {
        let w = self.read();
        let p = w.players.get(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        Ok(p.quest_log.clone())
    }

    /// Increments the kill counter for `npc_name` on every accepted,
    /// incomplete quest the killer is tracking that requires it.
    pub fn record_npc_kill(&self, player: &str, npc_name: &str) {
        let mut w = self.write();
        let Some(p) = w.players.get_mut(player) else { return };
        let key = npc_name.to_ascii_lowercase();
        for progress in p.quest_log.values_mut() {
            if progress.accepted && !progress.completed {
                *progress.kill_counts.entry(key.clone()).or_insert(0) += 1;
            }
        }
    }

    pub fn complete_quest(&self, player: &str, quest_token: &str) -> Result<QuestCompletion, WorldError> {
        let mut w = self.write();
        let quest = w
            .quests
            .values()
            .find(|q| q.id.eq_ignore_ascii_case(quest_token) || q.name.eq_ignore_ascii_case(quest_token))
            .cloned()
            .ok_or_else(|| WorldError::QuestNotFound(quest_token.to_string()))?;
        let turn_in_npc = quest.turn_in_npc.clone().unwrap_or_else(|| quest.giver_npc.clone());
        let (progress, player_room) = {
            let p = w.players.get(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
            (p.quest_log.get(&quest.id).cloned().unwrap_or_default(), p.room.clone())
        };
        if !progress.accepted {
            return Err(WorldError::QuestNotAccepted);
        }
        let p = w.players.get(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        if progress.completed || !quest.is_complete(&progress, &p.inventory) {
            return Err(WorldError::QuestNotComplete);
        }
        let at_turn_in_npc = w
            .rooms
            .get(&player_room)
            .map(|r| r.npcs.iter().any(|n| n.name.eq_ignore_ascii_case(&turn_in_npc)))
            .unwrap_or(false);
        if !at_turn_in_npc {
            return Err(WorldError::QuestWrongLocation(turn_in_npc));
        }
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        for obj in &quest.required_items {
            if let crate::model::QuestObjective::Item { item, count } = obj {
                let mut remaining = *count;
                p.inventory.retain(|i| {
                    if remaining > 0 && i.name.eq_ignore_ascii_case(item) {
                        remaining -= 1;
                        false
                    } else {
                        true
                    }
                });
            }
        }
        p.inventory.extend(quest.reward_items.clone());
        p.quest_log.get_mut(&quest.id).unwrap().completed = true;
        Ok(QuestCompletion {
            message: quest.completion_message.clone(),
            reward_xp: quest.reward_xp,
            reward_items: quest.reward_items.clone(),
        })
    }
}
