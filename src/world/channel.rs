//! Channel & Broadcast Engine (C5): per-room, adjacent-room, and global
//! fan-out honoring subscription, mute, and per-player scrollback. Enqueues
//! are non-blocking; a full output queue silently drops the message for
//! that one recipient (spec's explicit anti-backpressure design).

use std::collections::HashMap;

use crate::error::WorldError;
use crate::model::{Channel, ChannelPrefs, StoredChannelPrefs, CHANNEL_HISTORY_LIMIT};

use super::World;

impl World {
    /// Broadcasts to every Alive player in `room` except `exclude`,
    /// ignoring channel subscription (used for plain room narration like
    /// arrivals/departures, not a `Channel`-scoped message).
    pub fn broadcast_to_room(&self, room: &str, text: &str, exclude: Option<&str>) {
        let w = self.read();
        for p in w.players.values() {
            if p.alive && p.room == room && Some(p.name.as_str()) != exclude {
                p.enqueue(text.to_string());
            }
        }
    }

    /// Broadcasts to Alive players in `room` subscribed to `channel` and
    /// not muted, excluding `exclude` (normally the sender, who gets their
    /// own rendering directly from the handler).
    pub fn broadcast_to_room_channel(&self, room: &str, channel: Channel, text: &str, exclude: Option<&str>) {
        let w = self.read();
        for p in w.players.values() {
            if p.alive && p.room == room && Some(p.name.as_str()) != exclude && channel_deliverable(p.channels.get(&channel)) {
                p.enqueue(text.to_string());
            }
        }
    }

    /// Whisper's scope: `room` plus every room reachable by one exit.
    pub fn broadcast_to_rooms_channel(&self, rooms: &[String], channel: Channel, text: &str, exclude: Option<&str>) {
        let w = self.read();
        for p in w.players.values() {
            if p.alive && rooms.iter().any(|r| r == &p.room) && Some(p.name.as_str()) != exclude && channel_deliverable(p.channels.get(&channel)) {
                p.enqueue(text.to_string());
            }
        }
    }

    /// Yell/OOC's scope: every Alive player.
    pub fn broadcast_to_all_channel(&self, channel: Channel, text: &str, exclude: Option<&str>) {
        let w = self.read();
        for p in w.players.values() {
            if p.alive && Some(p.name.as_str()) != exclude && channel_deliverable(p.channels.get(&channel)) {
                p.enqueue(text.to_string());
            }
        }
    }

    pub fn set_channel(&self, player: &str, channel: Channel, on: bool) -> Result<(), WorldError> {
        let mut w = self.write();
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        p.channel_prefs(channel).subscribed = on;
        Ok(())
    }

    pub fn set_channel_mute(&self, player: &str, channel: Channel, muted: bool) -> Result<(), WorldError> {
        let mut w = self.write();
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        p.channel_prefs(channel).muted = muted;
        Ok(())
    }

    pub fn set_channel_alias(&self, player: &str, channel: Channel, alias: Option<String>) -> Result<(), WorldError> {
        let mut w = self.write();
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        p.channel_prefs(channel).alias = alias;
        Ok(())
    }

    pub fn channel_muted(&self, player: &str, channel: Channel) -> bool {
        self.read().players.get(player).and_then(|p| p.channels.get(&channel)).map(|c| c.muted).unwrap_or(false)
    }

    /// The durable (non-scrollback) half of a player's channel prefs, for
    /// handlers that need to write the current state through to the
    /// account store after a subscribe/mute/alias change.
    pub fn channel_prefs_snapshot(&self, player: &str, channel: Channel) -> StoredChannelPrefs {
        let w = self.read();
        match w.players.get(player).and_then(|p| p.channels.get(&channel)) {
            Some(prefs) => StoredChannelPrefs {
                subscribed: prefs.subscribed,
                muted: prefs.muted,
                alias: prefs.alias.clone(),
            },
            None => StoredChannelPrefs::default(),
        }
    }

    /// Seeds a freshly connected player's in-memory channel prefs from the
    /// account record, so subscribe/mute/alias settings survive a
    /// reconnect or server restart.
    pub fn hydrate_channel_prefs(&self, player: &str, stored: &HashMap<Channel, StoredChannelPrefs>) {
        let mut w = self.write();
        let Some(p) = w.players.get_mut(player) else { return };
        for (channel, prefs) in stored {
            let entry = p.channel_prefs(*channel);
            entry.subscribed = prefs.subscribed;
            entry.muted = prefs.muted;
            entry.alias = prefs.alias.clone();
        }
    }

    /// Resolves a typed token to a channel, checking the player's own
    /// aliases before the canonical token table.
    pub fn resolve_channel_token(&self, player: &str, token: &str) -> Option<Channel> {
        let w = self.read();
        if let Some(p) = w.players.get(player) {
            for channel in Channel::all() {
                if let Some(prefs) = p.channels.get(channel) {
                    if prefs.alias.as_deref().map(|a| a.eq_ignore_ascii_case(token)).unwrap_or(false) {
                        return Some(*channel);
                    }
                }
            }
        }
        Channel::resolve_token(token)
    }

    /// Appends `rendered` to `player`'s per-channel ring buffer, trimming
    /// the oldest entry on overflow past `CHANNEL_HISTORY_LIMIT`.
    pub fn record_player_channel_message(&self, player: &str, channel: Channel, rendered: &str, at: i64) {
        let mut w = self.write();
        if let Some(p) = w.players.get_mut(player) {
            let prefs = p.channel_prefs(channel);
            if prefs.history.len() >= CHANNEL_HISTORY_LIMIT {
                prefs.history.pop_front();
            }
            prefs.history.push_back((at, rendered.to_string()));
        }
    }

    /// The most recent `min(limit, CHANNEL_HISTORY_LIMIT)` messages for the
    /// given player/channel, oldest first.
    pub fn channel_history(&self, player: &str, channel: Channel, limit: usize) -> Vec<(i64, String)> {
        let w = self.read();
        let Some(p) = w.players.get(player) else { return Vec::new() };
        let Some(prefs) = p.channels.get(&channel) else { return Vec::new() };
        let take = limit.min(CHANNEL_HISTORY_LIMIT).min(prefs.history.len());
        prefs.history.iter().rev().take(take).rev().cloned().collect()
    }
}

/// Subscription defaults ON per channel; absence of a `ChannelPrefs` entry
/// means the default, unmuted, subscribed state.
fn channel_deliverable(prefs: Option<&ChannelPrefs>) -> bool {
    match prefs {
        Some(p) => p.subscribed && !p.muted,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaData;
    use crate::model::Room;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct FixedArea(Vec<Room>);
    impl crate::area::AreaLoader for FixedArea {
        fn load(&self) -> Result<AreaData, String> {
            Ok(AreaData { rooms: self.0.clone(), quests: vec![] })
        }
    }

    fn two_player_world() -> (World, mpsc::Receiver<String>, mpsc::Receiver<String>) {
        let room = Room::new("hall", "Hall", "A hall.");
        let world = World::new(Arc::new(FixedArea(vec![room])), "hall").unwrap();
        let (tx1, rx1) = mpsc::channel(32);
        let (tx2, rx2) = mpsc::channel(32);
        world.add_player("Talker", "hall", "hall", Default::default(), tx1).unwrap();
        world.add_player("Target", "hall", "hall", Default::default(), tx2).unwrap();
        (world, rx1, rx2)
    }

    #[test]
    fn muted_player_does_not_receive_channel_broadcast() {
        let (world, _rx1, mut rx2) = two_player_world();
        world.set_channel("Target", Channel::Say, false).unwrap();
        world.broadcast_to_room_channel("hall", Channel::Say, "Talker says: testing", Some("Talker"));
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn subscribed_player_receives_channel_broadcast() {
        let (world, _rx1, mut rx2) = two_player_world();
        world.broadcast_to_room_channel("hall", Channel::Say, "Talker says: testing", Some("Talker"));
        assert_eq!(rx2.try_recv().unwrap(), "Talker says: testing");
    }

    #[test]
    fn history_trims_to_limit_and_returns_recent_first_oldest_order() {
        let (world, _rx1, _rx2) = two_player_world();
        for i in 0..5 {
            world.record_player_channel_message("Talker", Channel::Say, &format!("msg {i}"), i as i64);
        }
        let history = world.channel_history("Talker", Channel::Say, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].1, "msg 2");
        assert_eq!(history[2].1, "msg 4");
    }
}
