//! Inventory mutations: moving Items between a room's ground collection and
//! a player's carried sequence. Items are value-copied on every move, per
//! the data model.

use crate::error::WorldError;
use crate::model::Item;

use super::matching::find_match_index;
use super::World;

impl World {
    pub fn take_item(&self, player: &str, room: &str, item_token: &str) -> Result<Item, WorldError> {
        let mut w = self.write();
        let r = w.rooms.get_mut(room).ok_or_else(|| WorldError::RoomNotFound(room.to_string()))?;
        let idx = find_match_index(item_token, &r.items, |i| i.name.as_str()).ok_or(WorldError::ItemNotFound)?;
        let item = r.items.remove(idx);
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        p.inventory.push(item.clone());
        Ok(item)
    }

    pub fn drop_item(&self, player: &str, room: &str, item_token: &str) -> Result<Item, WorldError> {
        let mut w = self.write();
        let p = w.players.get_mut(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        let idx = find_match_index(item_token, &p.inventory, |i| i.name.as_str()).ok_or(WorldError::ItemNotCarried)?;
        let item = p.inventory.remove(idx);
        let r = w.rooms.get_mut(room).ok_or_else(|| WorldError::RoomNotFound(room.to_string()))?;
        r.items.push(item.clone());
        Ok(item)
    }

    pub fn player_inventory(&self, player: &str) -> Result<Vec<Item>, WorldError> {
        let w = self.read();
        let p = w.players.get(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        Ok(p.inventory.clone())
    }

    pub fn find_inventory_item(&self, player: &str, token: &str) -> Result<Item, WorldError> {
        let w = self.read();
        let p = w.players.get(player).ok_or_else(|| WorldError::PlayerNotFound(player.to_string()))?;
        let idx = find_match_index(token, &p.inventory, |i| i.name.as_str()).ok_or(WorldError::ItemNotCarried)?;
        Ok(p.inventory[idx].clone())
    }

    pub fn find_room_item(&self, room: &str, token: &str) -> Result<Item, WorldError> {
        let w = self.read();
        let r = w.rooms.get(room).ok_or_else(|| WorldError::RoomNotFound(room.to_string()))?;
        let idx = find_match_index(token, &r.items, |i| i.name.as_str()).ok_or(WorldError::ItemNotFound)?;
        Ok(r.items[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaData;
    use crate::model::Room;
    use std::sync::Arc;

    struct FixedArea(Vec<Room>);
    impl crate::area::AreaLoader for FixedArea {
        fn load(&self) -> Result<AreaData, String> {
            Ok(AreaData { rooms: self.0.clone(), quests: vec![] })
        }
    }

    #[test]
    fn take_then_drop_round_trips() {
        let mut room = Room::new("r1", "Room", "desc");
        room.items.push(Item::new("Sword", "a rusty sword"));
        let world = World::new(Arc::new(FixedArea(vec![room])), "r1").unwrap();
        world.add_player("Hero", "r1", "r1", Default::default(), tokio::sync::mpsc::channel(32).0).unwrap();

        world.take_item("Hero", "r1", "sword").unwrap();
        assert!(world.find_room_item("r1", "sword").is_err());
        assert_eq!(world.player_inventory("Hero").unwrap().len(), 1);

        world.drop_item("Hero", "r1", "sword").unwrap();
        assert!(world.find_inventory_item("Hero", "sword").is_err());
        assert_eq!(world.find_room_item("r1", "sword").unwrap().name, "Sword");
    }
}
