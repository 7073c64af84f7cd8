//! `attack` and `cast`, dispatched end-to-end through the goblin fixture in
//! the garden: defeat, loot narration, XP, and quest kill-tracking.

mod common;

use emberhold::commands::dispatch;
use tempfile::tempdir;

fn app(world: emberhold::world::World) -> std::sync::Arc<emberhold::commands::AppState> {
    let dir = tempdir().unwrap();
    common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"))
}

#[test]
fn attacking_twice_defeats_the_ten_health_goblin() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Fighter", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Fighter", "attack goblin"));
    let first = common::drain(&mut rx);
    assert!(first.iter().any(|l| l.contains("You hit Goblin for 5 damage")));
    assert!(!first.iter().any(|l| l.contains("defeated")));

    assert!(!dispatch(&app, "Fighter", "attack goblin"));
    let second = common::drain(&mut rx);
    assert!(second.iter().any(|l| l.contains("defeated")));
    assert!(second.iter().any(|l| l.contains("experience")));

    assert!(app.world.read().rooms.get("garden").unwrap().npcs.is_empty());
}

#[test]
fn defeating_the_goblin_drops_its_loot_into_the_room() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Fighter", "garden", &[]);
    let app = app(world);

    dispatch(&app, "Fighter", "attack goblin");
    common::drain(&mut rx);
    dispatch(&app, "Fighter", "attack goblin");
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("drops: Coin")));

    let garden = app.world.read().rooms.get("garden").unwrap().clone();
    assert!(garden.items.iter().any(|i| i.name == "Coin"));
}

#[test]
fn cast_heal_costs_mana_and_fails_without_enough() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Caster", "start", &[]);
    let app = app(world);

    {
        let mut w = app.world.write();
        let p = w.players.get_mut("Caster").unwrap();
        p.combat.mana = 5;
    }

    assert!(!dispatch(&app, "Caster", "cast heal"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("mana")));
}

#[test]
fn cast_bolt_can_defeat_the_goblin_and_record_the_kill() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Mage", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Mage", "quest accept Clear the Garden"));
    common::drain(&mut rx);

    assert!(!dispatch(&app, "Mage", "cast bolt goblin"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("strikes Goblin")));
    assert!(lines.iter().any(|l| l.contains("defeated")));

    assert!(!dispatch(&app, "Mage", "go west"));
    common::drain(&mut rx);

    assert!(!dispatch(&app, "Mage", "quest complete Clear the Garden"));
    let completed = common::drain(&mut rx);
    assert!(completed.iter().any(|l| l.contains("thanks you for clearing the garden")));
}

#[test]
fn quest_completion_is_rejected_away_from_the_turn_in_npc() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Mage", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Mage", "quest accept Clear the Garden"));
    common::drain(&mut rx);

    assert!(!dispatch(&app, "Mage", "cast bolt goblin"));
    common::drain(&mut rx);

    assert!(!dispatch(&app, "Mage", "quest complete Clear the Garden"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("Guard")));
    assert!(!lines.iter().any(|l| l.contains("thanks you for clearing the garden")));
}
