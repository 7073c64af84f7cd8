//! `reset`, `apply_room_resets`/`apply_all_resets` idempotency, and the
//! admin `reboot` command, all dispatched end-to-end.

mod common;

use emberhold::commands::dispatch;
use emberhold::model::Role;
use tempfile::tempdir;

fn app(world: emberhold::world::World) -> std::sync::Arc<emberhold::commands::AppState> {
    let dir = tempdir().unwrap();
    common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"))
}

#[test]
fn reset_npc_rule_repopulates_an_emptied_room() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Builder1", "garden", &[Role::Builder]);
    let app = app(world);

    assert!(!dispatch(&app, "Builder1", "reset npc Goblin 1 1 10 25; a snarling goblin"));
    common::drain(&mut rx);
    assert_eq!(app.world.read().rooms.get("garden").unwrap().npcs.len(), 1);

    {
        let mut w = app.world.write();
        w.rooms.get_mut("garden").unwrap().npcs.clear();
    }
    app.world.apply_room_resets("garden").unwrap();
    assert_eq!(app.world.read().rooms.get("garden").unwrap().npcs.len(), 1);
}

#[test]
fn applying_resets_twice_does_not_duplicate_npcs() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Builder1", "garden", &[Role::Builder]);
    let app = app(world);

    assert!(!dispatch(&app, "Builder1", "reset npc Goblin 2 1 10 25; a snarling goblin"));
    common::drain(&mut rx);
    app.world.apply_all_resets();
    app.world.apply_all_resets();
    let count = app.world.read().rooms.get("garden").unwrap().npcs.iter().filter(|n| n.name == "Goblin").count();
    assert_eq!(count, 2);
}

#[test]
fn reset_command_requires_builder_role() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Plain", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Plain", "reset npc Goblin 1; a snarling goblin"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("permission")));
}

#[test]
fn reboot_returns_every_connected_player_to_the_start_room() {
    let world = common::two_room_world();
    let mut rx_admin = common::spawn_player(&world, "Overseer", "garden", &[Role::Admin]);
    let mut rx_other = common::spawn_player(&world, "Wanderer", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Overseer", "reboot"));
    let lines = common::drain(&mut rx_admin);
    assert!(lines.iter().any(|l| l.contains("World rebooted")));
    common::drain(&mut rx_other);

    assert_eq!(app.world.player_room("Overseer").as_deref(), Some("start"));
    assert_eq!(app.world.player_room("Wanderer").as_deref(), Some("start"));
}
