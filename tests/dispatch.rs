//! Dispatch-layer behavior that doesn't belong to any one command: capability
//! gating, disabled commands, unknown-command fallback, and fuzzy resolution.

mod common;

use emberhold::commands::dispatch;
use emberhold::model::Role;
use tempfile::tempdir;

fn app(world: emberhold::world::World) -> std::sync::Arc<emberhold::commands::AppState> {
    let dir = tempdir().unwrap();
    common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"))
}

#[test]
fn builder_only_command_is_rejected_for_a_general_player() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Plain", "start", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Plain", "dig annex The Annex; A small side room."));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("permission")));
    assert!(app.world.read().rooms.get("annex").is_none());
}

#[test]
fn builder_role_is_sufficient_for_a_builder_command() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Mason", "start", &[Role::Builder]);
    let app = app(world);

    assert!(!dispatch(&app, "Mason", "dig annex The Annex; A small side room."));
    common::drain(&mut rx);
    assert!(app.world.read().rooms.contains_key("annex"));
}

#[test]
fn admin_disabling_a_command_blocks_every_player() {
    let world = common::two_room_world();
    let mut rx_admin = common::spawn_player(&world, "Overseer", "start", &[Role::Admin]);
    let mut rx_plain = common::spawn_player(&world, "Plain", "start", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Overseer", "command say off"));
    common::drain(&mut rx_admin);

    assert!(!dispatch(&app, "Plain", "say can anyone hear me"));
    let lines = common::drain(&mut rx_plain);
    assert!(lines.iter().any(|l| l.contains("disabled")));
}

#[test]
fn unknown_command_with_no_near_match_tells_the_player_to_check_help() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Plain", "start", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Plain", "xyzzyqqqqqq"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("Unknown command")));
}

#[test]
fn a_small_typo_still_resolves_to_the_intended_command() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Plain", "start", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Plain", "sya hi"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("You say: hi")));
}
