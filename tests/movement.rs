//! `go` and its compass aliases: exits, narration on both ends, and the
//! unknown-direction error path.

mod common;

use emberhold::commands::dispatch;
use emberhold::model::Role;
use tempfile::tempdir;

fn app(world: emberhold::world::World) -> std::sync::Arc<emberhold::commands::AppState> {
    let dir = tempdir().unwrap();
    common::test_app(world, &dir.path().join("accounts.json"), &dir.path().join("mail.json"), &dir.path().join("tells.json"))
}

#[test]
fn go_moves_through_an_exit_and_narrates_both_rooms() {
    let world = common::two_room_world();
    let mut rx_hero = common::spawn_player(&world, "Hero", "start", &[]);
    let mut rx_bystander = common::spawn_player(&world, "Bystander", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Hero", "go east"));
    common::drain(&mut rx_hero);

    assert_eq!(app.world.player_room("Hero").as_deref(), Some("garden"));
    let seen = common::drain(&mut rx_bystander);
    assert!(seen.iter().any(|l| l.contains("Hero arrives from east")));
}

#[test]
fn compass_alias_n_resolves_to_go_north() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Hero", "garden", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Hero", "w"));
    common::drain(&mut rx);
    assert_eq!(app.world.player_room("Hero").as_deref(), Some("start"));
}

#[test]
fn unknown_direction_is_reported_without_moving() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Hero", "start", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Hero", "go north"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.to_lowercase().contains("direction") || l.to_lowercase().contains("no exit")));
    assert_eq!(app.world.player_room("Hero").as_deref(), Some("start"));
}

#[test]
fn builder_goto_teleports_regardless_of_exits() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Builder1", "start", &[Role::Builder]);
    let app = app(world);

    assert!(!dispatch(&app, "Builder1", "goto garden"));
    common::drain(&mut rx);
    assert_eq!(app.world.player_room("Builder1").as_deref(), Some("garden"));
}

#[test]
fn goto_requires_builder_role() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Plain", "start", &[]);
    let app = app(world);

    assert!(!dispatch(&app, "Plain", "goto garden"));
    let lines = common::drain(&mut rx);
    assert!(!lines.is_empty());
    assert_eq!(app.world.player_room("Plain").as_deref(), Some("start"));
}
