//! Cross-store interactions: account registration survives a reload,
//! offline tells wait for a reconnect, and a revived player keeps the room
//! they were last in rather than being sent back to their home.

mod common;

use emberhold::commands::dispatch;
use emberhold::model::Channel;
use tempfile::tempdir;
use tokio::sync::mpsc;

#[test]
fn registered_accounts_survive_a_store_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("accounts.json");
    {
        let store = emberhold::stores::AccountStore::load(&path).unwrap();
        store.register("Wayfarer", "correct-horse").unwrap();
    }
    let reloaded = emberhold::stores::AccountStore::load(&path).unwrap();
    assert!(reloaded.exists("wayfarer"));
    assert_eq!(reloaded.authenticate("Wayfarer", "correct-horse").unwrap(), true);
    assert_eq!(reloaded.authenticate("Wayfarer", "wrong-password").unwrap(), false);
}

#[test]
fn offline_tell_is_still_queued_after_the_store_is_reloaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tells.json");
    {
        let store = emberhold::stores::TellStore::load(&path).unwrap();
        store.queue("Sender", "Sleeper", "wake up soon", 1000).unwrap();
    }
    let reloaded = emberhold::stores::TellStore::load(&path).unwrap();
    let mine = reloaded.pending_for("Sleeper");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].body, "wake up soon");
}

#[test]
fn a_reconnecting_player_keeps_their_last_room_not_their_home() {
    let world = common::two_room_world();
    let (tx, _rx) = mpsc::channel::<String>(32);
    world.add_player("Drifter", "garden", "start", std::collections::HashSet::new(), tx).unwrap();
    world.mv("Drifter", "west").unwrap();
    assert_eq!(world.player_room("Drifter").as_deref(), Some("start"));

    world.remove_player("Drifter");
    assert!(!world.read().players.get("Drifter").unwrap().alive);

    let (tx2, _rx2) = mpsc::channel::<String>(32);
    world.add_player("Drifter", "ignored-on-revive", "ignored-on-revive", std::collections::HashSet::new(), tx2).unwrap();
    assert_eq!(world.player_room("Drifter").as_deref(), Some("start"));
}

#[test]
fn channel_prefs_survive_a_mute_then_reconnect() {
    let world = common::two_room_world();
    let dir = tempdir().unwrap();
    let accounts_path = dir.path().join("a.json");
    let app = common::test_app(world, &accounts_path, &dir.path().join("m.json"), &dir.path().join("t.json"));
    app.accounts.register("Hush", "hunter22").unwrap();
    let mut rx = common::spawn_player(&app.world, "Hush", "start", &[]);

    assert!(!dispatch(&app, "Hush", "channel yell mute"));
    common::drain(&mut rx);
    assert!(app.accounts.get("Hush").unwrap().channel_prefs.get(&Channel::Yell).unwrap().muted);

    app.world.remove_player("Hush");
    let account = app.accounts.get("Hush").unwrap();
    app.world.hydrate_channel_prefs("Hush", &account.channel_prefs);
    assert!(app.world.channel_muted("Hush", Channel::Yell));
}

#[test]
fn everyone_admin_mode_grants_admin_capability_to_a_roleless_player() {
    let world = common::two_room_world();
    world.configure_privileges(true, false);
    let mut rx = common::spawn_player(&world, "Plain", "start", &[]);
    let dir = tempdir().unwrap();
    let app = common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"));

    assert!(!dispatch(&app, "Plain", "command say off"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("now off")));
}
