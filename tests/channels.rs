//! Speech channels, tells (online and offline), and the mail board,
//! dispatched end-to-end rather than poked through `World` directly.

mod common;

use emberhold::commands::dispatch;
use tempfile::tempdir;

#[test]
fn say_is_heard_in_the_same_room_only() {
    let world = common::two_room_world();
    let mut rx_speaker = common::spawn_player(&world, "Speaker", "start", &[]);
    let mut rx_same_room = common::spawn_player(&world, "Listener", "start", &[]);
    let mut rx_other_room = common::spawn_player(&world, "FarAway", "garden", &[]);
    let dir = tempdir().unwrap();
    let app = common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"));

    assert!(!dispatch(&app, "Speaker", "say hello there"));
    common::drain(&mut rx_speaker);

    let heard = common::drain(&mut rx_same_room);
    assert!(heard.iter().any(|l| l.contains("Speaker says: hello there")));
    let heard_far = common::drain(&mut rx_other_room);
    assert!(heard_far.is_empty());
}

#[test]
fn tell_delivers_directly_to_an_online_player() {
    let world = common::two_room_world();
    let mut rx_sender = common::spawn_player(&world, "Sender", "start", &[]);
    let mut rx_recipient = common::spawn_player(&world, "Recipient", "garden", &[]);
    let dir = tempdir().unwrap();
    let app = common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"));

    assert!(!dispatch(&app, "Sender", "tell Recipient are you there"));
    common::drain(&mut rx_sender);
    let lines = common::drain(&mut rx_recipient);
    assert!(lines.iter().any(|l| l.contains("Sender tells you: are you there")));
}

#[test]
fn tell_to_an_offline_account_is_queued_and_delivered_on_reconnect() {
    let world = common::two_room_world();
    let mut rx_sender = common::spawn_player(&world, "Sender", "start", &[]);
    let dir = tempdir().unwrap();
    let accounts_path = dir.path().join("a.json");
    {
        let store = emberhold::stores::AccountStore::load(&accounts_path).unwrap();
        store.register("Offline", "hunter22").unwrap();
    }
    let app = common::test_app(world, &accounts_path, &dir.path().join("m.json"), &dir.path().join("t.json"));

    assert!(!dispatch(&app, "Sender", "tell Offline pick up groceries"));
    let lines = common::drain(&mut rx_sender);
    assert!(lines.iter().any(|l| l.contains("offline")));

    let queued = app.tells.pending_for("Offline");
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].sender, "Sender");
    assert_eq!(queued[0].body, "pick up groceries");
}

#[test]
fn mail_board_write_then_read_round_trips() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Clerk", "start", &[]);
    let dir = tempdir().unwrap();
    let app = common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"));

    assert!(!dispatch(&app, "Clerk", "mail notices write ; the well is being repaired"));
    common::drain(&mut rx);

    assert!(!dispatch(&app, "Clerk", "mail notices read"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.contains("the well is being repaired")));
}

#[test]
fn muting_a_channel_is_reflected_in_the_channels_listing() {
    let world = common::two_room_world();
    let mut rx = common::spawn_player(&world, "Quietist", "start", &[]);
    let dir = tempdir().unwrap();
    let app = common::test_app(world, &dir.path().join("a.json"), &dir.path().join("m.json"), &dir.path().join("t.json"));

    assert!(!dispatch(&app, "Quietist", "channel yell mute"));
    common::drain(&mut rx);
    assert!(!dispatch(&app, "Quietist", "channels"));
    let lines = common::drain(&mut rx);
    assert!(lines.iter().any(|l| l.to_lowercase().contains("yell") && l.to_lowercase().contains("muted")));
}
