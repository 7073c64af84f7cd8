//! Built-in command table, grouped by theme. Each submodule exposes a
//! `commands()` function returning its slice of descriptors; `table()`
//! concatenates them for the registry to register at startup.

mod admin;
mod builder;
mod combat;
mod general;
mod inventory;
mod messaging;
mod movement;
mod quest;

use super::registry::CommandDescriptor;

pub use general::render_room_for;

pub fn table() -> Vec<CommandDescriptor> {
    let mut all = Vec::new();
    all.extend(general::commands());
    all.extend(movement::commands());
    all.extend(inventory::commands());
    all.extend(combat::commands());
    all.extend(messaging::commands());
    all.extend(quest::commands());
    all.extend(builder::commands());
    all.extend(admin::commands());
    all
}
