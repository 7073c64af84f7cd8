//! Movement: `go <direction>` plus its compass-point aliases and `g`
//! shortcut. Arrival/departure narration is broadcast to the rooms on both
//! ends of the exit.

use crate::error::CommandError;

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};
use super::general::render_room;

pub fn commands() -> Vec<CommandDescriptor> {
    vec![CommandDescriptor {
        name: "go",
        aliases: &["n", "s", "e", "w", "u", "d", "up", "down"],
        shortcut: Some('g'),
        usage: "go <direction>",
        description: "Move through an exit (n/s/e/w/u/d, or go <direction>).",
        capability: Capability::General,
        handler: go,
    }]
}

fn alias_direction(input: &str) -> Option<&'static str> {
    match input {
        "n" => Some("north"),
        "s" => Some("south"),
        "e" => Some("east"),
        "w" => Some("west"),
        "u" | "up" => Some("up"),
        "d" | "down" => Some("down"),
        _ => None,
    }
}

fn go(ctx: &Context) -> HandlerResult {
    let direction = match alias_direction(&ctx.input) {
        Some(d) => d.to_string(),
        None => {
            if ctx.arg.trim().is_empty() {
                return Err(CommandError::validation("usage: go <direction>"));
            }
            ctx.arg.trim().to_ascii_lowercase()
        }
    };

    let from_room = ctx.current_room();
    let outcome = ctx.app.world.mv(&ctx.player, &direction)?;
    // Both narrations name the direction of travel, not the reverse exit -
    // "arrives from <direction>" reads as "arrives, having gone <direction>".
    ctx.app.world.broadcast_to_room(&from_room, &format!("{} leaves {}.", ctx.player, direction), Some(&ctx.player));
    ctx.app.world.broadcast_to_room(&outcome.to_room, &format!("{} arrives from {}.", ctx.player, direction), Some(&ctx.player));
    ctx.tell(render_room(ctx, &outcome.to_room));
    Ok(false)
}
