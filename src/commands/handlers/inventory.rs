//! Item handling: examine, pick up, drop, and list carried items.

use crate::error::CommandError;

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "inventory",
            aliases: &["inv", "i"],
            shortcut: None,
            usage: "inventory",
            description: "List what you're carrying.",
            capability: Capability::General,
            handler: inventory,
        },
        CommandDescriptor {
            name: "examine",
            aliases: &["exa"],
            shortcut: None,
            usage: "examine <target>",
            description: "Read the long description of an item here or carried.",
            capability: Capability::General,
            handler: examine,
        },
        CommandDescriptor {
            name: "get",
            aliases: &["take", "pickup"],
            shortcut: None,
            usage: "get <item>",
            description: "Pick up an item from the room.",
            capability: Capability::General,
            handler: get,
        },
        CommandDescriptor {
            name: "drop",
            aliases: &[],
            shortcut: None,
            usage: "drop <item>",
            description: "Drop a carried item on the ground.",
            capability: Capability::General,
            handler: drop,
        },
    ]
}

fn inventory(ctx: &Context) -> HandlerResult {
    let items = ctx.app.world.player_inventory(&ctx.player)?;
    if items.is_empty() {
        ctx.tell("You aren't carrying anything.");
    } else {
        ctx.tell("You are carrying:");
        for item in items {
            ctx.tell(format!("  {}", item.name));
        }
    }
    Ok(false)
}

fn examine(ctx: &Context) -> HandlerResult {
    if ctx.arg.trim().is_empty() {
        return Err(CommandError::validation("usage: examine <target>"));
    }
    let room = ctx.current_room();
    let item = ctx
        .app
        .world
        .find_inventory_item(&ctx.player, ctx.arg.trim())
        .or_else(|_| ctx.app.world.find_room_item(&room, ctx.arg.trim()))?;
    ctx.tell(format!("{}: {}", item.name, item.description));
    Ok(false)
}

fn get(ctx: &Context) -> HandlerResult {
    if ctx.arg.trim().is_empty() {
        return Err(CommandError::validation("usage: get <item>"));
    }
    let room = ctx.current_room();
    let item = ctx.app.world.take_item(&ctx.player, &room, ctx.arg.trim())?;
    ctx.tell(format!("You pick up {}.", item.name));
    Ok(false)
}

fn drop(ctx: &Context) -> HandlerResult {
    if ctx.arg.trim().is_empty() {
        return Err(CommandError::validation("usage: drop <item>"));
    }
    let room = ctx.current_room();
    let item = ctx.app.world.drop_item(&ctx.player, &room, ctx.arg.trim())?;
    ctx.tell(format!("You drop {}.", item.name));
    Ok(false)
}
