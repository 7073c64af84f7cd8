//! Builder-capability commands: room creation and editing, reset
//! management, and free movement. Every edit records a new room revision;
//! `revnum` never overwrites history, it appends a revision whose content
//! matches the selected prior one.

use crate::error::CommandError;
use crate::model::Role;

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};
use super::general::render_room;

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "dig",
            aliases: &[],
            shortcut: None,
            usage: "dig <id> <title>; <description>",
            description: "Create a new room.",
            capability: Capability::Builder,
            handler: dig,
        },
        CommandDescriptor {
            name: "describe",
            aliases: &[],
            shortcut: None,
            usage: "describe <title>; <description>",
            description: "Rewrite the title/description of the room you're standing in.",
            capability: Capability::Builder,
            handler: describe,
        },
        CommandDescriptor {
            name: "setexit",
            aliases: &[],
            shortcut: None,
            usage: "setexit <direction> <room id>",
            description: "Set or overwrite an exit from the current room.",
            capability: Capability::Builder,
            handler: setexit,
        },
        CommandDescriptor {
            name: "link",
            aliases: &[],
            shortcut: None,
            usage: "link <direction> <room id> <reverse direction>",
            description: "Link the current room to another room in both directions.",
            capability: Capability::Builder,
            handler: link,
        },
        CommandDescriptor {
            name: "list",
            aliases: &[],
            shortcut: None,
            usage: "list",
            description: "List every room id known to the world.",
            capability: Capability::Builder,
            handler: list,
        },
        CommandDescriptor {
            name: "revnum",
            aliases: &[],
            shortcut: None,
            usage: "revnum <number>",
            description: "Revert the current room's title/description to a prior revision.",
            capability: Capability::Builder,
            handler: revnum,
        },
        CommandDescriptor {
            name: "reset",
            aliases: &[],
            shortcut: None,
            usage: "reset npc|item <name> [count] [level] [maxhealth] [experience]; <text>",
            description: "Create or update a reset rule for the current room and apply it.",
            capability: Capability::Builder,
            handler: reset,
        },
        CommandDescriptor {
            name: "clone",
            aliases: &[],
            shortcut: None,
            usage: "clone <source room id>",
            description: "Copy another room's NPCs, items, and resets into this room.",
            capability: Capability::Builder,
            handler: clone_room,
        },
        CommandDescriptor {
            name: "goto",
            aliases: &[],
            shortcut: None,
            usage: "goto <room id>",
            description: "Teleport yourself to a room id.",
            capability: Capability::Builder,
            handler: goto,
        },
        CommandDescriptor {
            name: "teleport",
            aliases: &[],
            shortcut: None,
            usage: "teleport <player> <room id>",
            description: "Teleport another player to a room id.",
            capability: Capability::Builder,
            handler: teleport,
        },
        CommandDescriptor {
            name: "where",
            aliases: &[],
            shortcut: None,
            usage: "where <player>",
            description: "Report which room a player currently occupies.",
            capability: Capability::Builder,
            handler: where_is,
        },
    ]
}

fn require_builder(ctx: &Context) -> Result<(), CommandError> {
    if ctx.has_role(Role::Builder) || ctx.has_role(Role::Admin) {
        Ok(())
    } else {
        Err(CommandError::Capability)
    }
}

/// Splits `"a; b"` into `("a", "b")`, trimming both halves.
fn split_semicolon(s: &str) -> (String, String) {
    match s.split_once(';') {
        Some((a, b)) => (a.trim().to_string(), b.trim().to_string()),
        None => (s.trim().to_string(), String::new()),
    }
}

fn dig(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let (head, description) = split_semicolon(&ctx.arg);
    let mut head_parts = head.splitn(2, char::is_whitespace);
    let id = head_parts.next().unwrap_or("").trim();
    let title = head_parts.next().unwrap_or("").trim();
    if id.is_empty() || title.is_empty() || description.is_empty() {
        return Err(CommandError::validation("usage: dig <id> <title>; <description>"));
    }
    ctx.app.world.create_room(id, title, &description)?;
    ctx.tell(format!("Room '{}' created.", id));
    Ok(false)
}

fn describe(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let (title, description) = split_semicolon(&ctx.arg);
    if title.is_empty() || description.is_empty() {
        return Err(CommandError::validation("usage: describe <title>; <description>"));
    }
    let room = ctx.current_room();
    ctx.app.world.update_room_title(&room, &title, &ctx.player)?;
    ctx.app.world.update_room_description(&room, &description, &ctx.player)?;
    ctx.tell("Room updated.");
    Ok(false)
}

fn setexit(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let direction = parts.next().unwrap_or("");
    let dest = parts.next().unwrap_or("");
    if direction.is_empty() || dest.is_empty() {
        return Err(CommandError::validation("usage: setexit <direction> <room id>"));
    }
    let room = ctx.current_room();
    ctx.app.world.set_exit(&room, direction, dest, &ctx.player)?;
    ctx.tell(format!("Exit '{}' now leads to '{}'.", direction, dest));
    Ok(false)
}

fn link(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let direction = parts.next().unwrap_or("");
    let dest = parts.next().unwrap_or("");
    let reverse = parts.next().unwrap_or("");
    if direction.is_empty() || dest.is_empty() || reverse.is_empty() {
        return Err(CommandError::validation("usage: link <direction> <room id> <reverse direction>"));
    }
    let room = ctx.current_room();
    ctx.app.world.link_rooms(&room, direction, dest, reverse, &ctx.player)?;
    ctx.tell(format!("Linked {} <-> {} ({} / {}).", room, dest, direction, reverse));
    Ok(false)
}

fn list(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let w = ctx.app.world.read();
    let mut ids: Vec<&str> = w.rooms.keys().map(|k| k.as_str()).collect();
    ids.sort_unstable();
    ctx.tell("Rooms:");
    for id in ids {
        ctx.tell(format!("  {}", id));
    }
    Ok(false)
}

fn revnum(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let number: u64 = ctx.arg.trim().parse().map_err(|_| CommandError::validation("usage: revnum <number>"))?;
    let room = ctx.current_room();
    ctx.app.world.revert_room_to_revision(&room, number, &ctx.player)?;
    ctx.tell(format!("Room reverted to revision {}.", number));
    Ok(false)
}

fn reset(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let (head, text) = split_semicolon(&ctx.arg);
    let mut parts = head.split_whitespace();
    let kind = parts.next().unwrap_or("").to_ascii_lowercase();
    let name = parts.next().unwrap_or("");
    if name.is_empty() {
        return Err(CommandError::validation("usage: reset npc|item <name> [count] [level] [maxhealth] [experience]; <text>"));
    }
    let count: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let level: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let max_health: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(10);
    let experience: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let room = ctx.current_room();
    let greet = if text.is_empty() { None } else { Some(text.clone()) };

    match kind.as_str() {
        "npc" => {
            ctx.app.world.upsert_room_npc_reset(&room, name, greet, count, level, max_health, experience)?;
        }
        "item" => {
            ctx.app.world.upsert_room_item_reset(&room, name, greet, count)?;
        }
        _ => return Err(CommandError::validation("usage: reset npc|item <name> ...")),
    }
    ctx.app.world.apply_room_resets(&room)?;
    ctx.tell(format!("Reset for '{}' saved and applied.", name));
    Ok(false)
}

fn clone_room(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let source = ctx.arg.trim();
    if source.is_empty() {
        return Err(CommandError::validation("usage: clone <source room id>"));
    }
    let dest = ctx.current_room();
    ctx.app.world.clone_room_population(source, &dest)?;
    ctx.tell(format!("Cloned population from '{}' into this room.", source));
    Ok(false)
}

fn goto(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let dest = ctx.arg.trim();
    if dest.is_empty() {
        return Err(CommandError::validation("usage: goto <room id>"));
    }
    ctx.app.world.move_to_room(&ctx.player, dest)?;
    ctx.tell(render_room(ctx, dest));
    Ok(false)
}

fn teleport(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let target_token = parts.next().unwrap_or("");
    let dest = parts.next().unwrap_or("");
    if target_token.is_empty() || dest.is_empty() {
        return Err(CommandError::validation("usage: teleport <player> <room id>"));
    }
    let target = ctx
        .app
        .world
        .find_player(target_token)
        .ok_or_else(|| CommandError::validation(format!("no player named '{}'", target_token)))?;
    ctx.app.world.move_to_room(&target, dest)?;
    ctx.tell(format!("Teleported {} to '{}'.", target, dest));
    if let Some(p) = ctx.app.world.read().players.get(&target) {
        p.enqueue("You are swept away to another place.".to_string());
    }
    Ok(false)
}

fn where_is(ctx: &Context) -> HandlerResult {
    require_builder(ctx)?;
    let target_token = ctx.arg.trim();
    if target_token.is_empty() {
        return Err(CommandError::validation("usage: where <player>"));
    }
    let target = ctx
        .app
        .world
        .find_player(target_token)
        .ok_or_else(|| CommandError::validation(format!("no player named '{}'", target_token)))?;
    let room = ctx.app.world.player_room(&target).unwrap_or_default();
    ctx.tell(format!("{} is in '{}'.", target, room));
    Ok(false)
}
