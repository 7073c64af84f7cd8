//! General-capability commands: help, navigation aids, self-inspection,
//! identity, and session teardown.

use crate::error::CommandError;
use crate::model::Role;

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "help",
            aliases: &[],
            shortcut: None,
            usage: "help",
            description: "List commands available to everyone.",
            capability: Capability::General,
            handler: help,
        },
        CommandDescriptor {
            name: "buildhelp",
            aliases: &[],
            shortcut: None,
            usage: "buildhelp",
            description: "List Builder commands.",
            capability: Capability::Builder,
            handler: buildhelp,
        },
        CommandDescriptor {
            name: "wizhelp",
            aliases: &[],
            shortcut: None,
            usage: "wizhelp",
            description: "List Admin commands.",
            capability: Capability::Admin,
            handler: wizhelp,
        },
        CommandDescriptor {
            name: "look",
            aliases: &["l"],
            shortcut: None,
            usage: "look",
            description: "Describe the room you're standing in.",
            capability: Capability::General,
            handler: look,
        },
        CommandDescriptor {
            name: "who",
            aliases: &[],
            shortcut: None,
            usage: "who",
            description: "List connected players.",
            capability: Capability::General,
            handler: who,
        },
        CommandDescriptor {
            name: "stats",
            aliases: &[],
            shortcut: None,
            usage: "stats",
            description: "Show your level, health, and mana.",
            capability: Capability::General,
            handler: stats,
        },
        CommandDescriptor {
            name: "quit",
            aliases: &["q"],
            shortcut: None,
            usage: "quit",
            description: "Disconnect from the server.",
            capability: Capability::General,
            handler: quit,
        },
        CommandDescriptor {
            name: "name",
            aliases: &[],
            shortcut: None,
            usage: "name <new name>",
            description: "Change your display name.",
            capability: Capability::General,
            handler: rename,
        },
        CommandDescriptor {
            name: "sethome",
            aliases: &[],
            shortcut: None,
            usage: "sethome",
            description: "Bind your home to the room you're standing in.",
            capability: Capability::General,
            handler: sethome,
        },
        CommandDescriptor {
            name: "recall",
            aliases: &[],
            shortcut: None,
            usage: "recall",
            description: "Teleport to your home room.",
            capability: Capability::General,
            handler: recall,
        },
        CommandDescriptor {
            name: "emote",
            aliases: &[":"],
            shortcut: None,
            usage: "emote <action>",
            description: "Perform a visible action in the room.",
            capability: Capability::General,
            handler: emote,
        },
    ]
}

fn help(ctx: &Context) -> HandlerResult {
    ctx.tell("Available commands:");
    for cmd in ctx.app.registry.all() {
        if cmd.capability == Capability::General {
            ctx.tell(format!("  {:<12} {}", cmd.usage, cmd.description));
        }
    }
    Ok(false)
}

fn buildhelp(ctx: &Context) -> HandlerResult {
    if !ctx.has_role(Role::Builder) {
        return Err(CommandError::Capability);
    }
    ctx.tell("Builder commands:");
    for cmd in ctx.app.registry.all() {
        if cmd.capability == Capability::Builder {
            ctx.tell(format!("  {:<12} {}", cmd.usage, cmd.description));
        }
    }
    Ok(false)
}

fn wizhelp(ctx: &Context) -> HandlerResult {
    if !ctx.has_role(Role::Admin) {
        return Err(CommandError::Capability);
    }
    ctx.tell("Admin commands:");
    for cmd in ctx.app.registry.all() {
        if cmd.capability == Capability::Admin {
            ctx.tell(format!("  {:<12} {}", cmd.usage, cmd.description));
        }
    }
    Ok(false)
}

/// Renders a room block: title, description, exits (sorted alphabetically,
/// or "none"), NPCs, items, and other players present. Takes the viewing
/// player's own name directly (rather than a full `Context`) so the
/// connection orchestrator can reuse it before a command context exists.
pub fn render_room_for(app: &super::super::AppState, viewer: &str, room_id: &str) -> String {
    let w = app.world.read();
    let Some(room) = w.rooms.get(room_id) else {
        return "You are nowhere.".to_string();
    };
    let mut out = format!("{}\n{}\nExits: {}", room.title, room.description, room.exits_description());
    if !room.npcs.is_empty() {
        let names: Vec<&str> = room.npcs.iter().map(|n| n.name.as_str()).collect();
        out.push_str(&format!("\nYou see: {}", names.join(", ")));
    }
    if !room.items.is_empty() {
        let names: Vec<&str> = room.items.iter().map(|i| i.name.as_str()).collect();
        out.push_str(&format!("\nOn the ground: {}", names.join(", ")));
    }
    let others: Vec<&str> = w
        .players
        .values()
        .filter(|p| p.alive && p.room == room_id && p.name != viewer)
        .map(|p| p.name.as_str())
        .collect();
    if !others.is_empty() {
        out.push_str(&format!("\nAlso here: {}", others.join(", ")));
    }
    out
}

pub fn render_room(ctx: &Context, room_id: &str) -> String {
    render_room_for(ctx.app, &ctx.player, room_id)
}

fn look(ctx: &Context) -> HandlerResult {
    let room = ctx.current_room();
    ctx.tell(render_room(ctx, &room));
    Ok(false)
}

fn who(ctx: &Context) -> HandlerResult {
    let w = ctx.app.world.read();
    ctx.tell("Connected players:");
    let mut names: Vec<&str> = w.players.values().filter(|p| p.alive).map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    for name in names {
        ctx.tell(format!("  {}", name));
    }
    Ok(false)
}

fn stats(ctx: &Context) -> HandlerResult {
    let w = ctx.app.world.read();
    let Some(p) = w.players.get(&ctx.player) else { return Ok(false) };
    ctx.tell(format!(
        "Level {} - HP {}/{} - Mana {}/{} - XP {}",
        p.combat.level, p.combat.health, p.combat.max_health, p.combat.mana, p.combat.max_mana, p.combat.experience
    ));
    Ok(false)
}

fn quit(ctx: &Context) -> HandlerResult {
    ctx.tell("Farewell.");
    Ok(true)
}

fn rename(ctx: &Context) -> HandlerResult {
    let new_name = ctx.arg.trim();
    if new_name.is_empty() || new_name.contains(char::is_whitespace) {
        return Err(CommandError::validation("usage: name <new name>"));
    }
    ctx.app.world.rename_player(&ctx.player, new_name)?;
    *ctx.renamed_to.borrow_mut() = Some(new_name.to_string());
    ctx.tell(format!("You are now known as {}.", new_name));
    Ok(false)
}

fn sethome(ctx: &Context) -> HandlerResult {
    let room = ctx.current_room();
    {
        let mut w = ctx.app.world.write();
        if let Some(p) = w.players.get_mut(&ctx.player) {
            p.home = room.clone();
        }
    }
    let _ = ctx.app.accounts.set_home(&ctx.player, &room);
    ctx.tell("This room is now your home.");
    Ok(false)
}

fn recall(ctx: &Context) -> HandlerResult {
    let home = ctx.app.world.read().players.get(&ctx.player).map(|p| p.home.clone()).unwrap_or_default();
    ctx.app.world.move_to_room(&ctx.player, &home)?;
    ctx.tell(render_room(ctx, &home));
    Ok(false)
}

fn emote(ctx: &Context) -> HandlerResult {
    if ctx.arg.trim().is_empty() {
        return Err(CommandError::validation("usage: emote <action>"));
    }
    let room = ctx.current_room();
    let line = format!("{} {}", ctx.player, ctx.arg.trim());
    ctx.app.world.broadcast_to_room(&room, &line, None);
    Ok(false)
}
