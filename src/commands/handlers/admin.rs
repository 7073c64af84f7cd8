//! Admin-capability commands: world reboot, player relocation, command
//! kill-switches, Builder-role promotion, and forced channel mutes.

use crate::error::CommandError;
use crate::model::{Channel, Role};

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "reboot",
            aliases: &[],
            shortcut: None,
            usage: "reboot",
            description: "Reload area data and return every connected player to the start room.",
            capability: Capability::Admin,
            handler: reboot,
        },
        CommandDescriptor {
            name: "summon",
            aliases: &[],
            shortcut: None,
            usage: "summon <player>",
            description: "Teleport a player to your room.",
            capability: Capability::Admin,
            handler: summon,
        },
        CommandDescriptor {
            name: "command",
            aliases: &[],
            shortcut: None,
            usage: "command <name> on|off",
            description: "Enable or disable a command server-wide.",
            capability: Capability::Admin,
            handler: command_toggle,
        },
        CommandDescriptor {
            name: "builder",
            aliases: &[],
            shortcut: None,
            usage: "builder <player> on|off",
            description: "Grant or revoke the Builder role for a player.",
            capability: Capability::Admin,
            handler: builder_toggle,
        },
        CommandDescriptor {
            name: "mute",
            aliases: &[],
            shortcut: None,
            usage: "mute <player> [channel]",
            description: "Mute a player on one channel, or every channel.",
            capability: Capability::Admin,
            handler: mute,
        },
        CommandDescriptor {
            name: "unmute",
            aliases: &[],
            shortcut: None,
            usage: "unmute <player> [channel]",
            description: "Lift a mute on one channel, or every channel.",
            capability: Capability::Admin,
            handler: unmute,
        },
    ]
}

fn require_admin(ctx: &Context) -> Result<(), CommandError> {
    if ctx.has_role(Role::Admin) {
        Ok(())
    } else {
        Err(CommandError::Capability)
    }
}

fn reboot(ctx: &Context) -> HandlerResult {
    require_admin(ctx)?;
    let reconnected = ctx.app.world.reboot()?;
    ctx.tell(format!("World rebooted. {} player(s) returned to the start room.", reconnected.len()));
    for name in &reconnected {
        if name != &ctx.player {
            if let Some(p) = ctx.app.world.read().players.get(name) {
                p.enqueue("The world shudders and resets around you.".to_string());
            }
        }
    }
    Ok(false)
}

fn summon(ctx: &Context) -> HandlerResult {
    require_admin(ctx)?;
    let target_token = ctx.arg.trim();
    if target_token.is_empty() {
        return Err(CommandError::validation("usage: summon <player>"));
    }
    let target = ctx
        .app
        .world
        .find_player(target_token)
        .ok_or_else(|| CommandError::validation(format!("no player named '{}'", target_token)))?;
    let room = ctx.current_room();
    ctx.app.world.move_to_room(&target, &room)?;
    ctx.tell(format!("Summoned {} to your room.", target));
    if let Some(p) = ctx.app.world.read().players.get(&target) {
        p.enqueue(format!("You are summoned by {}.", ctx.player));
    }
    Ok(false)
}

fn command_toggle(ctx: &Context) -> HandlerResult {
    require_admin(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let name = parts.next().unwrap_or("");
    let state = parts.next().unwrap_or("").to_ascii_lowercase();
    if name.is_empty() || (state != "on" && state != "off") {
        return Err(CommandError::validation("usage: command <name> on|off"));
    }
    ctx.app.world.set_command_disabled(name, state == "off");
    ctx.tell(format!("Command '{}' is now {}.", name, state));
    Ok(false)
}

fn builder_toggle(ctx: &Context) -> HandlerResult {
    require_admin(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let target_token = parts.next().unwrap_or("");
    let state = parts.next().unwrap_or("").to_ascii_lowercase();
    if target_token.is_empty() || (state != "on" && state != "off") {
        return Err(CommandError::validation("usage: builder <player> on|off"));
    }
    let enabled = state == "on";

    let target = ctx
        .app
        .world
        .find_player(target_token)
        .unwrap_or_else(|| target_token.to_string());
    {
        let mut w = ctx.app.world.write();
        if let Some(p) = w.players.get_mut(&target) {
            if enabled {
                p.roles.insert(Role::Builder);
            } else {
                p.roles.remove(&Role::Builder);
            }
        }
    }
    ctx.app.accounts.set_role(&target, Role::Builder, enabled)?;
    ctx.tell(format!("{} is {} a Builder.", target, if enabled { "now" } else { "no longer" }));
    Ok(false)
}

fn resolve_channel_arg(token: &str) -> Result<Option<Channel>, CommandError> {
    if token.is_empty() {
        return Ok(None);
    }
    Channel::resolve_token(token).map(Some).ok_or_else(|| CommandError::validation(format!("unknown channel '{}'", token)))
}

fn mute(ctx: &Context) -> HandlerResult {
    require_admin(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let target_token = parts.next().unwrap_or("");
    let channel_token = parts.next().unwrap_or("");
    if target_token.is_empty() {
        return Err(CommandError::validation("usage: mute <player> [channel]"));
    }
    let target = ctx
        .app
        .world
        .find_player(target_token)
        .ok_or_else(|| CommandError::validation(format!("no player named '{}'", target_token)))?;
    match resolve_channel_arg(channel_token)? {
        Some(channel) => {
            ctx.app.world.set_channel_mute(&target, channel, true)?;
            ctx.tell(format!("{} muted on {}.", target, channel.name()));
        }
        None => {
            for channel in Channel::all() {
                ctx.app.world.set_channel_mute(&target, *channel, true)?;
            }
            ctx.tell(format!("{} muted on every channel.", target));
        }
    }
    Ok(false)
}

fn unmute(ctx: &Context) -> HandlerResult {
    require_admin(ctx)?;
    let mut parts = ctx.arg.split_whitespace();
    let target_token = parts.next().unwrap_or("");
    let channel_token = parts.next().unwrap_or("");
    if target_token.is_empty() {
        return Err(CommandError::validation("usage: unmute <player> [channel]"));
    }
    let target = ctx
        .app
        .world
        .find_player(target_token)
        .ok_or_else(|| CommandError::validation(format!("no player named '{}'", target_token)))?;
    match resolve_channel_arg(channel_token)? {
        Some(channel) => {
            ctx.app.world.set_channel_mute(&target, channel, false)?;
            ctx.tell(format!("{} unmuted on {}.", target, channel.name()));
        }
        None => {
            for channel in Channel::all() {
                ctx.app.world.set_channel_mute(&target, *channel, false)?;
            }
            ctx.tell(format!("{} unmuted on every channel.", target));
        }
    }
    Ok(false)
}
