//! Channel & Broadcast Engine (C5) surface, plus tells and the mail board.

use crate::error::CommandError;
use crate::model::{Channel, CHANNEL_HISTORY_DEFAULT};

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "say",
            aliases: &[],
            shortcut: None,
            usage: "say <message>",
            description: "Speak to the room.",
            capability: Capability::General,
            handler: say,
        },
        CommandDescriptor {
            name: "whisper",
            aliases: &[],
            shortcut: None,
            usage: "whisper <message>",
            description: "Speak to this room and adjacent rooms.",
            capability: Capability::General,
            handler: whisper,
        },
        CommandDescriptor {
            name: "yell",
            aliases: &[],
            shortcut: None,
            usage: "yell <message>",
            description: "Shout to the entire world.",
            capability: Capability::General,
            handler: yell,
        },
        CommandDescriptor {
            name: "ooc",
            aliases: &[],
            shortcut: None,
            usage: "ooc <message>",
            description: "Out-of-character chat, world-wide.",
            capability: Capability::General,
            handler: ooc,
        },
        CommandDescriptor {
            name: "tell",
            aliases: &[],
            shortcut: None,
            usage: "tell <player> <message>",
            description: "Send a private message, queued if the player is offline.",
            capability: Capability::General,
            handler: tell,
        },
        CommandDescriptor {
            name: "mail",
            aliases: &[],
            shortcut: None,
            usage: "mail <board> [read|write <recipients>; <body>]",
            description: "Read or post to a public message board.",
            capability: Capability::General,
            handler: mail,
        },
        CommandDescriptor {
            name: "history",
            aliases: &[],
            shortcut: None,
            usage: "history <channel> [count]",
            description: "Show your recent scrollback for a channel.",
            capability: Capability::General,
            handler: history,
        },
        CommandDescriptor {
            name: "channel",
            aliases: &[],
            shortcut: None,
            usage: "channel <name> on|off|mute|unmute|alias <token>",
            description: "Configure your channel subscriptions, mutes, and aliases.",
            capability: Capability::General,
            handler: channel_cmd,
        },
        CommandDescriptor {
            name: "channels",
            aliases: &[],
            shortcut: None,
            usage: "channels",
            description: "List channels and your current subscription state.",
            capability: Capability::General,
            handler: channels,
        },
    ]
}

fn say(ctx: &Context) -> HandlerResult {
    let msg = ctx.arg.trim();
    if msg.is_empty() {
        return Err(CommandError::validation("usage: say <message>"));
    }
    let room = ctx.current_room();
    let rendered = format!("{} says: {}", ctx.player, msg);
    ctx.app.world.broadcast_to_room_channel(&room, Channel::Say, &rendered, Some(&ctx.player));
    ctx.app.world.record_player_channel_message(&ctx.player, Channel::Say, &rendered, now());
    ctx.tell(format!("You say: {}", msg));
    Ok(false)
}

fn whisper(ctx: &Context) -> HandlerResult {
    let msg = ctx.arg.trim();
    if msg.is_empty() {
        return Err(CommandError::validation("usage: whisper <message>"));
    }
    let room = ctx.current_room();
    let mut rooms = ctx.app.world.adjacent_rooms(&room);
    rooms.push(room.clone());
    let rendered = format!("{} whispers: {}", ctx.player, msg);
    ctx.app.world.broadcast_to_rooms_channel(&rooms, Channel::Whisper, &rendered, Some(&ctx.player));
    ctx.app.world.record_player_channel_message(&ctx.player, Channel::Whisper, &rendered, now());
    ctx.tell(format!("You whisper: {}", msg));
    Ok(false)
}

fn yell(ctx: &Context) -> HandlerResult {
    let msg = ctx.arg.trim();
    if msg.is_empty() {
        return Err(CommandError::validation("usage: yell <message>"));
    }
    let rendered = format!("{} yells: {}", ctx.player, msg);
    ctx.app.world.broadcast_to_all_channel(Channel::Yell, &rendered, Some(&ctx.player));
    ctx.app.world.record_player_channel_message(&ctx.player, Channel::Yell, &rendered, now());
    ctx.tell(format!("You yell: {}", msg));
    Ok(false)
}

fn ooc(ctx: &Context) -> HandlerResult {
    let msg = ctx.arg.trim();
    if msg.is_empty() {
        return Err(CommandError::validation("usage: ooc <message>"));
    }
    let rendered = format!("[OOC] {}: {}", ctx.player, msg);
    ctx.app.world.broadcast_to_all_channel(Channel::Ooc, &rendered, Some(&ctx.player));
    ctx.app.world.record_player_channel_message(&ctx.player, Channel::Ooc, &rendered, now());
    ctx.tell(format!("[OOC] You: {}", msg));
    Ok(false)
}

fn tell(ctx: &Context) -> HandlerResult {
    let mut parts = ctx.arg.splitn(2, char::is_whitespace);
    let target_token = parts.next().unwrap_or("");
    let body = parts.next().unwrap_or("").trim();
    if target_token.is_empty() || body.is_empty() {
        return Err(CommandError::validation("usage: tell <player> <message>"));
    }

    if let Some(online) = ctx.app.world.find_player(target_token) {
        let rendered = format!("{} tells you: {}", ctx.player, body);
        if let Some(p) = ctx.app.world.read().players.get(&online) {
            p.enqueue(rendered);
        }
        ctx.tell(format!("You tell {}: {}", online, body));
        return Ok(false);
    }

    let canonical = ctx.app.accounts.canonical_name(target_token).ok_or_else(|| CommandError::validation(format!("no player named '{}'", target_token)))?;
    ctx.app.tells.queue(&ctx.player, &canonical, body, now())?;
    ctx.tell(format!("{} is offline; your message has been queued.", canonical));
    Ok(false)
}

fn mail(ctx: &Context) -> HandlerResult {
    let mut parts = ctx.arg.splitn(2, char::is_whitespace);
    let board = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim();
    if board.is_empty() {
        return Err(CommandError::validation("usage: mail <board> [read|write <recipients>; <body>]"));
    }

    if rest.is_empty() || rest.eq_ignore_ascii_case("read") {
        let messages = ctx.app.mail.messages(board);
        if messages.is_empty() {
            ctx.tell(format!("Board '{}' has no messages.", board));
        } else {
            ctx.tell(format!("Board '{}':", board));
            for m in messages {
                ctx.tell(format!("  #{} from {}: {}", m.id, m.author, m.body));
            }
        }
        return Ok(false);
    }

    let write_body = rest.strip_prefix("write").map(|s| s.trim()).unwrap_or(rest);
    let (recipients_part, body) = match write_body.split_once(';') {
        Some((r, b)) => (r.trim(), b.trim()),
        None => ("", write_body),
    };
    let recipients: Vec<String> = recipients_part.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
    let posted = ctx.app.mail.write(board, &ctx.player, recipients, body, now())?;
    ctx.tell(format!("Posted to '{}' as #{}.", board, posted.id));
    Ok(false)
}

fn history(ctx: &Context) -> HandlerResult {
    let mut parts = ctx.arg.splitn(2, char::is_whitespace);
    let token = parts.next().unwrap_or("");
    let count: usize = parts.next().and_then(|s| s.trim().parse().ok()).unwrap_or(CHANNEL_HISTORY_DEFAULT);
    let channel = ctx.app.world.resolve_channel_token(&ctx.player, token).ok_or_else(|| CommandError::validation(format!("unknown channel '{}'", token)))?;
    let entries = ctx.app.world.channel_history(&ctx.player, channel, count);
    if entries.is_empty() {
        ctx.tell(format!("No history for {}.", channel.name()));
    } else {
        ctx.tell(format!("Recent {} history:", channel.name()));
        for (_, line) in entries {
            ctx.tell(format!("  {}", line));
        }
    }
    Ok(false)
}

fn channel_cmd(ctx: &Context) -> HandlerResult {
    let mut parts = ctx.arg.splitn(2, char::is_whitespace);
    let token = parts.next().unwrap_or("");
    let action = parts.next().unwrap_or("").trim();
    let channel = ctx.app.world.resolve_channel_token(&ctx.player, token).ok_or_else(|| CommandError::validation(format!("unknown channel '{}'", token)))?;

    let (verb, rest) = match action.split_once(char::is_whitespace) {
        Some((v, r)) => (v.to_ascii_lowercase(), r.trim().to_string()),
        None => (action.to_ascii_lowercase(), String::new()),
    };

    match verb.as_str() {
        "on" => {
            ctx.app.world.set_channel(&ctx.player, channel, true)?;
            ctx.tell(format!("{} channel enabled.", channel.name()));
        }
        "off" => {
            ctx.app.world.set_channel(&ctx.player, channel, false)?;
            ctx.tell(format!("{} channel disabled.", channel.name()));
        }
        "mute" => {
            ctx.app.world.set_channel_mute(&ctx.player, channel, true)?;
            ctx.tell(format!("{} channel muted.", channel.name()));
        }
        "unmute" => {
            ctx.app.world.set_channel_mute(&ctx.player, channel, false)?;
            ctx.tell(format!("{} channel unmuted.", channel.name()));
        }
        "alias" => {
            if rest.is_empty() {
                return Err(CommandError::validation("usage: channel <name> alias <token>"));
            }
            ctx.app.world.set_channel_alias(&ctx.player, channel, Some(rest.clone()))?;
            ctx.tell(format!("{} aliased to '{}'.", channel.name(), rest));
        }
        _ => return Err(CommandError::validation("usage: channel <name> on|off|mute|unmute|alias <token>")),
    }
    let prefs = ctx.app.world.channel_prefs_snapshot(&ctx.player, channel);
    let _ = ctx.app.accounts.set_channel_prefs(&ctx.player, channel, prefs);
    Ok(false)
}

fn channels(ctx: &Context) -> HandlerResult {
    ctx.tell("Channels:");
    for channel in Channel::all() {
        let muted = ctx.app.world.channel_muted(&ctx.player, *channel);
        ctx.tell(format!("  {} - {}", channel.name(), if muted { "muted" } else { "active" }));
    }
    Ok(false)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
