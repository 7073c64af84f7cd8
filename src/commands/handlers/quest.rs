//! `quests`/`quest` against the Quest API, and `portal` against the
//! injected Portal Provider (C9).

use crate::error::CommandError;
use crate::model::{QuestObjective, Role};

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "quests",
            aliases: &[],
            shortcut: None,
            usage: "quests",
            description: "List quests offered here and your quest log.",
            capability: Capability::General,
            handler: quests,
        },
        CommandDescriptor {
            name: "quest",
            aliases: &[],
            shortcut: None,
            usage: "quest accept|complete <name>",
            description: "Accept or turn in a quest.",
            capability: Capability::General,
            handler: quest,
        },
        CommandDescriptor {
            name: "portal",
            aliases: &[],
            shortcut: None,
            usage: "portal",
            description: "Request a one-shot staff portal link.",
            capability: Capability::General,
            handler: portal,
        },
    ]
}

fn quests(ctx: &Context) -> HandlerResult {
    let room = ctx.current_room();
    let available = ctx.app.world.available_quests(&room);
    if available.is_empty() {
        ctx.tell("No one here offers a quest.");
    } else {
        ctx.tell("Offered here:");
        for q in &available {
            ctx.tell(format!("  {} - {}", q.name, q.description));
        }
    }

    let log = ctx.app.world.snapshot_quest_log(&ctx.player)?;
    if !log.is_empty() {
        ctx.tell("Your quest log:");
        for (id, progress) in log {
            let status = if progress.completed {
                "completed"
            } else if progress.accepted {
                "in progress"
            } else {
                continue;
            };
            ctx.tell(format!("  {} - {}", id, status));
        }
    }
    Ok(false)
}

fn quest(ctx: &Context) -> HandlerResult {
    let mut parts = ctx.arg.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or("").to_ascii_lowercase();
    let name = parts.next().unwrap_or("").trim();
    if name.is_empty() {
        return Err(CommandError::validation("usage: quest accept|complete <name>"));
    }

    match verb.as_str() {
        "accept" => {
            let accepted = ctx.app.world.accept_quest(&ctx.player, name)?;
            ctx.tell(format!("Quest accepted: {}", accepted.name));
            if !accepted.required_kills.is_empty() {
                let lines: Vec<String> = accepted
                    .required_kills
                    .iter()
                    .map(|o| match o {
                        QuestObjective::Kill { npc, count } => format!("kill {} ({})", npc, count),
                        QuestObjective::Item { item, count } => format!("bring {} ({})", item, count),
                    })
                    .collect();
                ctx.tell(format!("Objectives: {}", lines.join(", ")));
            }
        }
        "complete" => {
            let completion = ctx.app.world.complete_quest(&ctx.player, name)?;
            ctx.tell(completion.message);
            if completion.reward_xp > 0 {
                let levels = ctx.app.world.award_experience(&ctx.player, completion.reward_xp)?;
                ctx.tell(format!("You gain {} experience.", completion.reward_xp));
                if levels > 0 {
                    ctx.tell("You feel stronger!");
                }
            }
            if !completion.reward_items.is_empty() {
                let names: Vec<&str> = completion.reward_items.iter().map(|i| i.name.as_str()).collect();
                ctx.tell(format!("You receive: {}.", names.join(", ")));
            }
        }
        _ => return Err(CommandError::validation("usage: quest accept|complete <name>")),
    }
    Ok(false)
}

fn portal(ctx: &Context) -> HandlerResult {
    let Some(provider) = ctx.app.portal.clone() else {
        ctx.tell("The portal is not configured on this server.");
        return Ok(false);
    };
    let role = if ctx.has_role(Role::Admin) {
        Role::Admin
    } else if ctx.has_role(Role::Builder) {
        Role::Builder
    } else {
        Role::Moderator
    };
    let player = ctx.player.clone();
    let link = tokio::task::block_in_place(|| {
        tokio::runtime::Handle::current().block_on(provider.generate_link(role, &player))
    });
    match link {
        Ok(link) => ctx.tell(format!("Portal link (expires {}): {}", link.expires, link.url)),
        Err(e) => ctx.tell(format!("Could not generate a portal link: {}", e)),
    }
    Ok(false)
}
