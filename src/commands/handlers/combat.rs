//! `attack` and `cast`: the player-facing surface of the Reset/NPC/Combat
//! Runtime (C6). All damage math lives in `world::combat`; these handlers
//! only validate input, narrate, and award XP/quest progress.

use crate::error::CommandError;
use crate::world::combat::{attack_damage, bolt_damage};

use super::super::registry::{Capability, CommandDescriptor};
use super::super::{Context, HandlerResult};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "attack",
            aliases: &[],
            shortcut: None,
            usage: "attack <target>",
            description: "Strike an NPC in the room.",
            capability: Capability::General,
            handler: attack,
        },
        CommandDescriptor {
            name: "cast",
            aliases: &[],
            shortcut: None,
            usage: "cast heal|bolt <target>",
            description: "Cast heal on yourself or bolt at a target.",
            capability: Capability::General,
            handler: cast,
        },
    ]
}

fn level_of(ctx: &Context) -> u32 {
    ctx.app.world.read().players.get(&ctx.player).map(|p| p.combat.level).unwrap_or(1)
}

fn attack(ctx: &Context) -> HandlerResult {
    if ctx.arg.trim().is_empty() {
        return Err(CommandError::validation("usage: attack <target>"));
    }
    let room = ctx.current_room();
    let level = level_of(ctx);
    let damage = attack_damage(level);
    let result = ctx.app.world.apply_damage_to_npc(&room, ctx.arg.trim(), damage)?;
    ctx.tell(format!("You hit {} for {} damage.", result.npc_name, result.damage));
    ctx.app.world.broadcast_to_room(&room, &format!("{} attacks {}.", ctx.player, result.npc_name), Some(&ctx.player));

    if result.defeated {
        ctx.app.world.broadcast_to_room(&room, &format!("{} has been defeated!", result.npc_name), None);
        if !result.loot.is_empty() {
            let names: Vec<&str> = result.loot.iter().map(|i| i.name.as_str()).collect();
            ctx.app.world.broadcast_to_room(&room, &format!("{} drops: {}.", result.npc_name, names.join(", ")), None);
        }
        let levels = ctx.app.world.award_experience(&ctx.player, result.experience)?;
        ctx.tell(format!("You gain {} experience.", result.experience));
        if levels > 0 {
            ctx.tell(format!("You feel stronger! You are now level {}.", levels + level));
        }
        ctx.app.world.record_npc_kill(&ctx.player, &result.npc_name);
    }
    Ok(false)
}

fn cast(ctx: &Context) -> HandlerResult {
    let mut parts = ctx.arg.splitn(2, char::is_whitespace);
    let spell = parts.next().unwrap_or("").to_ascii_lowercase();
    let target = parts.next().unwrap_or("").trim();

    match spell.as_str() {
        "heal" => {
            spend_mana(ctx, 10)?;
            let healed = ctx.app.world.cast_heal(&ctx.player)?;
            ctx.tell(format!("You cast heal and recover {} health.", healed));
            Ok(false)
        }
        "bolt" => {
            if target.is_empty() {
                return Err(CommandError::validation("usage: cast bolt <target>"));
            }
            spend_mana(ctx, 15)?;
            let room = ctx.current_room();
            let level = level_of(ctx);
            let damage = bolt_damage(level);
            match ctx.app.world.apply_damage_to_npc(&room, target, damage) {
                Ok(result) => {
                    ctx.tell(format!("Your bolt strikes {} for {} damage.", result.npc_name, result.damage));
                    if result.defeated {
                        ctx.app.world.broadcast_to_room(&room, &format!("{} has been defeated!", result.npc_name), None);
                        let levels = ctx.app.world.award_experience(&ctx.player, result.experience)?;
                        ctx.tell(format!("You gain {} experience.", result.experience));
                        if levels > 0 {
                            ctx.tell("You feel stronger!");
                        }
                        ctx.app.world.record_npc_kill(&ctx.player, &result.npc_name);
                    }
                }
                Err(_) => {
                    let result = ctx.app.world.apply_damage_to_player(target, &room, damage)?;
                    ctx.tell(format!("Your bolt strikes {}.", result.target));
                    if result.defeated {
                        ctx.app.world.broadcast_to_room(&room, &format!("{} has fallen and been returned home.", result.target), None);
                    }
                }
            }
            Ok(false)
        }
        _ => Err(CommandError::validation("usage: cast heal|bolt <target>")),
    }
}

fn spend_mana(ctx: &Context, cost: u32) -> Result<(), CommandError> {
    let mut w = ctx.app.world.write();
    let Some(p) = w.players.get_mut(&ctx.player) else {
        return Err(CommandError::validation("you are not in the world"));
    };
    if p.combat.mana < cost {
        return Err(CommandError::validation("you don't have enough mana"));
    }
    p.combat.mana -= cost;
    Ok(())
}
