//! `Dispatch(world, player, line)`: tokenize, resolve, gate, invoke.

use super::registry::Registry;
use super::{AppState, Context, HandlerResult};

/// Classic Levenshtein edit distance, used only for the nearest-command
/// fallback - names here are short, so the naive O(n*m) table is fine.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let tmp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = tmp;
        }
    }
    row[b.len()]
}

/// Resolves an unmatched input token to the nearest registered primary
/// command name, or `None` if nothing is close enough. Deterministic: ties
/// broken alphabetically on the primary name.
pub fn nearest_command(registry: &Registry, token: &str) -> Option<String> {
    let prefix_hits = registry.prefix_matches(token);
    if prefix_hits.len() == 1 {
        return Some(prefix_hits[0].to_string());
    }

    let mut best: Option<(usize, &str)> = None;
    for cmd in registry.all() {
        let dist = levenshtein(token, cmd.name);
        let threshold = (cmd.name.len() / 2).max(2);
        if dist > threshold {
            continue;
        }
        best = match best {
            None => Some((dist, cmd.name)),
            Some((best_dist, best_name)) => {
                if dist < best_dist || (dist == best_dist && cmd.name < best_name) {
                    Some((dist, cmd.name))
                } else {
                    Some((best_dist, best_name))
                }
            }
        };
    }
    best.map(|(_, name)| name.to_string())
}

/// Tokenizes `line`, resolves the command (exact, then fuzzy), and invokes
/// its handler. Returns `true` if the session should now close. An empty
/// line, an unresolved command, or a disabled command are all handled
/// in-line and never return an error to the caller - the player sees an
/// inline notice instead.
pub fn dispatch(app: &AppState, player: &str, line: &str) -> bool {
    dispatch_inner(app, player, line).0
}

/// Same as `dispatch`, but additionally reports a display-name change made
/// by the `name` command. The connection orchestrator's reader loop only
/// knows the invoking player by name, so it uses this to keep dispatching
/// under the new name after a successful rename.
pub fn dispatch_tracking_rename(app: &AppState, player: &mut String, line: &str) -> bool {
    let (quit, renamed_to) = dispatch_inner(app, player, line);
    if let Some(new_name) = renamed_to {
        *player = new_name;
    }
    quit
}

fn dispatch_inner(app: &AppState, player: &str, line: &str) -> (bool, Option<String>) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return (false, None);
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").to_ascii_lowercase();
    let arg = parts.next().unwrap_or("").trim().to_string();

    let descriptor = match app.registry.lookup(&first) {
        Some(d) => d,
        None => match nearest_command(&app.registry, &first).and_then(|name| app.registry.lookup(&name)) {
            Some(d) => d,
            None => {
                send_to(app, player, "Unknown command. Type 'help'.");
                return (false, None);
            }
        },
    };

    if app.world.command_disabled(descriptor.name) && descriptor.name != "command" {
        send_to(app, player, "This command is temporarily disabled.");
        return (false, None);
    }

    let ctx = Context {
        app,
        player: player.to_string(),
        raw: trimmed.to_string(),
        input: first,
        arg,
        command: descriptor,
        renamed_to: std::cell::RefCell::new(None),
    };

    let result: HandlerResult = (descriptor.handler)(&ctx);
    let renamed_to = ctx.renamed_to.into_inner();
    match result {
        Ok(quit) => (quit, renamed_to),
        Err(e) => {
            send_to(app, player, e.user_message());
            (false, renamed_to)
        }
    }
}

fn send_to(app: &AppState, player: &str, text: impl Into<String>) {
    if let Some(p) = app.world.read().players.get(player) {
        p.enqueue(text.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basic() {
        assert_eq!(levenshtein("say", "sya"), 2);
        assert_eq!(levenshtein("look", "look"), 0);
    }

    #[test]
    fn nearest_command_resolves_typo_within_threshold() {
        let registry = Registry::new();
        let resolved = nearest_command(&registry, "sya");
        assert_eq!(resolved.as_deref(), Some("say"));
    }
}
