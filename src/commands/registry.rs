//! The command table itself. Registration happens once at startup and is
//! append-only afterward - the registry is the one process-wide static the
//! design notes carve out an exception for.

use std::collections::HashMap;

use super::{handlers, Handler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    General,
    Builder,
    Admin,
    Moderator,
}

pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub shortcut: Option<char>,
    pub usage: &'static str,
    pub description: &'static str,
    pub capability: Capability,
    pub handler: Handler,
}

pub struct Registry {
    commands: Vec<CommandDescriptor>,
    /// token (name, alias, or single-letter shortcut) -> index into `commands`.
    index: HashMap<String, usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("command token '{0}' is already registered")]
    Collision(String),
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Registry { commands: Vec::new(), index: HashMap::new() };
        for descriptor in handlers::table() {
            registry.register(descriptor).expect("built-in command table must not collide");
        }
        registry
    }

    fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        let mut tokens = vec![descriptor.name.to_string()];
        tokens.extend(descriptor.aliases.iter().map(|a| a.to_string()));
        if let Some(c) = descriptor.shortcut {
            tokens.push(c.to_string());
        }
        for token in &tokens {
            if self.index.contains_key(token) {
                return Err(RegistryError::Collision(token.clone()));
            }
        }
        let idx = self.commands.len();
        for token in tokens {
            self.index.insert(token, idx);
        }
        self.commands.push(descriptor);
        Ok(())
    }

    pub fn lookup(&self, token: &str) -> Option<&CommandDescriptor> {
        self.index.get(token).map(|&i| &self.commands[i])
    }

    /// Every registered primary command name, in stable alphabetical
    /// order.
    pub fn all(&self) -> Vec<&CommandDescriptor> {
        let mut all: Vec<&CommandDescriptor> = self.commands.iter().collect();
        all.sort_by_key(|c| c.name);
        all
    }

    /// Every distinct command (by primary name) for which `token` is a
    /// registry-key prefix. Used by the nearest-command fallback's first
    /// pass.
    pub fn prefix_matches(&self, token: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .index
            .keys()
            .filter(|k| k.starts_with(token))
            .map(|k| self.commands[self.index[k]].name)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
