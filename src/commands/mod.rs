//! Command Registry & Dispatcher (C4): table-driven resolution of an input
//! line to a handler, with fuzzy nearest-command fallback. No class
//! hierarchy - a flat registry of descriptors carrying a plain handler
//! function pointer.

pub mod dispatch;
pub mod handlers;
pub mod registry;

use std::sync::Arc;

use crate::error::CommandError;
use crate::portal::PortalProvider;
use crate::stores::{AccountStore, MailStore, TellStore};
use crate::world::World;

pub use dispatch::{dispatch, dispatch_tracking_rename, nearest_command};
pub use handlers::render_room_for;
pub use registry::{Capability, CommandDescriptor, Registry};

/// Shared, read-mostly application state handed to every command handler.
pub struct AppState {
    pub world: Arc<World>,
    pub accounts: Arc<AccountStore>,
    pub mail: Arc<MailStore>,
    pub tells: Arc<TellStore>,
    pub registry: Arc<Registry>,
    pub portal: Option<Arc<dyn PortalProvider>>,
    pub admin_account: String,
}

/// Per-invocation context: the parsed input plus the invoking player's
/// name. Handlers look up mutable player/world state through `app.world`
/// rather than holding any of it directly.
pub struct Context<'a> {
    pub app: &'a AppState,
    pub player: String,
    pub raw: String,
    pub input: String,
    pub arg: String,
    pub command: &'a CommandDescriptor,
    /// Set by the `name` handler when it successfully renames the invoking
    /// player, so the caller (the connection orchestrator's reader loop,
    /// which otherwise only knows the player by their pre-rename name) can
    /// keep dispatching under the new name.
    pub renamed_to: std::cell::RefCell<Option<String>>,
}

impl<'a> Context<'a> {
    /// Sends a line to the invoking player's own output queue.
    pub fn tell(&self, text: impl Into<String>) {
        if let Some(p) = self.app.world.read().players.get(&self.player) {
            p.enqueue(text.into());
        }
    }

    pub fn is_admin(&self) -> bool {
        self.app.world.read().players.get(&self.player).map(|p| p.is_admin()).unwrap_or(false)
            || self.app.world.everyone_admin()
    }

    pub fn has_role(&self, role: crate::model::Role) -> bool {
        self.app.world.read().players.get(&self.player).map(|p| p.has_role(role)).unwrap_or(false) || self.app.world.everyone_admin()
    }

    pub fn current_room(&self) -> String {
        self.app.world.read().players.get(&self.player).map(|p| p.room.clone()).unwrap_or_default()
    }
}

/// The result of a successfully dispatched command: whether the session
/// should now close.
pub type HandlerResult = Result<bool, CommandError>;
pub type Handler = fn(&Context) -> HandlerResult;
