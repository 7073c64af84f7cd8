//! Error taxonomy for the world store, persistence layer, and command dispatch.
//!
//! Mirrors the error-code-plus-user-reply shape of a structured handler error
//! enum: every variant carries enough information for the dispatcher to turn
//! it into a line of text for the offending player without disconnecting
//! them, except where the spec says otherwise.

use thiserror::Error;

/// Errors raised by World Store operations (C3).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("a player named '{0}' is already connected")]
    PlayerAlreadyConnected(String),
    #[error("no player matches '{0}'")]
    PlayerNotFound(String),
    #[error("you can't go that way")]
    UnknownDirection,
    #[error("there is no room '{0}'")]
    RoomNotFound(String),
    #[error("a room with id '{0}' already exists")]
    RoomIdTaken(String),
    #[error("no such revision {0}")]
    RevisionNotFound(u64),
    #[error("there is nothing here by that name")]
    NpcNotFound,
    #[error("you aren't carrying that")]
    ItemNotCarried,
    #[error("you don't see that here")]
    ItemNotFound,
    #[error("no quest matches '{0}'")]
    QuestNotFound(String),
    #[error("you have already accepted that quest")]
    QuestAlreadyAccepted,
    #[error("you have not accepted that quest")]
    QuestNotAccepted,
    #[error("quest requirements are not yet met")]
    QuestNotComplete,
    #[error("you need to be with {0} to turn that in")]
    QuestWrongLocation(String),
    #[error("this command is temporarily disabled")]
    CommandDisabled,
    #[error("the area data failed to reload: {0}")]
    ReloadFailed(String),
}

/// Errors raised by the flat-file persistence stores (C2, C7).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("an account named '{0}' already exists")]
    AccountExists(String),
    #[error("no account named '{0}'")]
    AccountNotFound(String),
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("incorrect password")]
    InvalidCredentials,
    #[error("you already have {0} offline tells queued for {1}")]
    OfflineTellLimit(usize, String),
    #[error("message body must not be empty")]
    EmptyBody,
}

/// The error surfaced to a command handler; every variant maps to a single
/// line of text shown to the invoking player. None of these disconnect the
/// session - only a transport error (handled in the orchestrator, not here)
/// does that.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),
    #[error("you don't have permission to do that")]
    Capability,
    #[error("{0}")]
    World(#[from] WorldError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl CommandError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CommandError::Validation(msg.into())
    }

    /// The single line of text shown to the player who triggered this error.
    /// No variant here disconnects the session.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
