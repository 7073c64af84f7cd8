use serde::{Deserialize, Serialize};

/// Closed enumeration of message channels, each with its own routing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Room only.
    Say,
    /// Room plus adjacent rooms.
    Whisper,
    /// Global.
    Yell,
    /// Global, out-of-character.
    Ooc,
}

pub const CHANNEL_HISTORY_DEFAULT: usize = 10;
pub const CHANNEL_HISTORY_LIMIT: usize = 50;

impl Channel {
    /// All channel tokens, including aliases, mapping to their canonical
    /// channel. Used to resolve `channel <token> on|off` style commands.
    pub fn resolve_token(token: &str) -> Option<Channel> {
        match token.to_ascii_lowercase().as_str() {
            "say" => Some(Channel::Say),
            "whisper" | "whis" => Some(Channel::Whisper),
            "yell" | "shout" => Some(Channel::Yell),
            "ooc" => Some(Channel::Ooc),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Say => "say",
            Channel::Whisper => "whisper",
            Channel::Yell => "yell",
            Channel::Ooc => "ooc",
        }
    }

    pub fn all() -> &'static [Channel] {
        &[Channel::Say, Channel::Whisper, Channel::Yell, Channel::Ooc]
    }
}
