use crate::messages::wire::{FrameError, InboundFrame};
use crate::network::{Session, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender class attached to every chat frame as a numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Role {
    User,
    Admin,
    Discord,
    Bot,
    /// A code outside the known table. Every role predicate is false for it.
    Other(i64),
}

impl Role {
    pub const USER_CODE: i64 = 0;
    pub const ADMIN_CODE: i64 = 2;
    pub const DISCORD_CODE: i64 = 3;
    pub const BOT_CODE: i64 = 12;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::USER_CODE => Role::User,
            Self::ADMIN_CODE => Role::Admin,
            Self::DISCORD_CODE => Role::Discord,
            Self::BOT_CODE => Role::Bot,
            other => Role::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Role::User => Self::USER_CODE,
            Role::Admin => Self::ADMIN_CODE,
            Role::Discord => Self::DISCORD_CODE,
            Role::Bot => Self::BOT_CODE,
            Role::Other(code) => *code,
        }
    }
}

impl From<i64> for Role {
    fn from(code: i64) -> Self {
        Role::from_code(code)
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
            Role::Discord => write!(f, "discord"),
            Role::Bot => write!(f, "bot"),
            Role::Other(code) => write!(f, "unknown({})", code),
        }
    }
}

/// A chat message received from the server, annotated relative to the
/// session that received it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub username: String,
    pub role: Role,
    /// The sender is the session's own configured username
    pub from_self: bool,
    /// The session's username occurs somewhere in the content
    pub mentions_self: bool,
}

impl ChatMessage {
    /// Build a message from a decoded frame as seen by `own_username`
    pub fn from_frame(frame: InboundFrame, own_username: &str) -> Self {
        let from_self = frame.username == own_username;
        let mentions_self = frame.content.contains(own_username);
        Self {
            content: frame.content,
            username: frame.username,
            role: Role::from_code(frame.role),
            from_self,
            mentions_self,
        }
    }

    pub fn role_code(&self) -> i64 {
        self.role.code()
    }

    pub fn is_mod(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_bot(&self) -> bool {
        self.role == Role::Bot
    }

    pub fn is_discord(&self) -> bool {
        self.role == Role::Discord
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_self(&self) -> bool {
        self.from_self
    }

    pub fn is_mentioned(&self) -> bool {
        self.mentions_self
    }

    /// Text sent by [`ChatMessage::reply`]
    pub fn reply_text(&self, content: &str) -> String {
        format!("Replying to {}: {}", self.username, content)
    }

    /// Answer the sender through the session that received this message
    pub fn reply(&self, session: &mut Session, content: &str) -> Result<(), TransportError> {
        session.send(&self.reply_text(content))
    }

    /// Send `content` to the channel this message came from
    pub fn respond(&self, session: &mut Session, content: &str) -> Result<(), TransportError> {
        session.send(content)
    }
}

/// Turn a raw inbound frame into a [`ChatMessage`].
///
/// Frames that are not JSON, or lack `username`, `content` or a numeric
/// `role`, are rejected with [`FrameError`].
pub fn normalize(raw: &str, own_username: &str) -> Result<ChatMessage, FrameError> {
    let frame = InboundFrame::from_text(raw)?;
    Ok(ChatMessage::from_frame(frame, own_username))
}
