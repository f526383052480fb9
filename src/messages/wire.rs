use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding an inbound text frame
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// The minimal shape of a chat frame received from the server.
///
/// The server may attach `op`, `messages`, `user` and `stale` for backlog
/// delivery. Those are ignored here; only the three fields below are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub content: String,
    pub username: String,
    pub role: i64,
}

impl InboundFrame {
    /// Decode a frame from its JSON text
    pub fn from_text(text: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// The envelope wrapped around every non-raw outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub content: String,
    pub username: String,
    pub key: String,
}

impl OutboundEnvelope {
    pub fn new(
        content: impl Into<String>,
        username: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            username: username.into(),
            key: key.into(),
        }
    }

    /// Serialize to the text frame written on the wire
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse an envelope back from a text frame
    pub fn from_frame(frame: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(frame)?)
    }
}
