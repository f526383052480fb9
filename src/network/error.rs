use crate::messages::FrameError;
use thiserror::Error;

/// Failures reported by a transport or its connector
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid endpoint URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("No async runtime available to drive the connection")]
    NoRuntime,

    #[error("Not connected: no transport has been opened")]
    NotConnected,

    #[error("Transport is not open")]
    NotOpen,

    #[error("Transport I/O task has stopped")]
    ChannelClosed,

    #[error("Failed to encode outbound envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Connection refused by connector: {0}")]
    Refused(String),
}

/// Errors surfaced to the consumer while processing transport events
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Received a malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
