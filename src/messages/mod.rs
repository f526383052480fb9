pub mod chat;
pub mod wire;

pub use chat::{normalize, ChatMessage, Role};
pub use wire::{FrameError, InboundFrame, OutboundEnvelope};
