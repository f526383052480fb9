pub mod cli;
pub mod config;
pub mod events;
pub mod logging;
pub mod messages;
pub mod network;

// Re-export key types for easy testing
pub use config::{BotConfig, Config, WebSocketConfig};
pub use events::{Event, EventKind, Handler};
pub use logging::LogLevel;
pub use messages::{ChatMessage, Role};
pub use network::{
    Client, ConnectionState, Session, SessionHandler, TransportEvent, WebSocketConnector,
};
