pub mod client;
pub mod error;
pub mod transport;
pub mod websocket;

pub use client::{Client, ConnectionState, Session, SessionHandler};
pub use error::{ClientError, TransportError};
pub use transport::{Connector, Transport, TransportEvent, TransportLink};
pub use websocket::{WebSocketConnector, WebSocketTransport};
