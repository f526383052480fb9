//! Seams between the connection manager and the channel it drives.
//!
//! A [`Connector`] opens a [`TransportLink`]: the write half implementing
//! [`Transport`] plus the receiver on which lifecycle and data events arrive.

use crate::network::TransportError;
use tokio::sync::mpsc;

/// Lifecycle and data events delivered by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Closed,
}

/// The write half of a persistent message channel
pub trait Transport: Send {
    /// Write one text frame
    fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Begin closing; a [`TransportEvent::Closed`] follows once it is done
    fn close(&mut self) -> Result<(), TransportError>;

    fn is_open(&self) -> bool;
}

/// Opens transports against an endpoint URI
pub trait Connector: Send {
    /// Start opening a channel to `uri`.
    ///
    /// Returns as soon as the attempt is under way. An error here means the
    /// attempt could not even be started.
    fn open(&mut self, uri: &str) -> Result<TransportLink, TransportError>;
}

/// A live transport owned by the session
pub struct TransportLink {
    transport: Box<dyn Transport>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl TransportLink {
    pub fn new(
        transport: Box<dyn Transport>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Self { transport, events }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    /// Wait for the next event; `None` once the sender side is gone
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

impl std::fmt::Debug for TransportLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportLink")
            .field("open", &self.transport.is_open())
            .finish()
    }
}
