use crate::network::transport::{Connector, Transport, TransportEvent, TransportLink};
use crate::network::TransportError;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, instrument, warn};

enum Outbound {
    Frame(String),
    Close,
}

/// Opens WebSocket transports on the current tokio runtime.
///
/// Each link gets its own I/O task. The task reports `Opened` once the
/// handshake completes and `Closed` exactly once when the socket is gone,
/// including when the handshake itself fails.
#[derive(Debug, Default, Clone)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn open(&mut self, uri: &str) -> Result<TransportLink, TransportError> {
        let request = uri
            .into_client_request()
            .map_err(|e| TransportError::InvalidUri {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));

        runtime.spawn(drive_connection(
            request,
            uri.to_string(),
            Arc::clone(&open),
            event_tx,
            outbound_rx,
        ));

        let transport = WebSocketTransport {
            outbound: outbound_tx,
            open,
        };
        Ok(TransportLink::new(Box::new(transport), event_rx))
    }
}

/// Write half of a WebSocket link
pub struct WebSocketTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    open: Arc<AtomicBool>,
}

impl Transport for WebSocketTransport {
    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        self.outbound
            .send(Outbound::Frame(frame))
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Err(TransportError::NotOpen);
        }
        self.outbound
            .send(Outbound::Close)
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

#[instrument(skip(request, open, events, outbound))]
async fn drive_connection(
    request: Request,
    uri: String,
    open: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    let ws_stream = match connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            error!("WebSocket connect to {} failed: {}", uri, e);
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    info!("WebSocket connection to {} established", uri);
    if events.send(TransportEvent::Opened).is_err() {
        debug!("Session released the link before it opened");
        open.store(false, Ordering::SeqCst);
        return;
    }

    let (mut write, mut read) = ws_stream.split();
    let mut closing = false;

    loop {
        tokio::select! {
            command = outbound.recv(), if !closing => {
                match command {
                    Some(Outbound::Frame(text)) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            warn!("Failed to write frame: {}", e);
                            break;
                        }
                    }
                    Some(Outbound::Close) => {
                        debug!("Sending close frame");
                        closing = true;
                        if let Err(e) = write.send(Message::Close(None)).await {
                            debug!("Close frame not sent: {}", e);
                            break;
                        }
                    }
                    None => {
                        // The session dropped this link without closing it.
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(TransportEvent::Frame(text)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        if events.send(TransportEvent::Frame(text)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Server closed connection: {:?}", frame);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    open.store(false, Ordering::SeqCst);
    info!("WebSocket connection to {} closed", uri);
    let _ = events.send(TransportEvent::Closed);
}
