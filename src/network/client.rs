use crate::config::Config;
use crate::events::{Event, EventDispatcher, EventKind, Handler};
use crate::messages::{normalize, ChatMessage, OutboundEnvelope};
use crate::network::transport::{Connector, TransportEvent, TransportLink};
use crate::network::{ClientError, TransportError};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Handler type registered on a [`Client`]
pub type SessionHandler = Handler<Session>;

/// Observable connection states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    /// A transport has been opened and its handshake is in progress
    Connecting,
    Open,
    /// An unexpected close is being handled
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Reconnecting => write!(f, "reconnecting"),
        }
    }
}

/// Connection state shared with event handlers.
///
/// Every handler receives `&mut Session`, which can send, reply, reconnect
/// or disconnect while the client is dispatching.
pub struct Session {
    config: Config,
    connector: Box<dyn Connector>,
    link: Option<TransportLink>,
    /// Bumped every time `connect` installs a new link
    generation: u64,
    state: ConnectionState,
    reconnect_attempts: u32,
    disconnect_intentional: bool,
    clear_requested: bool,
}

impl Session {
    fn new(config: Config, connector: Box<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            link: None,
            generation: 0,
            state: ConnectionState::Disconnected,
            reconnect_attempts: 0,
            disconnect_intentional: false,
            clear_requested: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn username(&self) -> &str {
        &self.config.bot.username
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn is_disconnect_intentional(&self) -> bool {
        self.disconnect_intentional
    }

    pub fn is_open(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| link.transport().is_open())
    }

    /// Messages received before the session started. Never filled in yet.
    pub fn stale_messages(&self) -> &[ChatMessage] {
        debug!("Retrieving stale messages");
        &self.config.bot.stale_messages
    }

    /// Open a new transport against the configured URI.
    ///
    /// Any previous link is closed and released first. Returns `false` when
    /// the attempt could not be started; the failure is logged.
    pub fn connect(&mut self) -> bool {
        info!("Attempting to connect to {}", self.config.websocket.uri);
        self.release_link();
        self.disconnect_intentional = false;

        match self.connector.open(&self.config.websocket.uri) {
            Ok(link) => {
                self.link = Some(link);
                self.generation += 1;
                self.state = ConnectionState::Connecting;
                info!("Connection to {} started", self.config.websocket.uri);
                true
            }
            Err(e) => {
                error!("An error occurred while connecting to the server: {}", e);
                self.state = ConnectionState::Disconnected;
                false
            }
        }
    }

    /// Send `content` wrapped with this session's identity
    pub fn send(&mut self, content: &str) -> Result<(), TransportError> {
        debug!("Sending message: {}", content);
        let envelope = OutboundEnvelope::new(
            content,
            self.config.bot.username.as_str(),
            self.config.bot.key.as_str(),
        );
        let frame = envelope.to_frame()?;
        self.write(frame)
    }

    /// Send `payload` exactly as given
    pub fn send_raw(&mut self, payload: &str) -> Result<(), TransportError> {
        debug!("Sending RAW message: {}", payload);
        self.write(payload.to_string())
    }

    fn write(&mut self, frame: String) -> Result<(), TransportError> {
        match self.link.as_mut() {
            Some(link) => link.transport_mut().send(frame),
            None => Err(TransportError::NotConnected),
        }
    }

    /// Close the transport on purpose.
    ///
    /// Persistent handlers are cleared once the current dispatch (if any)
    /// finishes. One-shot handlers are kept.
    pub fn disconnect(&mut self) {
        info!("Attempting to disconnect from the server");
        self.clear_requested = true;

        if !self.is_open() {
            warn!("Could not disconnect from the server. Is the websocket connected?");
            return;
        }

        self.disconnect_intentional = true;
        if let Some(link) = self.link.as_mut() {
            match link.transport_mut().close() {
                Ok(()) => info!("Disconnected from the server"),
                Err(e) => warn!("Error while closing the connection: {}", e),
            }
        }
    }

    fn release_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            if link.transport().is_open() {
                debug!("Closing previous transport before replacing it");
                if let Err(e) = link.transport_mut().close() {
                    warn!("Error closing previous transport: {}", e);
                }
            }
        }
    }

    fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uri", &self.config.websocket.uri)
            .field("username", &self.config.bot.username)
            .field("state", &self.state)
            .field("reconnect_attempts", &self.reconnect_attempts)
            .field("disconnect_intentional", &self.disconnect_intentional)
            .finish()
    }
}

/// Single-session chat client: connection state machine plus event dispatch
pub struct Client {
    dispatcher: EventDispatcher<Session>,
    session: Session,
}

impl Client {
    pub fn new(config: Config, connector: impl Connector + 'static) -> Self {
        debug!("Starting client for {}", config.bot.username);
        Self {
            dispatcher: EventDispatcher::new(),
            session: Session::new(config, Box::new(connector)),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn config(&self) -> &Config {
        self.session.config()
    }

    pub fn state(&self) -> ConnectionState {
        self.session.state()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.session.reconnect_attempts()
    }

    pub fn is_disconnect_intentional(&self) -> bool {
        self.session.is_disconnect_intentional()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn stale_messages(&self) -> &[ChatMessage] {
        self.session.stale_messages()
    }

    /// Register a handler; call before [`Client::connect`] to avoid missing events
    pub fn on(&mut self, event: EventKind, handler: SessionHandler) {
        self.dispatcher.on(event, handler);
    }

    pub fn once(&mut self, event: EventKind, handler: SessionHandler) {
        self.dispatcher.once(event, handler);
    }

    pub fn off(&mut self, event: EventKind, handler: &SessionHandler) {
        self.dispatcher.off(event, handler);
    }

    /// Emit an event to the registered handlers
    pub fn emit(&mut self, event: &Event<'_>) -> Result<(), ClientError> {
        // A disconnect made through `session_mut()` since the last event
        self.apply_clear_request();
        let result = self.dispatcher.emit(&mut self.session, event);
        self.apply_clear_request();
        result.map_err(ClientError::Handler)
    }

    pub fn clear_handlers(&mut self) {
        self.dispatcher.clear_handlers();
    }

    pub fn connect(&mut self) -> bool {
        self.session.connect()
    }

    pub fn send(&mut self, content: &str) -> Result<(), TransportError> {
        self.session.send(content)
    }

    pub fn send_raw(&mut self, payload: &str) -> Result<(), TransportError> {
        self.session.send_raw(payload)
    }

    /// Clear persistent handlers and close the transport on purpose
    pub fn disconnect(&mut self) {
        self.session.disconnect();
        self.apply_clear_request();
    }

    fn apply_clear_request(&mut self) {
        if self.session.take_clear_request() {
            self.dispatcher.clear_handlers();
        }
    }

    /// Process one transport event to completion
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<(), ClientError> {
        match event {
            TransportEvent::Opened => self.handle_open(),
            TransportEvent::Frame(raw) => self.handle_frame(&raw),
            TransportEvent::Closed => self.handle_close(),
        }
    }

    fn handle_open(&mut self) -> Result<(), ClientError> {
        info!("Connected to the server");
        self.session.state = ConnectionState::Open;
        self.emit(&Event::Open)
    }

    fn handle_frame(&mut self, raw: &str) -> Result<(), ClientError> {
        debug!("Received frame: {}", raw);
        let message = match normalize(raw, self.session.username()) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping malformed frame: {}", e);
                return Err(ClientError::MalformedFrame(e));
            }
        };
        self.emit(&Event::Message(&message))
    }

    fn handle_close(&mut self) -> Result<(), ClientError> {
        let generation = self.session.generation;
        let intentional = self.session.disconnect_intentional;
        self.session.state = if intentional {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Reconnecting
        };

        let emitted = self.emit(&Event::Close);

        if self.session.generation != generation {
            debug!("A close handler reconnected; skipping automatic reconnect");
            return emitted;
        }

        // The link is spent either way; keep it only if we reconnect below
        self.session.link = None;

        if intentional {
            self.session.state = ConnectionState::Disconnected;
            return emitted;
        }

        self.reconnect();
        emitted
    }

    fn reconnect(&mut self) {
        let session = &mut self.session;
        warn!("Connection closed unexpectedly");

        if !session.config.websocket.reconnect {
            info!("Reconnect is disabled; staying disconnected");
            session.state = ConnectionState::Disconnected;
            return;
        }

        if session.reconnect_attempts >= session.config.websocket.reconnect_max_trials {
            error!(
                "Unable to establish a connection with the server. Tried reconnecting {} times.",
                session.reconnect_attempts
            );
            session.state = ConnectionState::Disconnected;
            return;
        }

        session.reconnect_attempts += 1;
        info!(
            "Starting reconnect attempt {}/{}",
            session.reconnect_attempts, session.config.websocket.reconnect_max_trials
        );
        session.connect();
    }

    /// Drive the current transport until no link remains.
    ///
    /// Events are handled one at a time. A malformed frame or failing handler
    /// stops the loop with an error but leaves the session as it was, so
    /// `run` may be called again.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        loop {
            let event = match self.session.link.as_mut() {
                Some(link) => link.next_event().await,
                None => {
                    debug!("No transport left to drive");
                    return Ok(());
                }
            };

            match event {
                Some(event) => self.handle_event(event)?,
                // I/O side vanished without reporting a close
                None => self.handle_event(TransportEvent::Closed)?,
            }
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session)
            .field("handlers", &self.dispatcher.handler_count())
            .field("pending_once", &self.dispatcher.pending_once_count())
            .finish()
    }
}
