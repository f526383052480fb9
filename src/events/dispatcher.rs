use crate::messages::ChatMessage;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Names of the events a session surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Open,
    Close,
    Message,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Message => "message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emitted event together with its payload
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Open,
    Close,
    Message(&'a ChatMessage),
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Open => EventKind::Open,
            Event::Close => EventKind::Close,
            Event::Message(_) => EventKind::Message,
        }
    }
}

type HandlerFn<C> = dyn Fn(&mut C, &Event<'_>) -> anyhow::Result<()> + Send + Sync;

/// A shared event callback.
///
/// Clones refer to the same callback, which is what [`EventDispatcher::off`]
/// matches on.
pub struct Handler<C> {
    callback: Arc<HandlerFn<C>>,
}

impl<C> Handler<C> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut C, &Event<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Whether both handles refer to the same callback
    pub fn same_as(&self, other: &Handler<C>) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    fn call(&self, ctx: &mut C, event: &Event<'_>) -> anyhow::Result<()> {
        (self.callback)(ctx, event)
    }
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<C> fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.callback))
    }
}

#[derive(Debug)]
struct PersistentEntry<C> {
    event: EventKind,
    handler: Handler<C>,
}

#[derive(Debug)]
struct OnceEntry<C> {
    event: EventKind,
    handler: Handler<C>,
    fired: bool,
}

/// Ordered registries of persistent and one-shot handlers.
///
/// `C` is the context handed to every handler alongside the event.
#[derive(Debug)]
pub struct EventDispatcher<C> {
    handlers: Vec<PersistentEntry<C>>,
    once_handlers: Vec<OnceEntry<C>>,
}

impl<C> Default for EventDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventDispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            once_handlers: Vec::new(),
        }
    }

    /// Register a handler that runs on every emission of `event`
    pub fn on(&mut self, event: EventKind, handler: Handler<C>) {
        debug!("New event handler registered for event {}", event);
        self.handlers.push(PersistentEntry { event, handler });
    }

    /// Register a handler that runs on the next emission of `event` only
    pub fn once(&mut self, event: EventKind, handler: Handler<C>) {
        debug!("New one-time event handler registered for event {}", event);
        self.once_handlers.push(OnceEntry {
            event,
            handler,
            fired: false,
        });
    }

    /// Remove every registration of `handler` for `event`, in both registries
    pub fn off(&mut self, event: EventKind, handler: &Handler<C>) {
        debug!("Removing event handler for event {}", event);
        self.handlers
            .retain(|entry| entry.event != event || !entry.handler.same_as(handler));
        self.once_handlers
            .retain(|entry| entry.event != event || !entry.handler.same_as(handler));
    }

    /// Run matching persistent handlers, then matching unfired one-shot
    /// handlers, all in registration order.
    ///
    /// The first handler error stops the pass and is returned as is.
    pub fn emit(&mut self, ctx: &mut C, event: &Event<'_>) -> anyhow::Result<()> {
        let kind = event.kind();
        debug!("Emitting event {}", kind);

        for entry in self.handlers.iter().filter(|entry| entry.event == kind) {
            entry.handler.call(ctx, event)?;
        }

        for entry in self
            .once_handlers
            .iter_mut()
            .filter(|entry| entry.event == kind && !entry.fired)
        {
            let result = entry.handler.call(ctx, event);
            entry.fired = true;
            result?;
        }

        Ok(())
    }

    /// Drop all persistent handlers. One-shot handlers stay registered.
    pub fn clear_handlers(&mut self) {
        debug!("Clearing all event handlers");
        self.handlers.clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of one-shot handlers that have not fired yet
    pub fn pending_once_count(&self) -> usize {
        self.once_handlers.iter().filter(|entry| !entry.fired).count()
    }
}
