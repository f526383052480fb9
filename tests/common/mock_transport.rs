//! In-memory connector and transport that record everything the client does
//!
//! Tests drive lifecycle events either directly through
//! `Client::handle_event` or by pushing them onto the current link's channel
//! for `Client::run` to pick up.

use callisto::network::{Connector, Transport, TransportError, TransportEvent, TransportLink};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Default)]
struct MockNetwork {
    uris: Vec<String>,
    sent: Vec<String>,
    client_closes: usize,
    refuse_opens: bool,
    link_open: Vec<bool>,
    senders: Vec<mpsc::UnboundedSender<TransportEvent>>,
}

/// Shared view of the mock network, cloned into connectors and tests
#[derive(Clone, Default)]
pub struct MockHandle {
    net: Arc<Mutex<MockNetwork>>,
}

impl MockHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockNetwork> {
        self.net.lock().expect("mock network lock poisoned")
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector {
            handle: self.clone(),
        }
    }

    /// Number of links the client has opened
    pub fn open_count(&self) -> usize {
        self.lock().uris.len()
    }

    pub fn uris(&self) -> Vec<String> {
        self.lock().uris.clone()
    }

    /// Every frame written, across all links
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Times the client asked a transport to close
    pub fn client_closes(&self) -> usize {
        self.lock().client_closes
    }

    pub fn refuse_opens(&self, refuse: bool) {
        self.lock().refuse_opens = refuse;
    }

    /// Flip the open flag of the newest link
    pub fn set_open(&self, open: bool) {
        let mut net = self.lock();
        if let Some(flag) = net.link_open.last_mut() {
            *flag = open;
        }
    }

    /// Queue an event on the newest link
    pub fn push(&self, event: TransportEvent) {
        let net = self.lock();
        if let Some(sender) = net.senders.last() {
            let _ = sender.send(event);
        }
    }
}

pub struct MockConnector {
    handle: MockHandle,
}

impl Connector for MockConnector {
    fn open(&mut self, uri: &str) -> Result<TransportLink, TransportError> {
        let mut net = self.handle.lock();
        if net.refuse_opens {
            return Err(TransportError::Refused(format!("mock refused {}", uri)));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        net.uris.push(uri.to_string());
        net.link_open.push(false);
        net.senders.push(tx);
        let index = net.link_open.len() - 1;

        let transport = MockTransport {
            handle: self.handle.clone(),
            index,
        };
        Ok(TransportLink::new(Box::new(transport), rx))
    }
}

pub struct MockTransport {
    handle: MockHandle,
    index: usize,
}

impl Transport for MockTransport {
    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        let mut net = self.handle.lock();
        if !net.link_open[self.index] {
            return Err(TransportError::NotOpen);
        }
        net.sent.push(frame);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut net = self.handle.lock();
        net.client_closes += 1;
        net.link_open[self.index] = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.handle.lock().link_open[self.index]
    }
}
