//! Common test utilities and helper modules

pub mod local_server;
pub mod mock_transport;
