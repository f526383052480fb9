//! Integration tests driving a full client against a mock or local server

pub mod demo_bot;
pub mod websocket_roundtrip;
