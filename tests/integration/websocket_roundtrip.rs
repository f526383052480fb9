//! End-to-end behavior over a real WebSocket on localhost

use crate::common::local_server::{bind_local, serve_once, unreachable_uri};
use crate::common::test_data::chat_frame;
use callisto::{
    BotConfig, ChatMessage, Client, Config, ConnectionState, Event, EventKind, Handler, Session,
    WebSocketConfig, WebSocketConnector,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

fn local_config(uri: &str, reconnect: bool, max_trials: u32) -> Config {
    Config::new(
        BotConfig::new("Bot", "abc"),
        WebSocketConfig::new(uri)
            .with_reconnect(reconnect)
            .with_max_trials(max_trials),
    )
}

#[tokio::test]
async fn test_send_receive_and_disconnect() {
    let (listener, uri) = bind_local().await;
    let server = serve_once(listener, chat_frame("alice", "hi Bot", 0));

    let mut client = Client::new(local_config(&uri, false, 0), WebSocketConnector::new());
    let received = Arc::new(Mutex::new(Vec::new()));

    client.on(
        EventKind::Open,
        Handler::new(|session: &mut Session, _: &Event<'_>| {
            session.send("hello")?;
            Ok(())
        }),
    );
    let seen = Arc::clone(&received);
    client.on(
        EventKind::Message,
        Handler::new(move |session: &mut Session, event: &Event<'_>| {
            if let Event::Message(message) = event {
                seen.lock().expect("lock").push(ChatMessage::clone(message));
                session.disconnect();
            }
            Ok(())
        }),
    );

    assert!(client.connect());
    timeout(Duration::from_secs(5), client.run())
        .await
        .expect("Session did not finish in time")
        .expect("Session ended with an error");

    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(client.is_disconnect_intentional());

    let received = received.lock().expect("lock").clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].username, "alice");
    assert!(received[0].is_mentioned());
    assert!(received[0].is_user());

    let frames = timeout(Duration::from_secs(5), server)
        .await
        .expect("Server did not finish in time")
        .expect("Server task panicked");
    assert_eq!(
        frames,
        vec![r#"{"content":"hello","username":"Bot","key":"abc"}"#.to_string()]
    );
}

#[tokio::test]
async fn test_unreachable_server_exhausts_trials() {
    let uri = unreachable_uri().await;
    let mut client = Client::new(local_config(&uri, true, 2), WebSocketConnector::new());

    let closes = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&closes);
    client.on(
        EventKind::Close,
        Handler::new(move |_: &mut Session, _: &Event<'_>| {
            *counter.lock().expect("lock") += 1;
            Ok(())
        }),
    );

    assert!(client.connect(), "Failure is reported asynchronously");
    timeout(Duration::from_secs(10), client.run())
        .await
        .expect("Reconnect loop did not finish in time")
        .expect("Session ended with an error");

    assert_eq!(client.reconnect_attempts(), 2);
    assert_eq!(*closes.lock().expect("lock"), 3);
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_invalid_uri_fails_connect() {
    let mut client = Client::new(local_config("not a uri", true, 3), WebSocketConnector::new());
    assert!(!client.connect());
    assert_eq!(client.state(), ConnectionState::Disconnected);
}
