//! The bundled command bot answering over a mock transport

use crate::common::mock_transport::MockHandle;
use crate::common::test_data::{chat_frame, mock_client, open_link};
use callisto::cli::{run_session, DemoBot};
use callisto::network::TransportEvent;
use callisto::Client;

fn sent_contents(handle: &MockHandle) -> Vec<String> {
    handle
        .sent()
        .iter()
        .map(|frame| {
            let value: serde_json::Value = serde_json::from_str(frame).expect("valid json");
            value["content"].as_str().expect("content field").to_string()
        })
        .collect()
}

fn started_bot() -> (Client, MockHandle, DemoBot) {
    let (mut client, handle) = mock_client(0);
    let bot = DemoBot::new("!");
    bot.register(&mut client);
    client.connect();
    open_link(&mut client, &handle);
    (client, handle, bot)
}

fn deliver(client: &mut Client, username: &str, content: &str, role: i64) {
    client
        .handle_event(TransportEvent::Frame(chat_frame(username, content, role)))
        .expect("bot handlers should succeed");
}

#[test]
fn test_greets_on_open() {
    let (_client, handle, _bot) = started_bot();
    assert_eq!(
        sent_contents(&handle),
        vec!["Hello, world! My prefix is !. Type !help for a list of commands."]
    );
}

#[test]
fn test_ping_replies_pong() {
    let (mut client, handle, _bot) = started_bot();
    deliver(&mut client, "alice", "!ping", 0);
    assert_eq!(
        sent_contents(&handle).last().map(String::as_str),
        Some("Replying to alice: Pong!")
    );
}

#[test]
fn test_say_and_help() {
    let (mut client, handle, _bot) = started_bot();
    deliver(&mut client, "alice", "!say hello there", 0);
    deliver(&mut client, "alice", "!HELP", 3);

    let sent = sent_contents(&handle);
    assert_eq!(sent[1], "hello there");
    assert_eq!(sent[2], "Replying to alice: Commands: help, ping, say, prefix");
}

#[test]
fn test_prefix_change_applies_to_later_commands() {
    let (mut client, handle, bot) = started_bot();
    deliver(&mut client, "nin0", "!prefix ?", 2);
    assert_eq!(bot.prefix().expect("prefix"), "?");

    deliver(&mut client, "alice", "!ping", 0);
    deliver(&mut client, "alice", "?ping", 0);

    let sent = sent_contents(&handle);
    assert_eq!(
        sent[1..],
        [
            "Replying to nin0: Prefix set to ?".to_string(),
            "Replying to alice: Pong!".to_string(),
        ]
    );
}

#[test]
fn test_ignores_bots_and_itself() {
    let (mut client, handle, _bot) = started_bot();
    deliver(&mut client, "otherbot", "!ping", 12);
    deliver(&mut client, "Bot", "!ping", 0);
    deliver(&mut client, "alice", "no command here", 0);
    deliver(&mut client, "alice", "! ping", 0);
    assert_eq!(handle.sent().len(), 1, "Only the greeting was sent");
}

#[tokio::test]
async fn test_session_skips_frames_without_chat_fields() {
    let (mut client, handle) = mock_client(0);
    DemoBot::new("!").register(&mut client);
    client.connect();

    handle.set_open(true);
    handle.push(TransportEvent::Opened);
    handle.push(TransportEvent::Frame(r#"{"op":10,"messages":[]}"#.to_string()));
    handle.push(TransportEvent::Frame(chat_frame("alice", "!ping", 0)));
    handle.push(TransportEvent::Closed);

    run_session(&mut client)
        .await
        .expect("Undecodable frames should not end the session");

    assert_eq!(
        sent_contents(&handle).last().map(String::as_str),
        Some("Replying to alice: Pong!")
    );
}
