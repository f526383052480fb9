//! A throwaway local WebSocket chat server for end-to-end tests

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Bind an ephemeral port and return its `ws://` URI with the listener
pub async fn bind_local() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    (listener, format!("ws://{}", addr))
}

/// A URI nothing is listening on
pub async fn unreachable_uri() -> String {
    let (listener, uri) = bind_local().await;
    drop(listener);
    uri
}

/// Accept one client, answer its first text frame with `reply`, and keep
/// reading until the client goes away.
///
/// Resolves to every text frame the client sent.
pub fn serve_once(listener: TcpListener, reply: String) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("WebSocket handshake failed");

        let mut received = Vec::new();
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    received.push(text);
                    if received.len() == 1 {
                        ws.send(Message::Text(reply.clone()))
                            .await
                            .expect("Failed to send reply");
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
        received
    })
}
