// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real sockets against a gateway bound to an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use mnemo_agent::{AdminService, ChatServices};
use mnemo_core::{SessionId, SessionKey, StorageAdapter};
use mnemo_gateway::{GatewayState, serve};
use mnemo_test_utils::TestHarness;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

async fn start(harness: &TestHarness) -> (SocketAddr, CancellationToken) {
    let chat = Arc::new(ChatServices {
        assembler: harness.assembler.clone(),
        storage: harness.storage_dyn(),
        provider: harness.provider_dyn(),
        model_timeout: Duration::from_secs(5),
        max_tokens: None,
    });
    let admin = Arc::new(AdminService::new(
        harness.storage_dyn(),
        harness.embedder_dyn(),
        harness.store_dyn(),
        harness.summarizer.clone(),
    ));
    let shutdown = CancellationToken::new();
    let state = GatewayState::new(chat, admin, shutdown.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state));
    (addr, shutdown)
}

async fn next_text<S>(stream: &mut S) -> String
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("socket error");
        if let Message::Text(text) = message {
            return text.as_str().to_owned();
        }
    }
}

#[tokio::test]
async fn user_chat_replies_and_persists() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["hi alice".into()])
        .build()
        .await
        .unwrap();
    let (addr, shutdown) = start(&harness).await;

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws/chat/user?user=alice"))
        .await
        .unwrap();
    socket
        .send(Message::Text(r#"{"content":"hello"}"#.into()))
        .await
        .unwrap();

    let reply: serde_json::Value = serde_json::from_str(&next_text(&mut socket).await).unwrap();
    assert_eq!(reply["content"], "hi alice");
    let session_id = reply["session_id"].as_str().unwrap().to_string();

    let key = SessionKey::new("alice", SessionId(session_id));
    let turns = harness.storage.read_turns(&key).await.unwrap();
    assert_eq!(turns.len(), 2);

    socket.close(None).await.unwrap();
    shutdown.cancel();
}

#[tokio::test]
async fn admin_channel_greets_and_adds_documents() {
    let harness = TestHarness::new().await.unwrap();
    let (addr, shutdown) = start(&harness).await;

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws/data")).await.unwrap();
    assert_eq!(next_text(&mut socket).await, mnemo_agent::admin::GREETING);

    socket
        .send(Message::Text(
            r#"{"operate":"addDoc","content":"the moon orbits the earth"}"#.into(),
        ))
        .await
        .unwrap();
    assert_eq!(next_text(&mut socket).await, "document added");

    socket
        .send(Message::Text(r#"{"operate":"scanDoc"}"#.into()))
        .await
        .unwrap();
    assert_eq!(next_text(&mut socket).await, "the moon orbits the earth");

    shutdown.cancel();
}

#[tokio::test]
async fn resume_without_session_id_is_refused() {
    let harness = TestHarness::new().await.unwrap();
    let (addr, shutdown) = start(&harness).await;

    let result = connect_async(format!("ws://{addr}/ws/chat/user/continue?user=bob")).await;
    assert!(result.is_err());

    shutdown.cancel();
}

#[tokio::test]
async fn closing_mid_turn_persists_nothing() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .provider
        .push_delayed_reply(Duration::from_millis(400), "nobody is listening")
        .await;
    let (addr, shutdown) = start(&harness).await;

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws/chat/user?user=hal"))
        .await
        .unwrap();
    socket
        .send(Message::Text(r#"{"content":"are you there?"}"#.into()))
        .await
        .unwrap();

    // Wait until the model call is in flight, then hang up.
    while harness.provider.request_count().await == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    socket.close(None).await.unwrap();
    drop(socket);
    tokio::time::sleep(Duration::from_millis(800)).await;

    let sessions = harness.storage.list_sessions("hal").await.unwrap();
    assert!(sessions.is_empty());

    shutdown.cancel();
}

#[tokio::test]
async fn message_sent_mid_turn_is_answered_next() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .provider
        .push_delayed_reply(Duration::from_millis(200), "first reply")
        .await;
    harness.provider.push_reply("second reply").await;
    let (addr, shutdown) = start(&harness).await;

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws/chat/user?user=ida"))
        .await
        .unwrap();
    for content in ["one", "two"] {
        let frame = serde_json::json!({ "content": content }).to_string();
        socket.send(Message::Text(frame.into())).await.unwrap();
    }

    let first: serde_json::Value = serde_json::from_str(&next_text(&mut socket).await).unwrap();
    let second: serde_json::Value = serde_json::from_str(&next_text(&mut socket).await).unwrap();
    assert_eq!(first["content"], "first reply");
    assert_eq!(second["content"], "second reply");

    let key = SessionKey::new("ida", SessionId(first["session_id"].as_str().unwrap().into()));
    let contents: Vec<String> = harness
        .storage
        .read_turns(&key)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.content)
        .collect();
    assert_eq!(contents, vec!["one", "first reply", "two", "second reply"]);

    socket.close(None).await.unwrap();
    shutdown.cancel();
}
