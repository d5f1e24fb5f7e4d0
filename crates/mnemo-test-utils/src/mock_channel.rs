// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport channel.

use std::collections::VecDeque;

use async_trait::async_trait;

use mnemo_core::traits::ChannelAdapter;
use mnemo_core::types::OutboundFrame;
use mnemo_core::MnemoError;

/// A scripted peer.
///
/// `receive()` yields the queued raw frames in order, then reports the peer
/// as closed (or waits forever when [`MockChannel::hold_open`] is set).
/// Every frame passed to `send()` is captured.
#[derive(Debug, Default)]
pub struct MockChannel {
    inbound: VecDeque<String>,
    sent: Vec<OutboundFrame>,
    hold_open: bool,
    fail_sends: bool,
    drop_mid_turn: bool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON frame `{user, session_id, content}`; empty fields are omitted.
    pub fn push_message(&mut self, user: &str, session_id: &str, content: &str) {
        let mut frame = serde_json::Map::new();
        if !user.is_empty() {
            frame.insert("user".into(), user.into());
        }
        if !session_id.is_empty() {
            frame.insert("session_id".into(), session_id.into());
        }
        frame.insert("content".into(), content.into());
        self.inbound
            .push_back(serde_json::Value::Object(frame).to_string());
    }

    /// Queues an admin frame `{operate, user, session_id, content}`.
    pub fn push_operation(&mut self, operate: &str, user: &str, session_id: &str, content: &str) {
        let frame = serde_json::json!({
            "operate": operate,
            "user": user,
            "session_id": session_id,
            "content": content,
        });
        self.inbound.push_back(frame.to_string());
    }

    /// Queues a raw text frame, which need not be valid JSON.
    pub fn push_raw(&mut self, raw: impl Into<String>) {
        self.inbound.push_back(raw.into());
    }

    /// Keep the connection open once the script is exhausted.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Make every `send()` fail as a broken transport.
    pub fn fail_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Report the peer as gone as soon as a turn starts waiting on it.
    pub fn drop_mid_turn(mut self) -> Self {
        self.drop_mid_turn = true;
        self
    }

    pub fn sent(&self) -> &[OutboundFrame] {
        &self.sent
    }

    /// Text of every sent frame: reply content or the plain notice.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|frame| match frame {
                OutboundFrame::Reply { content, .. } => content.clone(),
                OutboundFrame::Text(text) => text.clone(),
            })
            .collect()
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn receive(&mut self) -> Result<Option<String>, MnemoError> {
        match self.inbound.pop_front() {
            Some(raw) => Ok(Some(raw)),
            None if self.hold_open => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn send(&mut self, frame: OutboundFrame) -> Result<(), MnemoError> {
        if self.fail_sends {
            return Err(MnemoError::transport("mock transport closed"));
        }
        self.sent.push(frame);
        Ok(())
    }

    async fn closed(&mut self) {
        if !self.drop_mid_turn {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::InboundFrame;

    #[tokio::test]
    async fn scripted_frames_then_close() {
        let mut channel = MockChannel::new();
        channel.push_message("alice", "", "say \"hi\"\n");
        let raw = channel.receive().await.unwrap().unwrap();
        let frame = InboundFrame::decode(&raw).unwrap();
        assert_eq!(frame.user, "alice");
        assert_eq!(frame.content, "say \"hi\"\n");
        assert!(frame.session_id.is_empty());
        assert!(channel.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn captures_sends() {
        let mut channel = MockChannel::new();
        channel.send(OutboundFrame::text("hello")).await.unwrap();
        assert_eq!(channel.sent_texts(), vec!["hello".to_string()]);

        let mut broken = MockChannel::new().fail_sends();
        assert!(broken.send(OutboundFrame::text("x")).await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn closed_resolves_only_when_dropping() {
        let mut dropping = MockChannel::new().drop_mid_turn();
        dropping.closed().await;

        let mut live = MockChannel::new();
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(20), live.closed()).await;
        assert!(waited.is_err());
    }
}
