// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-management operations and the admin channel loop.

use std::str::FromStr;
use std::sync::Arc;

use mnemo_core::error::MnemoError;
use mnemo_core::traits::{ChannelAdapter, EmbeddingAdapter, StorageAdapter, VectorStore};
use mnemo_core::types::{Collection, InboundFrame, OutboundFrame, RecordId, SessionId, SessionKey, Turn};
use mnemo_memory::MemorySummarizer;
use strum::{Display, EnumString};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::session::USER_REQUIRED;

pub const GREETING: &str = "connected to the mnemo data channel";
pub const OPERATION_FAILED: &str = "operation failed";
pub const SESSION_REQUIRED: &str = "session_id is required";

/// Operations accepted in the `operate` field of an admin frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum AdminOp {
    AddDoc,
    ScanDoc,
    CreateMemory,
    ScanMemory,
    ScanChat,
    ViewChat,
}

/// Administrative access to the vector store and the session log.
pub struct AdminService {
    storage: Arc<dyn StorageAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    store: Arc<dyn VectorStore>,
    summarizer: Arc<MemorySummarizer>,
}

impl AdminService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        store: Arc<dyn VectorStore>,
        summarizer: Arc<MemorySummarizer>,
    ) -> Self {
        Self {
            storage,
            embedder,
            store,
            summarizer,
        }
    }

    /// Embeds `text` and stores it as a fact.
    pub async fn add_document(&self, text: &str) -> Result<RecordId, MnemoError> {
        if text.trim().is_empty() {
            return Err(MnemoError::Internal("document text is empty".into()));
        }
        let embedding = self.embedder.embed_text(text).await?;
        let id = self.store.insert(Collection::Facts, text, &embedding).await?;
        info!(record_id = id.0, "document added");
        Ok(id)
    }

    pub async fn scan_documents(&self) -> Result<Vec<String>, MnemoError> {
        self.store.scan(Collection::Facts).await
    }

    pub async fn scan_memory(&self) -> Result<Vec<String>, MnemoError> {
        self.store.scan(Collection::Memories).await
    }

    /// Summarizes a session into a new memory and returns its text.
    pub async fn create_memory(&self, user: &str, session_id: &str) -> Result<String, MnemoError> {
        let key = SessionKey::new(user, SessionId(session_id.to_string()));
        self.summarizer.summarize(&key).await
    }

    pub async fn list_sessions(&self, user: &str) -> Result<Vec<SessionId>, MnemoError> {
        self.storage.list_sessions(user).await
    }

    pub async fn view_session(&self, user: &str, session_id: &str) -> Result<Vec<Turn>, MnemoError> {
        let key = SessionKey::new(user, SessionId(session_id.to_string()));
        self.storage.read_turns(&key).await
    }

    /// Executes one decoded frame and returns the frames to send back.
    ///
    /// Input problems (unknown operation, missing user or session) are
    /// answered with a notice; operation failures are returned as errors.
    pub async fn dispatch(&self, frame: &InboundFrame) -> Result<Vec<OutboundFrame>, MnemoError> {
        let Ok(op) = AdminOp::from_str(&frame.operate) else {
            return Ok(vec![OutboundFrame::text(format!(
                "unknown operation: {}",
                frame.operate
            ))]);
        };

        let needs_user = matches!(op, AdminOp::CreateMemory | AdminOp::ScanChat | AdminOp::ViewChat);
        if needs_user && frame.user.is_empty() {
            return Ok(vec![OutboundFrame::text(USER_REQUIRED)]);
        }
        let needs_session = matches!(op, AdminOp::CreateMemory | AdminOp::ViewChat);
        if needs_session && frame.session_id.is_empty() {
            return Ok(vec![OutboundFrame::text(SESSION_REQUIRED)]);
        }

        let frames = match op {
            AdminOp::AddDoc => {
                self.add_document(&frame.content).await?;
                vec![OutboundFrame::text("document added")]
            }
            AdminOp::ScanDoc => listing(self.scan_documents().await?, "no documents"),
            AdminOp::ScanMemory => listing(self.scan_memory().await?, "no memories"),
            AdminOp::CreateMemory => {
                vec![OutboundFrame::text(
                    self.create_memory(&frame.user, &frame.session_id).await?,
                )]
            }
            AdminOp::ScanChat => listing(
                self.list_sessions(&frame.user)
                    .await?
                    .into_iter()
                    .map(|id| id.0)
                    .collect(),
                "no sessions",
            ),
            AdminOp::ViewChat => listing(
                self.view_session(&frame.user, &frame.session_id)
                    .await?
                    .into_iter()
                    .map(|turn| format!("{}: {}", turn.role, turn.content))
                    .collect(),
                "no turns",
            ),
        };
        Ok(frames)
    }

    /// Serves the admin channel until the peer closes or `cancel` fires.
    pub async fn run<C>(&self, channel: &mut C, cancel: CancellationToken) -> Result<(), MnemoError>
    where
        C: ChannelAdapter + ?Sized,
    {
        channel.send(OutboundFrame::text(GREETING)).await?;
        loop {
            let raw = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                received = channel.receive() => received?,
            };
            let Some(raw) = raw else {
                return Ok(());
            };
            let frame = InboundFrame::decode(&raw)?;

            let replies = match self.dispatch(&frame).await {
                Ok(replies) => replies,
                Err(e) => {
                    warn!(operate = %frame.operate, error = %e, "admin operation failed");
                    vec![OutboundFrame::text(OPERATION_FAILED)]
                }
            };
            for reply in replies {
                channel.send(reply).await?;
            }
        }
    }
}

fn listing(items: Vec<String>, empty_notice: &str) -> Vec<OutboundFrame> {
    if items.is_empty() {
        return vec![OutboundFrame::text(empty_notice)];
    }
    items.into_iter().map(OutboundFrame::Text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mnemo_core::Role;
    use mnemo_test_utils::{MockChannel, TestHarness};

    fn admin(harness: &TestHarness) -> AdminService {
        AdminService::new(
            harness.storage_dyn(),
            harness.embedder_dyn(),
            harness.store_dyn(),
            harness.summarizer.clone(),
        )
    }

    #[test]
    fn operation_names() {
        assert_eq!(AdminOp::from_str("addDoc").unwrap(), AdminOp::AddDoc);
        assert_eq!(AdminOp::from_str("viewChat").unwrap(), AdminOp::ViewChat);
        assert_eq!(AdminOp::ScanMemory.to_string(), "scanMemory");
        assert!(AdminOp::from_str("dropAll").is_err());
    }

    #[tokio::test]
    async fn add_then_scan_documents() {
        let harness = TestHarness::new().await.unwrap();
        let admin = admin(&harness);
        admin.add_document("the sky is blue").await.unwrap();
        admin.add_document("water is wet").await.unwrap();

        let mut docs = admin.scan_documents().await.unwrap();
        docs.sort();
        assert_eq!(docs, vec!["the sky is blue", "water is wet"]);
        assert!(admin.scan_memory().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_document_fails_when_embedding_fails() {
        let harness = TestHarness::new().await.unwrap();
        harness.embedder.set_failing(true);
        let admin = admin(&harness);
        assert!(admin.add_document("x").await.is_err());
        assert!(admin.scan_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_memory_stores_summary() {
        let harness = TestHarness::builder()
            .with_mock_responses(vec!["I remember alice loves tea.".into()])
            .build()
            .await
            .unwrap();
        let key = SessionKey::new("alice", SessionId("s1".into()));
        harness.seed_turns(&key, 4).await.unwrap();

        let admin = admin(&harness);
        let memory = admin.create_memory("alice", "s1").await.unwrap();
        assert_eq!(memory, "I remember alice loves tea.");
        assert_eq!(admin.scan_memory().await.unwrap(), vec![memory]);
    }

    #[tokio::test]
    async fn admin_channel_round_trip() {
        let harness = TestHarness::new().await.unwrap();
        let key = SessionKey::new("bob", SessionId("s9".into()));
        harness
            .storage
            .append_turn(&key, &Turn::new(Role::User, "hi", 1))
            .await
            .unwrap();
        harness
            .storage
            .append_turn(&key, &Turn::new(Role::Assistant, "hello bob", 1))
            .await
            .unwrap();

        let admin = admin(&harness);
        let mut channel = MockChannel::new();
        channel.push_operation("scanChat", "bob", "", "");
        channel.push_operation("viewChat", "bob", "s9", "");
        channel.push_operation("scanDoc", "", "", "");
        channel.push_operation("launchRockets", "", "", "");
        channel.push_operation("viewChat", "", "s9", "");

        admin.run(&mut channel, CancellationToken::new()).await.unwrap();

        assert_eq!(
            channel.sent_texts(),
            vec![
                GREETING.to_string(),
                "s9".into(),
                "user: hi".into(),
                "assistant: hello bob".into(),
                "no documents".into(),
                "unknown operation: launchRockets".into(),
                USER_REQUIRED.into(),
            ]
        );
    }

    #[tokio::test]
    async fn failed_operation_gets_generic_notice() {
        let harness = TestHarness::new().await.unwrap();
        let admin = admin(&harness);
        let mut channel = MockChannel::new();
        // Empty session: summarization fails.
        channel.push_operation("createMemory", "nobody", "none", "");

        tokio::time::timeout(
            Duration::from_secs(5),
            admin.run(&mut channel, CancellationToken::new()),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(channel.sent_texts(), vec![GREETING.to_string(), OPERATION_FAILED.into()]);
        assert!(admin.scan_memory().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn decode_failure_closes_admin_channel() {
        let harness = TestHarness::new().await.unwrap();
        let admin = admin(&harness);
        let mut channel = MockChannel::new();
        channel.push_raw("][");

        let err = admin.run(&mut channel, CancellationToken::new()).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
