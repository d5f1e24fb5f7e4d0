// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires the real SQLite session log and vector store to mock
//! collaborators inside a temporary directory.

use std::sync::Arc;

use mnemo_config::model::{AgentConfig, MnemoConfig, RetrievalConfig, StorageConfig};
use mnemo_context::{ContextAssembler, StaticZone};
use mnemo_core::traits::{
    EmbeddingAdapter, ProviderAdapter, StorageAdapter, VectorStore,
};
use mnemo_core::types::{Role, SessionKey, Turn};
use mnemo_core::MnemoError;
use mnemo_memory::{MemorySummarizer, RecordStore, RetrievalProvider, Retriever};
use mnemo_storage::SqliteStorage;

use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::MockProvider;

/// Persona used by every harness unless overridden.
pub const TEST_PERSONA: &str = "You are a test companion.";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    persona: String,
    retrieval: RetrievalConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            persona: TEST_PERSONA.to_string(),
            retrieval: RetrievalConfig::default(),
        }
    }

    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub async fn build(self) -> Result<TestHarness, MnemoError> {
        let temp_dir = tempfile::TempDir::new().map_err(MnemoError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let storage = Arc::new(SqliteStorage::new(storage_config.clone()));
        storage.initialize().await?;

        let store = Arc::new(RecordStore::new(
            storage.database()?.connection().clone(),
            self.retrieval.similarity_threshold,
        ));

        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let embedder = Arc::new(MockEmbedder::new());

        let retriever = Arc::new(Retriever::new(
            store.clone() as Arc<dyn VectorStore>,
            embedder.clone() as Arc<dyn EmbeddingAdapter>,
            &self.retrieval,
        ));

        let mut assembler = ContextAssembler::with_static_zone(
            StaticZone::from_persona(self.persona.clone()),
            self.retrieval.retrieval_timeout(),
        );
        assembler.add_conditional_provider(Box::new(RetrievalProvider::new(retriever.clone())));

        let summarizer = Arc::new(
            MemorySummarizer::new(
                storage.clone() as Arc<dyn StorageAdapter>,
                provider.clone() as Arc<dyn ProviderAdapter>,
                embedder.clone() as Arc<dyn EmbeddingAdapter>,
                store.clone() as Arc<dyn VectorStore>,
                self.retrieval.model_timeout(),
            )
            .with_embedding_timeout(self.retrieval.retrieval_timeout()),
        );

        let config = MnemoConfig {
            agent: AgentConfig {
                system_prompt: Some(self.persona),
                ..AgentConfig::default()
            },
            storage: storage_config,
            retrieval: self.retrieval,
            ..MnemoConfig::default()
        };

        Ok(TestHarness {
            provider,
            embedder,
            storage,
            store,
            retriever,
            assembler: Arc::new(assembler),
            summarizer,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete, isolated set of components. Dropping it removes the database.
pub struct TestHarness {
    pub provider: Arc<MockProvider>,
    pub embedder: Arc<MockEmbedder>,
    pub storage: Arc<SqliteStorage>,
    pub store: Arc<RecordStore>,
    pub retriever: Arc<Retriever>,
    pub assembler: Arc<ContextAssembler>,
    pub summarizer: Arc<MemorySummarizer>,
    pub config: MnemoConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with defaults.
    pub async fn new() -> Result<Self, MnemoError> {
        Self::builder().build().await
    }

    pub fn storage_dyn(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }

    pub fn provider_dyn(&self) -> Arc<dyn ProviderAdapter> {
        self.provider.clone()
    }

    pub fn embedder_dyn(&self) -> Arc<dyn EmbeddingAdapter> {
        self.embedder.clone()
    }

    pub fn store_dyn(&self) -> Arc<dyn VectorStore> {
        self.store.clone()
    }

    /// Appends `count` alternating user/assistant turns, `"message {i}"`.
    pub async fn seed_turns(&self, key: &SessionKey, count: usize) -> Result<Vec<Turn>, MnemoError> {
        let mut turns = Vec::with_capacity(count);
        for i in 0..count {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let turn = Turn::new(role, format!("message {i}"), 1_700_000_000 + i as i64);
            self.storage.append_turn(key, &turn).await?;
            turns.push(turn);
        }
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::{Collection, SessionId};

    #[tokio::test]
    async fn harness_wires_shared_database() {
        let harness = TestHarness::new().await.unwrap();
        let key = SessionKey::new("alice", SessionId::generate());
        harness.seed_turns(&key, 3).await.unwrap();
        assert_eq!(harness.storage.read_turns(&key).await.unwrap().len(), 3);

        harness.embedder.set_vector("doc", vec![0.0; 4]).await;
        let embedding = harness.embedder.embed_text("doc").await.unwrap();
        harness
            .store
            .insert(Collection::Facts, "doc", &embedding)
            .await
            .unwrap();
        assert_eq!(
            harness.store.scan(Collection::Facts).await.unwrap(),
            vec!["doc".to_string()]
        );
    }
}
