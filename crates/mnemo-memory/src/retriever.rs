// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-collection similarity retrieval for one user message.
//!
//! The message is embedded once, then facts and memories are queried
//! separately, each with its own `k` and the store's threshold.

use std::sync::Arc;

use mnemo_config::model::RetrievalConfig;
use mnemo_core::{Collection, EmbeddingAdapter, MnemoError, ScoredRecord, VectorStore};
use tracing::{debug, warn};

/// Hits for one message, per collection, nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieved {
    pub facts: Vec<ScoredRecord>,
    pub memories: Vec<ScoredRecord>,
}

pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    facts_top_k: usize,
    memories_top_k: usize,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            facts_top_k: config.facts_top_k,
            memories_top_k: config.memories_top_k,
        }
    }

    /// Embeds `query` and runs both collection queries concurrently.
    ///
    /// A failed embedding is reported as [`MnemoError::Retrieval`]. A failed
    /// collection query is logged and that collection alone comes back
    /// empty.
    pub async fn retrieve(&self, query: &str) -> Result<Retrieved, MnemoError> {
        let embedding = self
            .embedder
            .embed_text(query)
            .await
            .map_err(as_retrieval("embedding the message"))?;

        let (facts, memories) = tokio::join!(
            self.store
                .query(Collection::Facts, &embedding, self.facts_top_k),
            self.store
                .query(Collection::Memories, &embedding, self.memories_top_k),
        );
        let retrieved = Retrieved {
            facts: or_empty(Collection::Facts, facts),
            memories: or_empty(Collection::Memories, memories),
        };

        debug!(
            facts = retrieved.facts.len(),
            memories = retrieved.memories.len(),
            "similarity retrieval"
        );
        Ok(retrieved)
    }
}

fn or_empty(
    collection: Collection,
    hits: Result<Vec<ScoredRecord>, MnemoError>,
) -> Vec<ScoredRecord> {
    hits.unwrap_or_else(|e| {
        warn!(%collection, error = %e, "collection query failed, using no hits");
        Vec::new()
    })
}

fn as_retrieval(stage: &'static str) -> impl Fn(MnemoError) -> MnemoError {
    move |e| MnemoError::Retrieval {
        message: format!("{stage}: {e}"),
        source: Some(Box::new(e)),
    }
}
