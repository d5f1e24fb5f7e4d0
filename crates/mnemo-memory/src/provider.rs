// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ConditionalProvider that turns retrieval hits into prompt blocks.

use std::sync::Arc;

use async_trait::async_trait;
use mnemo_context::{ConditionalProvider, RetrievalBlock};
use mnemo_core::{Collection, MnemoError};

use crate::retriever::Retriever;

/// Always yields a facts block and a memories block, in that order; either
/// may be empty.
pub struct RetrievalProvider {
    retriever: Arc<Retriever>,
}

impl RetrievalProvider {
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl ConditionalProvider for RetrievalProvider {
    async fn provide_context(&self, query: &str) -> Result<Vec<RetrievalBlock>, MnemoError> {
        let retrieved = self.retriever.retrieve(query).await?;
        Ok(vec![
            RetrievalBlock::new(Collection::Facts, retrieved.facts),
            RetrievalBlock::new(Collection::Memories, retrieved.memories),
        ])
    }
}
