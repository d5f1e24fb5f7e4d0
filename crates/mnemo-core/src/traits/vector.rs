// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store trait shared by the facts and memories collections.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::{Collection, RecordId, ScoredRecord};

/// Similarity store over immutable embedded records.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Appends an immutable record.
    async fn insert(
        &self,
        collection: Collection,
        content: &str,
        embedding: &[f32],
    ) -> Result<RecordId, MnemoError>;

    /// Returns up to `k` records nearest to `embedding`, ascending by
    /// distance. Records farther than the store's similarity threshold are
    /// dropped, so an empty result is a normal outcome.
    async fn query(
        &self,
        collection: Collection,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, MnemoError>;

    /// Unranked full read of a collection's contents.
    async fn scan(&self, collection: Collection) -> Result<Vec<String>, MnemoError>;
}
