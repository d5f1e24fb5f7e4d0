// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding collaborator.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemo_core::traits::{EmbeddingAdapter, PluginAdapter};
use mnemo_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use mnemo_core::MnemoError;

/// Dimension of the fallback vectors.
pub const MOCK_DIMENSIONS: usize = 4;

/// Embeds text deterministically.
///
/// Texts registered with [`MockEmbedder::set_vector`] map to that exact
/// vector; any other text maps to a hash-derived vector with components in
/// `[0, 10)`, so unrelated texts land far outside a 0.5 threshold.
pub struct MockEmbedder {
    vectors: Mutex<HashMap<String, Vec<f32>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            vectors: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_vector(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.vectors.lock().await.insert(text.into(), vector);
    }

    /// While set, every call fails with an embedding error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_vector(text: &str) -> Vec<f32> {
    (0..MOCK_DIMENSIONS)
        .map(|i| {
            let mut hasher = DefaultHasher::new();
            (i, text).hash(&mut hasher);
            (hasher.finish() % 10_000) as f32 / 1_000.0
        })
        .collect()
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemoError::embedding("mock embedder failure"));
        }
        let vectors = self.vectors.lock().await;
        let embeddings: Vec<Vec<f32>> = input
            .texts
            .iter()
            .map(|t| {
                vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| fallback_vector(t))
            })
            .collect();
        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
