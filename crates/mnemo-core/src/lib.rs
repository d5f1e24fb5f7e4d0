// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo conversational agent.
//!
//! This crate provides the error taxonomy, the shared domain types, and the
//! trait seams between the turn orchestrator and its collaborators (model,
//! embedder, session log, vector store, client channel).

pub mod error;
pub mod traits;
pub mod types;

pub use error::MnemoError;
pub use types::{
    AdapterType, ChatMessage, Collection, HealthStatus, InboundFrame, OutboundFrame, RecordId,
    Role, ScoredRecord, SessionId, SessionKey, Turn,
};

pub use traits::{
    ChannelAdapter, EmbeddingAdapter, PluginAdapter, ProviderAdapter, StorageAdapter, VectorStore,
};
