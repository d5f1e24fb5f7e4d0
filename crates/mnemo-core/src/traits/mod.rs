// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the orchestrator and its collaborators.
//!
//! Long-lived adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod embedding;
pub mod provider;
pub mod storage;
pub mod vector;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use embedding::EmbeddingAdapter;
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
pub use vector::VectorStore;
