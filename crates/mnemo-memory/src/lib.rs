// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term recall for Mnemo.
//!
//! - **RecordStore**: SQLite vector store over the facts and memories collections
//! - **Retriever**: embeds a message and queries both collections independently
//! - **RetrievalProvider**: ConditionalProvider that feeds hits to the context assembler
//! - **MemorySummarizer**: condenses a session into a memory record on demand

pub mod provider;
pub mod retriever;
pub mod store;
pub mod summarizer;
pub mod types;

pub use provider::RetrievalProvider;
pub use retriever::{Retrieved, Retriever};
pub use store::RecordStore;
pub use summarizer::MemorySummarizer;
pub use types::*;
