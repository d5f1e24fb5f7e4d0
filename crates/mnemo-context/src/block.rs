// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval blocks: model-visible text synthesized from similarity hits.
//!
//! A block lives for one model call only. It is never added to the
//! conversation buffer and never persisted.

use mnemo_core::{ChatMessage, Collection, ScoredRecord};

const FACTS_HEADER: &str =
    "[Reference material, for background only. Do not quote or repeat it verbatim.]";
const MEMORIES_HEADER: &str =
    "[Past memories, for understanding only. Do not repeat them directly.]";
const ENTRY_SEPARATOR: &str = "\n---\n";

/// The hits of one collection for one turn, nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalBlock {
    pub collection: Collection,
    pub entries: Vec<String>,
}

impl RetrievalBlock {
    pub fn new(collection: Collection, records: Vec<ScoredRecord>) -> Self {
        Self {
            collection,
            entries: records.into_iter().map(|r| r.content).collect(),
        }
    }

    pub fn empty(collection: Collection) -> Self {
        Self {
            collection,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A system message carrying the collection's instruction header and
    /// the entries, or `None` when nothing passed the threshold.
    pub fn render(&self) -> Option<ChatMessage> {
        if self.is_empty() {
            return None;
        }
        let header = match self.collection {
            Collection::Facts => FACTS_HEADER,
            Collection::Memories => MEMORIES_HEADER,
        };
        Some(ChatMessage::system(format!(
            "{header}\n{}",
            self.entries.join(ENTRY_SEPARATOR)
        )))
    }
}
