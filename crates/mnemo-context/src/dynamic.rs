// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic zone: the per-connection conversation buffer.
//!
//! The buffer holds persisted-view history only. Retrieval blocks are kept
//! in [`PromptContext`](crate::PromptContext) and never enter it, so a turn
//! always grows the buffer by exactly one user and one assistant message.

use mnemo_core::{ChatMessage, Turn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationBuffer {
    history: Vec<ChatMessage>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a buffer from a session log replay, in log order.
    pub fn from_turns(turns: &[Turn]) -> Self {
        Self {
            history: turns.iter().map(ChatMessage::from).collect(),
        }
    }

    /// Records a completed exchange.
    pub fn commit(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.history.push(user);
        self.history.push(assistant);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
