// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt context assembly for Mnemo.
//!
//! A prompt is built from three zones:
//! - **Static zone**: persona preamble and user-identity note
//! - **Conditional zone**: transient retrieval blocks (facts, memories)
//! - **Dynamic zone**: the conversation buffer plus the new user message
//!
//! Retrieval blocks are tagged [`Zone::Retrieval`] inside [`PromptContext`]
//! and exist only there. The conversation buffer is a separate list that
//! the caller commits to after the model replies.

pub mod block;
pub mod conditional;
pub mod dynamic;
pub mod static_zone;

use std::time::Duration;

use mnemo_config::model::AgentConfig;
use mnemo_core::types::ProviderRequest;
use mnemo_core::{ChatMessage, MnemoError};
use tracing::{debug, warn};

pub use block::RetrievalBlock;
pub use conditional::ConditionalProvider;
pub use dynamic::ConversationBuffer;
pub use static_zone::{StaticZone, identity_note};

/// Where a prompt entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Persona and identity note.
    Preamble,
    /// Similarity retrieval output. Never persisted, never buffered.
    Retrieval,
    /// Replayed or committed conversation history.
    History,
    /// The message being answered.
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub zone: Zone,
    pub message: ChatMessage,
}

/// The exact message list for one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    entries: Vec<ContextEntry>,
}

impl PromptContext {
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// Messages in send order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }

    /// Number of transient retrieval entries in this prompt.
    pub fn retrieval_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.zone == Zone::Retrieval)
            .count()
    }

    /// The new user message.
    pub fn pending(&self) -> Option<&ChatMessage> {
        self.entries
            .iter()
            .find(|e| e.zone == Zone::Pending)
            .map(|e| &e.message)
    }

    pub fn into_request(self, max_tokens: Option<u32>) -> ProviderRequest {
        ProviderRequest {
            messages: self.entries.into_iter().map(|e| e.message).collect(),
            max_tokens,
        }
    }
}

fn tag(zone: Zone) -> impl Fn(ChatMessage) -> ContextEntry {
    move |message| ContextEntry { zone, message }
}

/// Builds prompts from the three zones.
pub struct ContextAssembler {
    static_zone: StaticZone,
    conditional_providers: Vec<Box<dyn ConditionalProvider>>,
    retrieval_timeout: Duration,
}

impl ContextAssembler {
    pub async fn new(
        agent_config: &AgentConfig,
        retrieval_timeout: Duration,
    ) -> Result<Self, MnemoError> {
        Ok(Self::with_static_zone(
            StaticZone::new(agent_config).await?,
            retrieval_timeout,
        ))
    }

    pub fn with_static_zone(static_zone: StaticZone, retrieval_timeout: Duration) -> Self {
        Self {
            static_zone,
            conditional_providers: Vec::new(),
            retrieval_timeout,
        }
    }

    /// Registers a retrieval provider. Providers run in registration order.
    pub fn add_conditional_provider(&mut self, provider: Box<dyn ConditionalProvider>) {
        self.conditional_providers.push(provider);
    }

    pub fn static_zone(&self) -> &StaticZone {
        &self.static_zone
    }

    /// Runs every provider under the retrieval deadline.
    ///
    /// Retrieval is best-effort: a failing or slow provider is logged and
    /// contributes nothing, so the turn proceeds with less context.
    pub async fn retrieve(&self, query: &str) -> Vec<RetrievalBlock> {
        let mut blocks = Vec::new();
        for provider in &self.conditional_providers {
            match tokio::time::timeout(self.retrieval_timeout, provider.provide_context(query))
                .await
            {
                Ok(Ok(provided)) => blocks.extend(provided),
                Ok(Err(e)) => {
                    warn!(error = %e, "retrieval failed, continuing without it");
                }
                Err(_) => {
                    warn!(
                        timeout = ?self.retrieval_timeout,
                        "retrieval timed out, continuing without it"
                    );
                }
            }
        }
        debug!(
            blocks = blocks.len(),
            hits = blocks.iter().map(|b| b.entries.len()).sum::<usize>(),
            "retrieval complete"
        );
        blocks
    }

    /// `[persona, identity note, facts, memories, ...history, message]`.
    ///
    /// Empty retrieval blocks contribute no entry.
    pub fn compose(
        &self,
        user: Option<&str>,
        blocks: &[RetrievalBlock],
        buffer: &ConversationBuffer,
        message: &str,
    ) -> PromptContext {
        let entries = self
            .static_zone
            .preamble(user)
            .into_iter()
            .map(tag(Zone::Preamble))
            .chain(
                blocks
                    .iter()
                    .filter_map(RetrievalBlock::render)
                    .map(tag(Zone::Retrieval)),
            )
            .chain(
                buffer
                    .messages()
                    .iter()
                    .cloned()
                    .map(tag(Zone::History)),
            )
            .chain(std::iter::once(ChatMessage::user(message)).map(tag(Zone::Pending)))
            .collect();

        PromptContext { entries }
    }

    /// Retrieves for `message` and composes the prompt.
    pub async fn assemble(
        &self,
        user: Option<&str>,
        buffer: &ConversationBuffer,
        message: &str,
    ) -> PromptContext {
        let blocks = self.retrieve(message).await;
        self.compose(user, &blocks, buffer, message)
    }
}
