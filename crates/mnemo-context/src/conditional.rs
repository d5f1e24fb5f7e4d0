// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conditional zone: providers that contribute transient retrieval blocks.

use async_trait::async_trait;
use mnemo_core::MnemoError;

use crate::block::RetrievalBlock;

/// Supplies retrieval blocks for the message being answered.
///
/// The assembler calls every registered provider once per turn and places
/// their blocks between the preamble and the conversation history.
#[async_trait]
pub trait ConditionalProvider: Send + Sync {
    /// Blocks relevant to `query`. Empty blocks are allowed.
    async fn provide_context(&self, query: &str) -> Result<Vec<RetrievalBlock>, MnemoError>;
}
