// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-demand reduction of a whole session into one memory record.

use std::sync::Arc;
use std::time::Duration;

use mnemo_core::types::ProviderRequest;
use mnemo_core::{
    ChatMessage, Collection, EmbeddingAdapter, MnemoError, ProviderAdapter, SessionKey,
    StorageAdapter, Turn, VectorStore,
};
use tracing::info;

const SUMMARY_INSTRUCTION: &str = "Below is the conversation history between you and {user}. \
Avoid mechanical or report-like wording. Write, in the first person, a single passage \
summarizing it as your own memory of {user}.";

/// Writes a memory only after every step succeeded; a failed generation
/// or embedding leaves the memories collection untouched.
pub struct MemorySummarizer {
    storage: Arc<dyn StorageAdapter>,
    provider: Arc<dyn ProviderAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    store: Arc<dyn VectorStore>,
    model_timeout: Duration,
    embedding_timeout: Duration,
    max_tokens: Option<u32>,
}

impl MemorySummarizer {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        store: Arc<dyn VectorStore>,
        model_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            provider,
            embedder,
            store,
            model_timeout,
            embedding_timeout: model_timeout,
            max_tokens: None,
        }
    }

    /// Deadline for embedding the summary. Defaults to the model timeout.
    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Summarizes the session, stores the memory, and returns its text.
    pub async fn summarize(&self, key: &SessionKey) -> Result<String, MnemoError> {
        let turns = self.storage.read_turns(key).await?;
        if turns.is_empty() {
            return Err(MnemoError::Internal(format!(
                "session {key} has no turns to summarize"
            )));
        }

        let request = ProviderRequest {
            messages: vec![ChatMessage::user(build_summary_prompt(&key.user, &turns))],
            max_tokens: self.max_tokens,
        };
        let response = tokio::time::timeout(self.model_timeout, self.provider.complete(request))
            .await
            .map_err(|_| MnemoError::Timeout {
                duration: self.model_timeout,
            })??;

        let memory = response.content.trim().to_string();
        if memory.is_empty() {
            return Err(MnemoError::model("summary came back empty"));
        }

        let embedding = tokio::time::timeout(self.embedding_timeout, self.embedder.embed_text(&memory))
            .await
            .map_err(|_| MnemoError::Timeout {
                duration: self.embedding_timeout,
            })??;
        let id = self
            .store
            .insert(Collection::Memories, &memory, &embedding)
            .await?;

        info!(
            session = %key,
            turns = turns.len(),
            record = id.0,
            "session summarized into memory"
        );
        Ok(memory)
    }
}

/// Instruction followed by one `role: content` line per turn.
pub fn build_summary_prompt(user: &str, turns: &[Turn]) -> String {
    let transcript = turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\n{transcript}",
        SUMMARY_INSTRUCTION.replace("{user}", user)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::Role;

    #[test]
    fn prompt_names_user_and_lists_turns() {
        let turns = vec![
            Turn::new(Role::User, "I adopted a kitten", 1),
            Turn::new(Role::Assistant, "What is its name?", 1),
        ];
        let prompt = build_summary_prompt("alice", &turns);
        assert!(prompt.contains("between you and alice"));
        assert!(prompt.contains("first person"));
        assert!(prompt.ends_with("user: I adopted a kitten\nassistant: What is its name?"));
    }
}
