// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static zone: the persona preamble and the user-identity note.

use mnemo_config::model::AgentConfig;
use mnemo_core::{ChatMessage, MnemoError};
use tracing::{info, warn};

/// Persona prompt loaded once at startup.
#[derive(Debug, Clone)]
pub struct StaticZone {
    persona: String,
}

impl StaticZone {
    /// Loads the persona from config.
    ///
    /// # Priority
    /// 1. `config.system_prompt_file` -- reads from disk
    /// 2. `config.system_prompt` -- inline string
    /// 3. Default persona built from the agent name
    pub async fn new(config: &AgentConfig) -> Result<Self, MnemoError> {
        let persona = load_persona(config).await?;
        Ok(Self { persona })
    }

    /// Builds a zone from an already-known persona string.
    pub fn from_persona(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// `[persona]`, followed by the identity note when the user is known.
    pub fn preamble(&self, user: Option<&str>) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.persona.clone())];
        if let Some(user) = user {
            messages.push(identity_note(user));
        }
        messages
    }
}

/// System note naming the person the agent is talking to.
pub fn identity_note(user: &str) -> ChatMessage {
    ChatMessage::system(format!("The current user is {user}."))
}

async fn load_persona(config: &AgentConfig) -> Result<String, MnemoError> {
    if let Some(ref file_path) = config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = file_path.as_str(), "loaded persona from file");
                    return Ok(trimmed.to_string());
                }
            }
            Err(e) => {
                warn!(
                    path = file_path.as_str(),
                    error = %e,
                    "failed to read persona file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = config.system_prompt.as_deref().filter(|p| !p.is_empty()) {
        return Ok(prompt.to_string());
    }

    Ok(format!(
        "You are {}, a warm and attentive companion. Keep replies natural and in character.",
        config.name
    ))
}
