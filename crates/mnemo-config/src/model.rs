// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Persona and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI-compatible model and embedding endpoint.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// SQLite database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Similarity retrieval and per-call deadlines.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// WebSocket gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent persona and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent, used in the default persona.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline persona prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the persona prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "mnemo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI-compatible API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API, without the trailing `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mnemo").join("mnemo.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("mnemo.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Similarity retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum distance for a record to count as relevant (lower is closer).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Nearest facts fetched per turn.
    #[serde(default = "default_top_k")]
    pub facts_top_k: usize,

    /// Nearest memories fetched per turn.
    #[serde(default = "default_top_k")]
    pub memories_top_k: usize,

    /// Deadline for one turn's embedding plus both queries.
    #[serde(default = "default_retrieval_timeout_secs")]
    pub retrieval_timeout_secs: u64,

    /// Deadline for one model call.
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            facts_top_k: default_top_k(),
            memories_top_k: default_top_k(),
            retrieval_timeout_secs: default_retrieval_timeout_secs(),
            model_timeout_secs: default_model_timeout_secs(),
        }
    }
}

impl RetrievalConfig {
    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieval_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}

fn default_similarity_threshold() -> f32 {
    0.5
}

fn default_top_k() -> usize {
    3
}

fn default_retrieval_timeout_secs() -> u64 {
    10
}

fn default_model_timeout_secs() -> u64 {
    120
}

/// WebSocket gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Whether `serve` starts the gateway.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_defaults() {
        let retrieval = RetrievalConfig::default();
        assert_eq!(retrieval.similarity_threshold, 0.5);
        assert_eq!(retrieval.facts_top_k, 3);
        assert_eq!(retrieval.memories_top_k, 3);
        assert_eq!(retrieval.model_timeout(), Duration::from_secs(120));
        assert_eq!(retrieval.retrieval_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: MnemoConfig = toml::from_str("").unwrap();
        assert_eq!(config.agent.name, "mnemo");
        assert_eq!(config.gateway.port, 8080);
        assert!(config.storage.wal_mode);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn deny_unknown_fields_in_retrieval() {
        let result = toml::from_str::<MnemoConfig>("[retrieval]\ntop_k = 5\n");
        assert!(result.is_err());
    }
}
