// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible adapters for the Mnemo agent.
//!
//! [`OpenAiProvider`] implements [`ProviderAdapter`] over `/chat/completions`,
//! and [`OpenAiEmbedder`] implements [`EmbeddingAdapter`] over `/embeddings`.
//! Both share one [`OpenAiClient`] configuration.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use mnemo_config::model::ProviderConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
use mnemo_core::types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, ProviderRequest, ProviderResponse,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, EmbeddingRequest, WireMessage};

/// Chat model adapter.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, MnemoError> {
        let client = build_client(config)?;
        info!(model = config.chat_model, "chat provider initialized");
        Ok(Self::with_client(client, config.chat_model.clone(), config.max_tokens))
    }

    pub fn with_client(client: OpenAiClient, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }

    fn to_wire_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemoError> {
        let wire = self.to_wire_request(&request);
        debug!(messages = wire.messages.len(), "sending chat completion");
        let response = self.client.chat_completion(&wire).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MnemoError::model("completion contained no choices"))?;
        let content = choice
            .message
            .content
            .ok_or_else(|| MnemoError::model("completion contained no text content"))?;

        Ok(ProviderResponse {
            content,
            model: if response.model.is_empty() {
                self.model.clone()
            } else {
                response.model
            },
        })
    }
}

/// Embedding adapter. Vectors come back in input order.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &ProviderConfig) -> Result<Self, MnemoError> {
        let client = build_client(config)?;
        info!(model = config.embedding_model, "embedding adapter initialized");
        Ok(Self::with_client(client, config.embedding_model.clone()))
    }

    pub fn with_client(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemoError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }
        let expected = input.texts.len();
        let response = self
            .client
            .embeddings(&EmbeddingRequest {
                model: self.model.clone(),
                input: input.texts,
            })
            .await?;

        let mut data = response.data;
        if data.len() != expected {
            return Err(MnemoError::embedding(format!(
                "expected {expected} vectors, got {}",
                data.len()
            )));
        }
        data.sort_by_key(|d| d.index);
        let dimensions = data.first().map(|d| d.embedding.len()).unwrap_or(0);
        Ok(EmbeddingOutput {
            embeddings: data.into_iter().map(|d| d.embedding).collect(),
            dimensions,
        })
    }
}

fn build_client(config: &ProviderConfig) -> Result<OpenAiClient, MnemoError> {
    let api_key = resolve_api_key(&config.api_key)?;
    OpenAiClient::new(
        &api_key,
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
    )
}

/// Resolves the API key from config, falling back to `OPENAI_API_KEY`.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, MnemoError> {
    if let Some(key) = config_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }
    std::env::var("OPENAI_API_KEY").map_err(|_| {
        MnemoError::Config(
            "API key not found. Set provider.api_key in config or the OPENAI_API_KEY environment variable."
                .into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> OpenAiClient {
        OpenAiClient::new("k", uri, Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    #[test]
    fn configured_key_wins() {
        assert_eq!(resolve_api_key(&Some("sk-config".into())).unwrap(), "sk-config");
    }

    #[test]
    fn wire_request_uses_lowercase_roles_and_default_max_tokens() {
        let provider = OpenAiProvider::with_client(client("http://localhost:1"), "m".into(), 256);
        let wire = provider.to_wire_request(&ProviderRequest {
            messages: vec![
                ChatMessage::system("persona"),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
            ],
            max_tokens: None,
        });
        let roles: Vec<_> = wire.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant"]);
        assert_eq!(wire.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-4o-mini-2024",
                "choices": [{"message": {"role": "assistant", "content": "meow"}}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::with_client(client(&server.uri()), "gpt-4o-mini".into(), 64);
        let resp = provider
            .complete(ProviderRequest {
                messages: vec![ChatMessage::user("hello")],
                max_tokens: None,
            })
            .await
            .unwrap();
        assert_eq!(resp.content, "meow");
        assert_eq!(resp.model, "gpt-4o-mini-2024");
    }

    #[tokio::test]
    async fn complete_without_choices_is_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let provider = OpenAiProvider::with_client(client(&server.uri()), "m".into(), 64);
        let err = provider
            .complete(ProviderRequest {
                messages: vec![ChatMessage::user("x")],
                max_tokens: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::Model { .. }));
    }

    #[tokio::test]
    async fn embeddings_are_reordered_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::with_client(client(&server.uri()), "e".into());
        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(out.dimensions, 2);
    }

    #[tokio::test]
    async fn short_embedding_response_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
            )
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::with_client(client(&server.uri()), "e".into());
        let err = embedder.embed_text("a").await.unwrap_err();
        assert!(matches!(err, MnemoError::Embedding { .. }));
    }
}
