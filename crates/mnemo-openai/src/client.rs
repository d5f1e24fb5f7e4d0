// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible APIs.
//!
//! [`OpenAiClient`] owns authentication, connection pooling, and a single
//! retry on transient statuses (429, 500, 502, 503).

use std::time::Duration;

use mnemo_core::MnemoError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest,
    EmbeddingResponse,
};

/// Which endpoint a call targets; decides the error class failures map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Chat,
    Embeddings,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Chat => "chat/completions",
            Endpoint::Embeddings => "embeddings",
        }
    }

    fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> MnemoError {
        match self {
            Endpoint::Chat => MnemoError::Model { message, source },
            Endpoint::Embeddings => MnemoError::Embedding { message, source },
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// Creates a client that sends `Authorization: Bearer {api_key}` on every call.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, MnemoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| MnemoError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| MnemoError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Overrides the delay between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, MnemoError> {
        self.post(Endpoint::Chat, request).await
    }

    pub async fn embeddings(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, MnemoError> {
        self.post(Endpoint::Embeddings, request).await
    }

    async fn post<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, MnemoError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, endpoint = endpoint.path(), "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| {
                    endpoint.error(format!("HTTP request failed: {e}"), Some(Box::new(e)))
                })?;

            let status = response.status();
            debug!(status = %status, attempt, endpoint = endpoint.path(), "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| {
                    endpoint.error(format!("failed to read response body: {e}"), Some(Box::new(e)))
                })?;
                return serde_json::from_str(&text).map_err(|e| {
                    endpoint.error(format!("failed to parse API response: {e}"), Some(Box::new(e)))
                });
            }

            let text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(endpoint.error(format!("API returned {status}: {text}"), None));
                continue;
            }

            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => format!(
                    "API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or(status.as_str()),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {text}"),
            };
            return Err(endpoint.error(message, None));
        }

        Err(last_error
            .unwrap_or_else(|| endpoint.error("request failed after retries".into(), None)))
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
