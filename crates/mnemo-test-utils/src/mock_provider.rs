// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock model collaborator for deterministic testing.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemo_core::traits::{PluginAdapter, ProviderAdapter};
use mnemo_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use mnemo_core::MnemoError;

enum Scripted {
    Reply(String),
    Delayed(Duration, String),
    Fail(String),
    Stall,
}

/// A mock model that pops scripted outcomes from a FIFO queue.
///
/// When the queue is empty, `"mock response"` is returned. Every request is
/// captured for later assertions.
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Scripted::Reply).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_reply(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Scripted::Reply(text.into()));
    }

    /// The next call replies with `text` after `delay`.
    pub async fn push_delayed_reply(&self, delay: Duration, text: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Delayed(delay, text.into()));
    }

    /// The next call fails with a model error.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Scripted::Fail(message.into()));
    }

    /// The next call never returns.
    pub async fn push_stall(&self) {
        self.script.lock().await.push_back(Scripted::Stall);
    }

    /// Every request received so far, in call order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
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
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemoError> {
        self.requests.lock().await.push(request);
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Reply(content)) => Ok(ProviderResponse {
                content,
                model: "mock-model".into(),
            }),
            Some(Scripted::Delayed(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(ProviderResponse {
                    content,
                    model: "mock-model".into(),
                })
            }
            Some(Scripted::Fail(message)) => Err(MnemoError::model(message)),
            Some(Scripted::Stall) => {
                tokio::time::sleep(Duration::from_secs(86_400)).await;
                Err(MnemoError::model("stalled call resumed"))
            }
            None => Ok(ProviderResponse {
                content: "mock response".into(),
                model: "mock-model".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::ChatMessage;

    fn request(text: &str) -> ProviderRequest {
        ProviderRequest {
            messages: vec![ChatMessage::user(text)],
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn replies_in_order_then_default() {
        let provider = MockProvider::with_responses(vec!["one".into(), "two".into()]);
        assert_eq!(provider.complete(request("a")).await.unwrap().content, "one");
        assert_eq!(provider.complete(request("b")).await.unwrap().content, "two");
        assert_eq!(
            provider.complete(request("c")).await.unwrap().content,
            "mock response"
        );
        assert_eq!(provider.request_count().await, 3);
    }

    #[tokio::test]
    async fn scripted_failure_is_model_error_and_captured() {
        let provider = MockProvider::new();
        provider.push_failure("boom").await;
        let err = provider.complete(request("x")).await.unwrap_err();
        assert!(matches!(err, MnemoError::Model { .. }));
        assert_eq!(provider.requests().await[0].messages[0].content, "x");
    }
}
