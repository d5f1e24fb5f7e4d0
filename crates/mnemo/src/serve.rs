// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo serve` and `mnemo summarize`.
//!
//! Opens the database, builds the collaborators and services once, and
//! hands shared handles to the gateway.

use std::sync::Arc;

use mnemo_agent::{AdminService, ChatServices, install_signal_handler};
use mnemo_config::MnemoConfig;
use mnemo_context::ContextAssembler;
use mnemo_core::error::MnemoError;
use mnemo_core::types::{SessionId, SessionKey};
use mnemo_core::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, StorageAdapter, VectorStore};
use mnemo_gateway::{GatewayState, ServerConfig};
use mnemo_memory::{MemorySummarizer, RecordStore, RetrievalProvider, Retriever};
use mnemo_openai::{OpenAiEmbedder, OpenAiProvider};
use mnemo_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Every long-lived component of a running process.
pub struct Runtime {
    pub storage: Arc<SqliteStorage>,
    pub chat: Arc<ChatServices>,
    pub admin: Arc<AdminService>,
    pub summarizer: Arc<MemorySummarizer>,
}

impl Runtime {
    /// Opens storage and wires every service around the given collaborators.
    pub async fn build(
        config: &MnemoConfig,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Self, MnemoError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let store: Arc<dyn VectorStore> = Arc::new(RecordStore::new(
            storage.database()?.connection().clone(),
            config.retrieval.similarity_threshold,
        ));

        let retriever = Arc::new(Retriever::new(
            store.clone(),
            embedder.clone(),
            &config.retrieval,
        ));
        let mut assembler =
            ContextAssembler::new(&config.agent, config.retrieval.retrieval_timeout()).await?;
        assembler.add_conditional_provider(Box::new(RetrievalProvider::new(retriever)));

        let storage_dyn: Arc<dyn StorageAdapter> = storage.clone();
        let summarizer = Arc::new(
            MemorySummarizer::new(
                storage_dyn.clone(),
                provider.clone(),
                embedder.clone(),
                store.clone(),
                config.retrieval.model_timeout(),
            )
            .with_embedding_timeout(config.retrieval.retrieval_timeout())
            .with_max_tokens(config.provider.max_tokens),
        );

        let chat = Arc::new(ChatServices::new(
            config,
            Arc::new(assembler),
            storage_dyn.clone(),
            provider,
        ));
        let admin = Arc::new(AdminService::new(
            storage_dyn,
            embedder,
            store,
            summarizer.clone(),
        ));

        Ok(Self {
            storage,
            chat,
            admin,
            summarizer,
        })
    }

    /// Builds the runtime with the HTTP model and embedding collaborators.
    pub async fn from_config(config: &MnemoConfig) -> Result<Self, MnemoError> {
        let provider: Arc<dyn ProviderAdapter> = Arc::new(OpenAiProvider::new(&config.provider)?);
        let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(OpenAiEmbedder::new(&config.provider)?);
        Self::build(config, provider, embedder).await
    }

    /// Flushes storage. Errors are logged, not returned.
    pub async fn shutdown(&self) {
        if let Err(e) = self.storage.shutdown().await {
            error!(error = %e, "storage shutdown failed");
        }
    }
}

/// Runs the `mnemo serve` command until SIGINT or SIGTERM.
pub async fn run_serve(config: MnemoConfig) -> Result<(), MnemoError> {
    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting mnemo");

    let runtime = Runtime::from_config(&config).await?;
    let cancel = install_signal_handler();

    serve_until(&config, &runtime, cancel).await?;
    runtime.shutdown().await;
    info!("mnemo stopped");
    Ok(())
}

async fn serve_until(
    config: &MnemoConfig,
    runtime: &Runtime,
    cancel: CancellationToken,
) -> Result<(), MnemoError> {
    if !config.gateway.enabled {
        warn!("gateway disabled, waiting for shutdown signal");
        cancel.cancelled().await;
        return Ok(());
    }
    let state = GatewayState::new(runtime.chat.clone(), runtime.admin.clone(), cancel);
    mnemo_gateway::start_server(&ServerConfig::from(&config.gateway), state).await
}

/// Runs the `mnemo summarize` command and returns the stored memory.
pub async fn run_summarize(
    config: MnemoConfig,
    user: &str,
    session: &str,
) -> Result<String, MnemoError> {
    init_tracing(&config.agent.log_level);
    let runtime = Runtime::from_config(&config).await?;
    let key = SessionKey::new(user, SessionId(session.to_string()));
    let result = runtime.summarizer.summarize(&key).await;
    runtime.shutdown().await;
    result
}

/// Initializes the tracing subscriber with an env-filter.
///
/// `RUST_LOG` wins when set; otherwise `mnemo={log_level},warn`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemo={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_config::model::StorageConfig;
    use mnemo_core::{Role, Turn};
    use mnemo_test_utils::{MockEmbedder, MockProvider};

    fn config_in(dir: &std::path::Path) -> MnemoConfig {
        MnemoConfig {
            storage: StorageConfig {
                database_path: dir.join("mnemo.db").display().to_string(),
                wal_mode: true,
            },
            ..MnemoConfig::default()
        }
    }

    #[tokio::test]
    async fn runtime_wires_admin_and_summarizer_to_one_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let provider = Arc::new(MockProvider::with_responses(vec![
            "I recall alice adores rainy days.".into(),
        ]));
        let runtime = Runtime::build(&config, provider, Arc::new(MockEmbedder::new()))
            .await
            .unwrap();

        let key = SessionKey::new("alice", SessionId("s1".into()));
        runtime
            .storage
            .append_turn(&key, &Turn::new(Role::User, "I love rain", 1))
            .await
            .unwrap();

        let memory = runtime.admin.create_memory("alice", "s1").await.unwrap();
        assert_eq!(runtime.admin.scan_memory().await.unwrap(), vec![memory]);
        assert_eq!(
            runtime.admin.list_sessions("alice").await.unwrap(),
            vec![SessionId("s1".into())]
        );
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn disabled_gateway_returns_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.gateway.enabled = false;
        let runtime = Runtime::build(
            &config,
            Arc::new(MockProvider::new()),
            Arc::new(MockEmbedder::new()),
        )
        .await
        .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        serve_until(&config, &runtime, cancel).await.unwrap();
    }

    #[tokio::test]
    async fn missing_api_key_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.provider.api_key = Some(String::new());
        // Only meaningful when the fallback env var is absent.
        if std::env::var("OPENAI_API_KEY").is_err() {
            let err = Runtime::from_config(&config).await.err().unwrap();
            assert!(matches!(err, MnemoError::Config(_)));
        }
    }
}
