// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Mnemo agent.
//!
//! [`SessionActor`] drives one chat connection through the turn state
//! machine; [`AdminService`] serves the knowledge-management channel.
//! Both receive their collaborators at construction time through
//! [`ChatServices`] and [`AdminService::new`].

pub mod admin;
pub mod session;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use mnemo_config::MnemoConfig;
use mnemo_context::ContextAssembler;
use mnemo_core::traits::{ProviderAdapter, StorageAdapter};

pub use admin::{AdminOp, AdminService};
pub use session::{ChatMode, PendingReply, SessionActor, TurnState};
pub use shutdown::install_signal_handler;

/// Process-wide collaborators shared by every chat connection.
#[derive(Clone)]
pub struct ChatServices {
    pub assembler: Arc<ContextAssembler>,
    pub storage: Arc<dyn StorageAdapter>,
    pub provider: Arc<dyn ProviderAdapter>,
    pub model_timeout: Duration,
    pub max_tokens: Option<u32>,
}

impl ChatServices {
    pub fn new(
        config: &MnemoConfig,
        assembler: Arc<ContextAssembler>,
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            assembler,
            storage,
            provider,
            model_timeout: config.retrieval.model_timeout(),
            max_tokens: Some(config.provider.max_tokens),
        }
    }
}
