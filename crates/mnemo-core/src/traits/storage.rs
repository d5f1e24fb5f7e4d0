// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the session log.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SessionId, SessionKey, Turn};

/// Append-only, per-session ordered turn log.
///
/// Sessions are partitioned by the full `(user, session_id)` pair; two
/// sessions sharing a `session_id` under different users never mix.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), MnemoError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), MnemoError>;

    /// Durably appends one turn. Append order is replay order.
    async fn append_turn(&self, key: &SessionKey, turn: &Turn) -> Result<(), MnemoError>;

    /// Returns every turn of a session in append order. Unknown keys yield an empty list.
    async fn read_turns(&self, key: &SessionKey) -> Result<Vec<Turn>, MnemoError>;

    /// Lists a user's session ids, oldest first.
    async fn list_sessions(&self, user: &str) -> Result<Vec<SessionId>, MnemoError>;
}
