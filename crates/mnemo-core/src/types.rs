// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Mnemo services.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of one conversation within a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh, collision-resistant session id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row id of an embedded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    Storage,
}

/// Speaker of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Role a persisted turn takes when replayed into a conversation:
    /// `user` stays human, anything else is treated as the assistant.
    pub fn replayed(self) -> Self {
        match self {
            Role::User => Role::User,
            Role::System | Role::Assistant => Role::Assistant,
        }
    }
}

/// One persisted message of a session. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Builds a turn stamped with the current time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self::new(role, content, chrono::Utc::now().timestamp())
    }
}

/// Partition key of the session log: a `(user, session_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user: String,
    pub session_id: SessionId,
}

impl SessionKey {
    pub fn new(user: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            user: user.into(),
            session_id,
        }
    }

    /// External key form, `chat:{user}:{session_id}`.
    pub fn storage_key(&self) -> String {
        format!("chat:{}:{}", self.user, self.session_id)
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// A role-tagged message as sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.replayed(),
            content: turn.content.clone(),
        }
    }
}

// --- Provider types ---

/// A request to the language model. The full history is resupplied on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
}

/// A complete model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Vector store types ---

/// The two disjoint similarity-searchable collections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Facts,
    Memories,
}

impl Collection {
    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Facts => "facts",
            Collection::Memories => "memories",
        }
    }
}

/// A query hit: record content and its distance to the query (lower is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub content: String,
    pub distance: f32,
}

// --- Transport frames ---

/// A decoded inbound frame. Every field is optional on the wire, and an
/// explicit `null` reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundFrame {
    #[serde(deserialize_with = "null_as_empty")]
    pub user: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub session_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub operate: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl InboundFrame {
    pub fn decode(text: &str) -> Result<Self, crate::MnemoError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A frame sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Assistant reply, encoded as JSON `{session_id, content}`.
    Reply { session_id: String, content: String },
    /// Plain-text notice for diagnostic and admin channels.
    Text(String),
}

#[derive(Serialize)]
struct ReplyWire<'a> {
    session_id: &'a str,
    content: &'a str,
}

impl OutboundFrame {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Encodes the frame as the UTF-8 text payload put on the wire.
    pub fn encode(&self) -> Result<String, crate::MnemoError> {
        match self {
            OutboundFrame::Reply {
                session_id,
                content,
            } => serde_json::to_string(&ReplyWire {
                session_id,
                content,
            })
            .map_err(|e| crate::MnemoError::Internal(format!("encode reply frame: {e}"))),
            OutboundFrame::Text(text) => Ok(text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_key_storage_form() {
        let key = SessionKey::new("alice", SessionId("s-1".into()));
        assert_eq!(key.storage_key(), "chat:alice:s-1");
        assert_eq!(key.to_string(), "chat:alice:s-1");
    }

    #[test]
    fn generated_session_ids_are_unique() {
        let ids: std::collections::HashSet<_> =
            (0..256).map(|_| SessionId::generate()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn turn_json_shape() {
        let turn = Turn::new(Role::Assistant, "hi there", 1_700_000_000);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "assistant", "content": "hi there", "timestamp": 1_700_000_000})
        );
    }

    #[test]
    fn replay_maps_non_user_roles_to_assistant() {
        assert_eq!(Role::User.replayed(), Role::User);
        assert_eq!(Role::Assistant.replayed(), Role::Assistant);
        assert_eq!(Role::System.replayed(), Role::Assistant);

        let msg = ChatMessage::from(&Turn::new(Role::System, "note", 0));
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn collection_names() {
        assert_eq!(Collection::Facts.to_string(), "facts");
        assert_eq!(Collection::from_str("memories").unwrap(), Collection::Memories);
        assert_eq!(Collection::Memories.table_name(), "memories");
    }

    #[test]
    fn inbound_frame_tolerates_missing_fields() {
        let frame = InboundFrame::decode(r#"{"content":"hello"}"#).unwrap();
        assert_eq!(frame.content, "hello");
        assert!(frame.user.is_empty());
        assert!(frame.operate.is_empty());
    }

    #[test]
    fn inbound_frame_reads_null_as_empty() {
        let frame =
            InboundFrame::decode(r#"{"user":null,"session_id":null,"content":"hi","operate":null}"#)
                .unwrap();
        assert!(frame.user.is_empty());
        assert!(frame.session_id.is_empty());
        assert!(frame.operate.is_empty());
        assert_eq!(frame.content, "hi");

        assert!(InboundFrame::decode(r#"{"content":42}"#).is_err());
    }

    #[test]
    fn inbound_frame_rejects_garbage() {
        let err = InboundFrame::decode("not json").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn reply_frame_encodes_as_json() {
        let frame = OutboundFrame::Reply {
            session_id: "abc".into(),
            content: "meow".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"session_id": "abc", "content": "meow"}));

        assert_eq!(OutboundFrame::text("plain").encode().unwrap(), "plain");
    }
}
