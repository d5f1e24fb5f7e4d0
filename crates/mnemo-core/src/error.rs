// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemo agent.
//!
//! The variants follow the failure classes a conversation can hit. Only
//! [`MnemoError::Transport`] and [`MnemoError::Decode`] end a connection;
//! every other class is scoped to the turn in progress.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Mnemo adapters and services.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The client connection broke (send/receive failed, socket closed mid-write).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<BoxedSource>,
    },

    /// An inbound frame could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Similarity retrieval failed (vector query or the embedding it needed).
    #[error("retrieval error: {message}")]
    Retrieval {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The language model call failed or returned an unusable reply.
    #[error("model error: {message}")]
    Model {
        message: String,
        source: Option<BoxedSource>,
    },

    /// The embedding collaborator failed.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<BoxedSource>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage { source: BoxedSource },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Whether this error must tear down the current connection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Decode { .. })
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            source: None,
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
            source: None,
        }
    }

    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}

impl From<serde_json::Error> for MnemoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
