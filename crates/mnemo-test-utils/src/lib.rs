// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemo integration tests.
//!
//! Mock collaborators and a harness over a temporary SQLite database, so
//! the full pipeline runs deterministically without network access.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted model replies, failure injection, request capture
//! - [`MockEmbedder`] - deterministic vectors with per-text overrides
//! - [`MockChannel`] - scripted inbound frames, captured outbound frames
//! - [`TestHarness`] - every storage and retrieval component wired together

pub mod harness;
pub mod mock_channel;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_channel::MockChannel;
pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
