// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection message stream.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::OutboundFrame;

/// One client connection: an ordered, bidirectional stream of text frames.
///
/// Unlike the other adapters a channel lives for a single connection, so it
/// carries no plugin identity.
#[async_trait]
pub trait ChannelAdapter: Send {
    /// Waits for the next inbound text frame. `Ok(None)` means the peer closed.
    async fn receive(&mut self) -> Result<Option<String>, MnemoError>;

    /// Sends one frame to the peer.
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), MnemoError>;

    /// Resolves once the peer has gone away.
    ///
    /// Polled only while a turn is in flight, never concurrently with
    /// [`receive`](Self::receive). Frames read while waiting must be kept
    /// for the next `receive`. The default never resolves.
    async fn closed(&mut self) {
        std::future::pending::<()>().await
    }
}
