// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection turn state machine.
//!
//! Each turn goes AwaitingMessage -> Retrieving -> Generating -> Persisting
//! and back to AwaitingMessage. Only transport and decode failures reach
//! Closed; retrieval, model and storage failures are scoped to the turn.

use std::sync::Arc;

use mnemo_context::ConversationBuffer;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::ChannelAdapter;
use mnemo_core::types::{ChatMessage, InboundFrame, OutboundFrame, Role, SessionId, SessionKey, Turn};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::ChatServices;

/// Notice sent when an identity-bearing endpoint gets no user.
pub const USER_REQUIRED: &str = "user is required";

/// States of the per-connection turn machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the next inbound frame.
    AwaitingMessage,
    /// Embedding the message and querying both collections.
    Retrieving,
    /// Calling the model with the assembled prompt.
    Generating,
    /// Appending the user and assistant turns to the session log.
    Persisting,
    /// Terminal. The connection is torn down.
    Closed,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::AwaitingMessage => write!(f, "awaiting_message"),
            TurnState::Retrieving => write!(f, "retrieving"),
            TurnState::Generating => write!(f, "generating"),
            TurnState::Persisting => write!(f, "persisting"),
            TurnState::Closed => write!(f, "closed"),
        }
    }
}

/// How a connection treats identity, retrieval and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMode {
    /// Persona only: no user, no retrieval, nothing persisted.
    Temporary,
    /// A new persisted session under a fresh id.
    New,
    /// Continue an existing persisted session.
    Resume(SessionId),
}

/// A generated reply that has not yet been delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub message: String,
    pub content: String,
}

/// Drives one chat connection.
pub struct SessionActor {
    services: Arc<ChatServices>,
    mode: ChatMode,
    user: Option<String>,
    session_id: SessionId,
    buffer: ConversationBuffer,
    state: TurnState,
    seeded: bool,
}

impl SessionActor {
    /// `user` is the identity known at connect time, if any. Resumed
    /// sessions keep their id; every other mode gets a fresh UUID.
    pub fn new(services: Arc<ChatServices>, mode: ChatMode, user: Option<String>) -> Self {
        let session_id = match &mode {
            ChatMode::Resume(id) => id.clone(),
            ChatMode::Temporary | ChatMode::New => SessionId::generate(),
        };
        Self {
            services,
            mode,
            user: user.filter(|u| !u.is_empty()),
            session_id,
            buffer: ConversationBuffer::new(),
            state: TurnState::AwaitingMessage,
            seeded: false,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn mode(&self) -> &ChatMode {
        &self.mode
    }

    /// Persisted history plus the exchanges of this connection.
    pub fn buffer(&self) -> &ConversationBuffer {
        &self.buffer
    }

    fn transition(&mut self, next: TurnState) {
        debug!(session_id = %self.session_id, from = %self.state, to = %next, "turn state");
        self.state = next;
    }

    fn key(&self) -> Option<SessionKey> {
        match (&self.mode, &self.user) {
            (ChatMode::Temporary, _) | (_, None) => None,
            (_, Some(user)) => Some(SessionKey::new(user.clone(), self.session_id.clone())),
        }
    }

    /// Loads a resumed session's history into the buffer, once.
    ///
    /// A failed read is treated like a failed retrieval: logged, and the
    /// conversation continues without the history. Returns the number of
    /// seeded turns.
    pub async fn seed(&mut self) -> usize {
        if self.seeded || !matches!(self.mode, ChatMode::Resume(_)) {
            return 0;
        }
        let Some(key) = self.key() else {
            return 0;
        };
        self.seeded = true;
        match self.services.storage.read_turns(&key).await {
            Ok(turns) => {
                info!(session = %key, turns = turns.len(), "resuming session");
                self.buffer = ConversationBuffer::from_turns(&turns);
                turns.len()
            }
            Err(e) => {
                warn!(session = %key, error = %e, "failed to read session history, continuing without it");
                0
            }
        }
    }

    /// Adopts the frame's user when none is bound yet. Returns false when
    /// this mode needs a user and there still is none.
    fn bind_user(&mut self, frame: &InboundFrame) -> bool {
        if self.mode == ChatMode::Temporary {
            return true;
        }
        if self.user.is_none() && !frame.user.is_empty() {
            self.user = Some(frame.user.clone());
        }
        self.user.is_some()
    }

    /// Runs one turn up to, but not including, delivery.
    ///
    /// Retrieval failures degrade to an empty context. A model failure or
    /// timeout is returned as an error and leaves the session log and the
    /// buffer untouched. Storage failures while persisting are logged and
    /// the reply is still produced.
    pub async fn handle_message(&mut self, message: &str) -> Result<PendingReply, MnemoError> {
        let reply = self.generate(message).await?;
        self.persist(&reply).await;
        Ok(reply)
    }

    /// Retrieval and the model call. Dropping this future abandons the turn
    /// with nothing written.
    async fn generate(&mut self, message: &str) -> Result<PendingReply, MnemoError> {
        self.seed().await;

        let prompt = if self.mode == ChatMode::Temporary {
            self.services
                .assembler
                .compose(None, &[], &self.buffer, message)
        } else {
            self.transition(TurnState::Retrieving);
            self.services
                .assembler
                .assemble(self.user.as_deref(), &self.buffer, message)
                .await
        };

        self.transition(TurnState::Generating);
        let request = prompt.into_request(self.services.max_tokens);
        let deadline = self.services.model_timeout;
        let response =
            match tokio::time::timeout(deadline, self.services.provider.complete(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    self.transition(TurnState::AwaitingMessage);
                    return Err(e);
                }
                Err(_) => {
                    self.transition(TurnState::AwaitingMessage);
                    return Err(MnemoError::Timeout { duration: deadline });
                }
            };

        Ok(PendingReply {
            message: message.to_string(),
            content: response.content,
        })
    }

    /// Appends the user turn, then the assistant turn. Failures are logged.
    async fn persist(&mut self, reply: &PendingReply) {
        let Some(key) = self.key() else {
            return;
        };
        self.transition(TurnState::Persisting);
        let timestamp = chrono::Utc::now().timestamp();
        let user_turn = Turn::new(Role::User, reply.message.as_str(), timestamp);
        let assistant_turn = Turn::new(Role::Assistant, reply.content.as_str(), timestamp);
        for turn in [&user_turn, &assistant_turn] {
            if let Err(e) = self.services.storage.append_turn(&key, turn).await {
                error!(session = %key, role = %turn.role, error = %e, "failed to persist turn");
            }
        }
    }

    /// Records a delivered exchange in the buffer.
    pub fn commit(&mut self, reply: PendingReply) {
        self.buffer
            .commit(ChatMessage::user(reply.message), ChatMessage::assistant(reply.content));
        self.transition(TurnState::AwaitingMessage);
    }

    /// Serves the connection until the peer closes, a fatal error occurs,
    /// or `cancel` fires. A turn still retrieving or generating when the
    /// peer closes or `cancel` fires is abandoned before anything is
    /// persisted.
    pub async fn run<C>(&mut self, channel: &mut C, cancel: CancellationToken) -> Result<(), MnemoError>
    where
        C: ChannelAdapter + ?Sized,
    {
        info!(session_id = %self.session_id, mode = ?self.mode, "chat connection opened");
        let result = self.serve(channel, &cancel).await;
        self.transition(TurnState::Closed);
        match &result {
            Ok(()) => info!(session_id = %self.session_id, "chat connection closed"),
            Err(e) => warn!(session_id = %self.session_id, error = %e, "chat connection closed on error"),
        }
        result
    }

    async fn serve<C>(&mut self, channel: &mut C, cancel: &CancellationToken) -> Result<(), MnemoError>
    where
        C: ChannelAdapter + ?Sized,
    {
        loop {
            self.transition(TurnState::AwaitingMessage);
            let raw = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                received = channel.receive() => received?,
            };
            let Some(raw) = raw else {
                return Ok(());
            };
            let frame = InboundFrame::decode(&raw)?;

            if !self.bind_user(&frame) {
                channel.send(OutboundFrame::text(USER_REQUIRED)).await?;
                return Ok(());
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = channel.closed() => {
                    info!(session_id = %self.session_id, "peer closed mid-turn, turn abandoned");
                    return Ok(());
                }
                outcome = self.generate(&frame.content) => outcome,
            };

            match outcome {
                Ok(reply) => {
                    self.persist(&reply).await;
                    channel
                        .send(OutboundFrame::Reply {
                            session_id: self.session_id.to_string(),
                            content: reply.content.clone(),
                        })
                        .await?;
                    self.commit(reply);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(session_id = %self.session_id, error = %e, "turn dropped");
                }
            }
        }
    }
}
