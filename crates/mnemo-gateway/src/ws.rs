// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket upgrade handlers and the socket-backed channel.

use std::collections::VecDeque;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mnemo_agent::{ChatMode, SessionActor};
use mnemo_core::error::MnemoError;
use mnemo_core::traits::ChannelAdapter;
use mnemo_core::types::{OutboundFrame, SessionId};
use serde::Deserialize;
use tracing::debug;

use crate::server::GatewayState;

/// A [`ChannelAdapter`] over one upgraded socket. Text frames carry the
/// payload; binary frames must be UTF-8.
///
/// Frames that arrive while a turn watches for the peer closing are held
/// back and handed out by later `receive` calls, in order.
pub struct WsChannel {
    socket: WebSocket,
    held: VecDeque<Result<String, MnemoError>>,
    peer_gone: bool,
}

impl WsChannel {
    pub fn new(socket: WebSocket) -> Self {
        Self {
            socket,
            held: VecDeque::new(),
            peer_gone: false,
        }
    }

    async fn next_frame(&mut self) -> Result<Option<String>, MnemoError> {
        loop {
            let Some(message) = self.socket.recv().await else {
                return Ok(None);
            };
            let message = message.map_err(|e| MnemoError::Transport {
                message: format!("websocket receive failed: {e}"),
                source: Some(Box::new(e)),
            })?;
            match message {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec())
                        .map(Some)
                        .map_err(|e| MnemoError::Decode {
                            message: format!("binary frame is not UTF-8: {e}"),
                            source: Some(Box::new(e)),
                        });
                }
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }
}

#[async_trait]
impl ChannelAdapter for WsChannel {
    async fn receive(&mut self) -> Result<Option<String>, MnemoError> {
        if let Some(held) = self.held.pop_front() {
            return held.map(Some);
        }
        if self.peer_gone {
            return Ok(None);
        }
        self.next_frame().await
    }

    async fn send(&mut self, frame: OutboundFrame) -> Result<(), MnemoError> {
        let payload = frame.encode()?;
        self.socket
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| MnemoError::Transport {
                message: format!("websocket send failed: {e}"),
                source: Some(Box::new(e)),
            })
    }

    async fn closed(&mut self) {
        if self.peer_gone {
            return;
        }
        loop {
            match self.next_frame().await {
                Ok(Some(text)) => self.held.push_back(Ok(text)),
                Err(e @ MnemoError::Decode { .. }) => self.held.push_back(Err(e)),
                Ok(None) => break,
                Err(e) => {
                    debug!(error = %e, "socket failed while a turn was in flight");
                    break;
                }
            }
        }
        self.peer_gone = true;
    }
}

/// Query string of `/ws/chat/user`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user: Option<String>,
}

/// Query string of `/ws/chat/user/continue`.
#[derive(Debug, Default, Deserialize)]
pub struct ResumeQuery {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub sessionid: Option<String>,
}

/// GET /ws/chat/temp
pub async fn temp_chat_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| run_chat(socket, state, ChatMode::Temporary, None))
}

/// GET /ws/chat/user
pub async fn user_chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Query(query): Query<UserQuery>,
) -> Response {
    ws.on_upgrade(move |socket| run_chat(socket, state, ChatMode::New, query.user))
}

/// GET /ws/chat/user/continue
pub async fn resume_chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Query(query): Query<ResumeQuery>,
) -> Response {
    let Some(session_id) = query.sessionid.filter(|s| !s.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "sessionid is required").into_response();
    };
    let mode = ChatMode::Resume(SessionId(session_id));
    ws.on_upgrade(move |socket| run_chat(socket, state, mode, query.user))
}

/// GET /ws/data
pub async fn data_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        let mut channel = WsChannel::new(socket);
        if let Err(e) = state.admin.run(&mut channel, state.shutdown.child_token()).await {
            debug!(error = %e, "admin channel ended");
        }
    })
}

async fn run_chat(socket: WebSocket, state: GatewayState, mode: ChatMode, user: Option<String>) {
    let mut channel = WsChannel::new(socket);
    let mut actor = SessionActor::new(state.chat.clone(), mode, user);
    if let Err(e) = actor.run(&mut channel, state.shutdown.child_token()).await {
        debug!(session_id = %actor.session_id(), error = %e, "chat connection ended");
    }
}
