// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport for the Mnemo agent.
//!
//! Routes:
//! - `GET /health`
//! - `GET /ws/chat/temp`
//! - `GET /ws/chat/user?user=NAME`
//! - `GET /ws/chat/user/continue?user=NAME&sessionid=ID`
//! - `GET /ws/data`
//!
//! Each upgraded socket is wrapped in a [`WsChannel`] and handed to a
//! [`SessionActor`](mnemo_agent::SessionActor) or the
//! [`AdminService`](mnemo_agent::AdminService).

pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{GatewayState, HealthState, ServerConfig, build_router, serve, start_server};
pub use ws::WsChannel;
