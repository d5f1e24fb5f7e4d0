// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Mnemo.
//!
//! One WAL-mode database with embedded migrations holds the append-only
//! session log (`turns`) and the two embedded-record collections (`facts`,
//! `memories`). All statements go through tokio-rusqlite's single
//! background thread.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::{Database, map_tr_err};
