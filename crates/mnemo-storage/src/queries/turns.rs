// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session log queries.
//!
//! Rows are looked up by the `(user_id, session_id)` columns rather than the
//! joined `chat:{user}:{session_id}` key, which is ambiguous once a user
//! name contains `:`.

use mnemo_core::{MnemoError, SessionId, SessionKey, Turn};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Append one turn. A single INSERT, so a turn is either fully stored or absent.
pub async fn append_turn(db: &Database, key: &SessionKey, turn: &Turn) -> Result<(), MnemoError> {
    let payload = serde_json::to_string(turn)
        .map_err(|e| MnemoError::Internal(format!("encode turn: {e}")))?;
    let storage_key = key.storage_key();
    let user = key.user.clone();
    let session_id = key.session_id.0.clone();

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO turns (session_key, user_id, session_id, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![storage_key, user, session_id, payload],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All turns of a session in append order.
pub async fn read_turns(db: &Database, key: &SessionKey) -> Result<Vec<Turn>, MnemoError> {
    let user = key.user.clone();
    let session_id = key.session_id.0.clone();

    let payloads = db
        .connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT payload FROM turns
                 WHERE user_id = ?1 AND session_id = ?2
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user, session_id], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    payloads
        .iter()
        .map(|payload| serde_json::from_str(payload).map_err(MnemoError::storage))
        .collect()
}

/// Distinct session ids of a user, ordered by their first turn.
pub async fn list_sessions(db: &Database, user: &str) -> Result<Vec<SessionId>, MnemoError> {
    let user = user.to_string();
    let ids = db
        .connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT session_id FROM turns
                 WHERE user_id = ?1
                 GROUP BY session_id
                 ORDER BY MIN(id) ASC",
            )?;
            let rows = stmt.query_map(params![user], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    Ok(ids.into_iter().map(SessionId).collect())
}
