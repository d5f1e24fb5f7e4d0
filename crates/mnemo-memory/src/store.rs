// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed vector store for the facts and memories collections.
//!
//! Embeddings are stored as BLOBs and searched by brute-force L2 distance.

use async_trait::async_trait;
use mnemo_core::{Collection, MnemoError, RecordId, ScoredRecord, VectorStore};
use mnemo_storage::map_tr_err;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::types::{blob_to_vec, l2_distance, vec_to_blob};

/// Persistent store of immutable embedded records.
///
/// Shares the session log's connection; the `facts` and `memories` tables
/// come from the storage migrations.
pub struct RecordStore {
    conn: Connection,
    similarity_threshold: f32,
}

impl RecordStore {
    pub fn new(conn: Connection, similarity_threshold: f32) -> Self {
        Self {
            conn,
            similarity_threshold,
        }
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    async fn load_embeddings(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, Vec<f32>)>, MnemoError> {
        let sql = format!(
            "SELECT content, embedding FROM {} ORDER BY id ASC",
            collection.table_name()
        );
        self.conn
            .call(move |conn| -> Result<Vec<(String, Vec<f32>)>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| {
                    let content: String = row.get(0)?;
                    let blob: Vec<u8> = row.get(1)?;
                    Ok((content, blob_to_vec(&blob)))
                })?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Keeps the `k` nearest candidates within `threshold`, ascending by distance.
///
/// Candidates whose dimension differs from the query are skipped.
pub fn nearest_within(
    query: &[f32],
    candidates: Vec<(String, Vec<f32>)>,
    k: usize,
    threshold: f32,
) -> Vec<ScoredRecord> {
    let mut skipped = 0usize;
    let mut hits: Vec<ScoredRecord> = candidates
        .into_iter()
        .filter_map(|(content, embedding)| {
            if embedding.len() != query.len() {
                skipped += 1;
                return None;
            }
            let distance = l2_distance(query, &embedding);
            (distance <= threshold).then_some(ScoredRecord { content, distance })
        })
        .collect();

    if skipped > 0 {
        warn!(
            skipped,
            dimensions = query.len(),
            "skipped records with mismatched embedding dimensions"
        );
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits.truncate(k);
    hits
}

#[async_trait]
impl VectorStore for RecordStore {
    async fn insert(
        &self,
        collection: Collection,
        content: &str,
        embedding: &[f32],
    ) -> Result<RecordId, MnemoError> {
        let sql = format!(
            "INSERT INTO {} (content, embedding, dimensions) VALUES (?1, ?2, ?3)",
            collection.table_name()
        );
        let content = content.to_string();
        let blob = vec_to_blob(embedding);
        let dimensions = embedding.len() as i64;

        let id = self
            .conn
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.execute(&sql, rusqlite::params![content, blob, dimensions])?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(%collection, id, "record inserted");
        Ok(RecordId(id))
    }

    async fn query(
        &self,
        collection: Collection,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, MnemoError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let candidates = self.load_embeddings(collection).await?;
        Ok(nearest_within(
            embedding,
            candidates,
            k,
            self.similarity_threshold,
        ))
    }

    async fn scan(&self, collection: Collection) -> Result<Vec<String>, MnemoError> {
        let sql = format!(
            "SELECT content FROM {} ORDER BY id ASC",
            collection.table_name()
        );
        self.conn
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }
}
