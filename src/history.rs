//! Persisted boost history, one row per game server.
//!
//! The boost list is kept as a JSON array in a single column; callers only
//! ever see typed [`Boost`] values.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::boosts::{Boost, ServerBoostRecord};
use crate::error::StoreError;

const CURRENT_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(3);

/// Key-value store of announced boosts, keyed by server id.
pub trait HistoryStore {
    fn get(&self, server_id: u64) -> Result<Option<ServerBoostRecord>, StoreError>;

    /// Creates the record or replaces its whole boost list.
    fn put(&self, server_id: u64, boosts: &[Boost]) -> Result<(), StoreError>;
}

pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!(path = %path.display(), "opening boost history");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        run_migrations(&conn)?;

        Ok(Self { conn })
    }
}

fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    debug!(current_version = current, target_version = CURRENT_VERSION, "checking history migrations");

    if current < 1 {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS server_boosts (
                server_id INTEGER PRIMARY KEY,
                boosts    TEXT NOT NULL DEFAULT '[]'
            );",
        )
        .map_err(|e| StoreError::Migration(e.to_string()))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}

// sqlite integers are signed
fn key(server_id: u64) -> i64 {
    server_id as i64
}

impl HistoryStore for SqliteHistoryStore {
    fn get(&self, server_id: u64) -> Result<Option<ServerBoostRecord>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT boosts FROM server_boosts WHERE server_id = ?1",
                params![key(server_id)],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let boosts: Vec<Boost> = if raw.trim().is_empty() {
            vec![]
        } else {
            serde_json::from_str(&raw)?
        };

        Ok(Some(ServerBoostRecord::new(server_id, boosts)))
    }

    fn put(&self, server_id: u64, boosts: &[Boost]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(boosts)?;

        self.conn.execute(
            "INSERT INTO server_boosts (server_id, boosts) VALUES (?1, ?2)
             ON CONFLICT(server_id) DO UPDATE SET boosts = excluded.boosts",
            params![key(server_id), raw],
        )?;

        debug!(server_id, boosts = boosts.len(), "stored boost history");

        Ok(())
    }
}
