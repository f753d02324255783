//! Result store: id allocation, per-record commit/rollback, read back.

use anyhow::{Context, Result};
use log::warn;
use rusqlite::{Connection, params};
use std::path::Path;

use crate::ScanResultRecord;
use crate::errors::PersistenceError;

use super::INSERT_RESULT_SQL;
use super::connection::{ensure_schema, open_db, open_db_in_memory};

/// Owns the connection for a run. One transaction per insert; nothing is batched across files.
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open (or create) the store at `path` with the schema applied.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wrap an already-open connection. Call [`Self::ensure_schema`] before use.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the results table when missing. Idempotent.
    pub fn ensure_schema(&self) -> Result<()> {
        ensure_schema(&self.conn)
    }

    /// `max(id) + 1`, or 1 for an empty table.
    pub fn next_id(&self) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COALESCE(MAX(id), 0) + 1 FROM search_results",
                [],
                |row| row.get(0),
            )
            .context("query max id")
    }

    /// Persist one record in its own transaction. On failure the transaction is rolled back
    /// and the error names the record's path; [`PersistenceError::Rollback`] means even that failed.
    pub fn insert(&mut self, record: &ScanResultRecord) -> Result<(), PersistenceError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|source| PersistenceError::Insert {
                path: record.path.clone(),
                source,
            })?;
        let inserted = tx.execute(
            INSERT_RESULT_SQL,
            params![
                record.id,
                record.timestamp,
                record.path,
                record.content_type,
                record.matched_terms,
                record.matched_content,
            ],
        );
        match inserted {
            Ok(_) => tx.commit().map_err(|source| PersistenceError::Commit {
                path: record.path.clone(),
                source,
            }),
            Err(source) => match tx.rollback() {
                Ok(()) => Err(PersistenceError::Insert {
                    path: record.path.clone(),
                    source,
                }),
                Err(rollback) => {
                    warn!("insert of {} failed: {}", record.path, source);
                    Err(PersistenceError::Rollback {
                        path: record.path.clone(),
                        source: rollback,
                    })
                }
            },
        }
    }

    /// All records ordered by id.
    pub fn load_results(&self) -> Result<Vec<ScanResultRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, path, type, matched_terms, matched_content \
             FROM search_results ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ScanResultRecord {
                id: row.get(0)?,
                timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                path: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                content_type: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                matched_terms: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                matched_content: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.context("read result row")?);
        }
        Ok(records)
    }

    pub fn result_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM search_results", [], |row| row.get(0))
            .context("count results")?;
        Ok(n.max(0) as usize)
    }
}
