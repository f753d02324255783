//! Open the results database.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use super::{DURABILITY_PRAGMAS, SCHEMA};

/// Wait this long on a locked database before giving up on a statement.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply the schema to an open connection (idempotent; an existing table is reused as-is).
pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(())
}

/// Open or create the results DB and ensure durability pragmas + schema.
pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("open database {}", path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT).context("set busy timeout")?;
    conn.execute_batch(DURABILITY_PRAGMAS)
        .context("set durability pragmas")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Open an in-memory DB with the same schema (tests and dry library use).
pub fn open_db_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}
