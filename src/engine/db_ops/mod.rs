//! Database operations: schema, open, result store.

mod connection;
mod store;

pub use connection::{open_db, open_db_in_memory};
pub use store::ResultStore;

/// Durability pragmas. Each insert is its own commit, so a crash loses at most the in-flight record.
pub(crate) const DURABILITY_PRAGMAS: &str = r#"
        PRAGMA synchronous = FULL;
        "#;

/// Insert statement for the results table.
pub(crate) const INSERT_RESULT_SQL: &str = "INSERT INTO search_results \
     (id, timestamp, path, type, matched_terms, matched_content) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Schema for the results table. Reused as-is when it already exists.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS search_results (
    id INTEGER PRIMARY KEY,
    timestamp TEXT,
    path TEXT,
    type TEXT,
    matched_terms TEXT,
    matched_content TEXT
);
"#;
