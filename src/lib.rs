//! Termsift: recursive document triage. Extracts text through an Apache Tika server, matches
//! whole-word terms case-insensitively, and records each matching file in SQLite.

pub mod engine;
pub mod errors;
pub mod extract;
pub mod pipeline;
pub mod scan;
pub mod terms;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;

use crate::engine::ResultStore;
use crate::extract::TikaClient;
use crate::utils::{LogCategory, RunLog};

/// Result alias used by public termsift API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: load terms from `fields_file`, open the store at `opts.db_path`, and scan
/// `root` through the Tika server at `opts.tika_url`. Category logs go to `opts.log_dir`.
///
/// For a custom extraction backend or an already-open store, use [`scan::run_scan`].
pub fn scan_dir(fields_file: &Path, root: &Path, opts: &Opts) -> Result<RunSummary> {
    let log = RunLog::new(&opts.log_dir);
    let terms = terms::load_terms(fields_file)?;
    debug!("{} unique terms loaded from {}", terms.len(), fields_file.display());
    if !root.is_dir() {
        return Err(errors::InputError::NotADirectory(root.to_path_buf()).into());
    }
    let ((mut store, tika), _) = opts
        .retry
        .run(
            |_| {
                let store = ResultStore::open(&opts.db_path)?;
                let tika = TikaClient::new(&opts.tika_url)?;
                Ok((store, tika))
            },
            |attempt, e, wait| {
                log.error(
                    LogCategory::General,
                    &format!(
                        "Opening run resources failed (attempt {attempt}): {e:#}; retrying in {wait:?}"
                    ),
                );
            },
        )
        .inspect_err(|e| {
            log.error(LogCategory::General, &format!("Scan failed: {e:#}"));
        })?;
    scan::run_scan(&terms, root, &mut store, &tika, opts, &log)
}
