//! Public and internal types for the termsift API and pipeline.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::retry::RetryPolicy;
use crate::utils::config::{PackagePaths, TikaDefaults};

/// One row of the `search_results` table: a file with at least one matching line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResultRecord {
    pub id: i64,
    /// Insertion time, `YYYY-MM-DD HH:MM:SS` local.
    pub timestamp: String,
    /// Path as walked (relative if the root was given relative).
    pub path: String,
    /// Sanitized content type reported by the extractor.
    pub content_type: String,
    /// Distinct matched terms in order of discovery, `", "`-separated.
    pub matched_terms: String,
    /// Matched lines, trimmed, in file order, `\n`-separated.
    pub matched_content: String,
}

/// What a retry wraps when an unhandled failure escapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RetryScope {
    /// Restart the whole scan (schema check, id seeding, walk). Files already recorded
    /// are recorded again under new ids.
    WholeRun,
    /// Retry a single file's extract → match → persist unit; the walk never restarts.
    #[default]
    PerFile,
}

/// How a single walked path ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// Directory, special file or dangling link.
    NotRegular,
    /// Extraction produced no text (or failed).
    Empty,
    /// Text extracted, no line matched.
    NoMatch,
    /// Record stored under this id.
    Recorded(i64),
    /// Matched, but the insert was rolled back.
    InsertFailed,
    /// The file's unit raised an unexpected failure on every per-file attempt.
    Failed,
}

/// Counters for one run, returned by [`scan_dir`](crate::scan_dir) and [`run_scan`](crate::scan::run_scan).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Regular files handed to the extractor.
    pub files_seen: usize,
    pub empty: usize,
    pub no_match: usize,
    pub recorded: usize,
    pub insert_failed: usize,
    /// Files whose unit failed on every per-file attempt.
    pub failed: usize,
    pub walk_errors: usize,
    /// Run-level attempts used: whole passes in whole-run scope, setup attempts in per-file scope.
    pub attempts: u32,
}

impl RunSummary {
    pub(crate) fn count(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::NotRegular => return,
            FileOutcome::Empty => self.empty += 1,
            FileOutcome::NoMatch => self.no_match += 1,
            FileOutcome::Recorded(_) => self.recorded += 1,
            FileOutcome::InsertFailed => self.insert_failed += 1,
            FileOutcome::Failed => self.failed += 1,
        }
        self.files_seen += 1;
    }
}

/// Full options (CLI and lib). `Default` gives the documented defaults.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Results database. Created with the schema if missing.
    pub db_path: PathBuf,
    /// Base URL of the Tika server.
    pub tika_url: String,
    /// Per-file extraction timeout.
    pub extract_timeout: Duration,
    pub retry: RetryPolicy,
    pub retry_scope: RetryScope,
    /// Directory for the category log files.
    pub log_dir: PathBuf,
    /// Follow symbolic links into directories.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, matched on file name or full path).
    pub exclude: Vec<String>,
    /// Strict mode: an unreadable directory fails the attempt instead of being skipped.
    pub strict: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        let paths = PackagePaths::get();
        Opts {
            db_path: PathBuf::from(paths.default_db_filename()),
            tika_url: TikaDefaults::ENDPOINT.to_string(),
            extract_timeout: Duration::from_secs(TikaDefaults::TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            retry_scope: RetryScope::default(),
            log_dir: PathBuf::from(paths.default_log_dir()),
            follow_links: false,
            exclude: Vec::new(),
            strict: false,
            verbose: false,
        }
    }
}
