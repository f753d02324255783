//! Scan orchestration: walk the tree, extract, match, persist; isolate per-file failures and
//! apply the retry policy to whatever escapes.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::engine::ResultStore;
use crate::engine::matcher::{MatchOutcome, SearchPattern};
use crate::engine::tools::{WalkFilter, path_to_db_string};
use crate::errors::InputError;
use crate::extract::{Extractor, TextExtractor};
use crate::pipeline::{
    WalkContext, WalkErrors, WalkOutcome, is_regular_file, report_skipped_paths, walk_paths,
};
use crate::terms::TermSet;
use crate::utils::config::MATCHED_TERMS_SEPARATOR;
use crate::utils::{LogCategory, RunLog, timestamp_now};
use crate::{FileOutcome, Opts, RetryScope, RunSummary, ScanResultRecord};

/// Where a run attempt is. Debug-logged on every transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SchemaReady,
    Walking,
    Completed,
}

/// Mutable state of one run attempt: the store handle, the id counter and the counters.
/// Ids are seeded from the store when the attempt starts and only move forward.
pub struct ScanSession<'s> {
    store: &'s mut ResultStore,
    next_id: i64,
    state: RunState,
    summary: RunSummary,
}

/// Ensure the schema and read the id the next record will get.
fn prepare_store(store: &ResultStore) -> Result<i64> {
    store.ensure_schema()?;
    store.next_id()
}

impl<'s> ScanSession<'s> {
    /// Ensure the schema and seed the id counter from the current maximum.
    pub fn begin(store: &'s mut ResultStore) -> Result<Self> {
        let next_id = prepare_store(store)?;
        Ok(Self::seeded(store, next_id))
    }

    fn seeded(store: &'s mut ResultStore, next_id: i64) -> Self {
        let mut session = Self {
            store,
            next_id,
            state: RunState::Idle,
            summary: RunSummary::default(),
        };
        session.transition(RunState::SchemaReady);
        session
    }

    fn transition(&mut self, to: RunState) {
        debug!("run state: {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Id the next record will get.
    pub fn peek_id(&self) -> i64 {
        self.next_id
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn finish(mut self) -> RunSummary {
        self.transition(RunState::Completed);
        self.summary
    }
}

/// Per-run, read-only collaborators of the file pipeline.
struct FilePipeline<'a> {
    pattern: &'a SearchPattern,
    extractor: TextExtractor<'a>,
    log: &'a RunLog,
}

impl FilePipeline<'_> {
    /// Extract → match → persist for one walked path. Expected outcomes (no text, no match,
    /// rolled-back insert) come back as `Ok`; only unrecoverable store state is an error.
    fn process_file(&self, session: &mut ScanSession<'_>, path: &Path) -> Result<FileOutcome> {
        if !is_regular_file(path) {
            return Ok(FileOutcome::NotRegular);
        }
        let Some(extracted) = self.extractor.extract_text(path) else {
            return Ok(FileOutcome::Empty);
        };
        let found = self.pattern.scan(&extracted.text);
        if !found.is_match() {
            return Ok(FileOutcome::NoMatch);
        }

        let record = build_record(session.allocate_id(), path, extracted.content_type, &found);
        match session.store.insert(&record) {
            Ok(()) => {
                self.log.info(
                    LogCategory::Persistence,
                    &format!("Inserted into database: {} (id {})", record.path, record.id),
                );
                Ok(FileOutcome::Recorded(record.id))
            }
            Err(e) if e.is_recovered() => {
                self.log.error(
                    LogCategory::Persistence,
                    &format!("Error inserting {} into database: {}", record.path, e),
                );
                Ok(FileOutcome::InsertFailed)
            }
            Err(e) => Err(e).context("result store left in an unknown state"),
        }
    }

    /// [`Self::process_file`] under the per-file retry budget. A file that keeps failing is
    /// logged and reported as [`FileOutcome::Failed`]; the walk continues.
    fn process_file_with_retry(
        &self,
        session: &mut ScanSession<'_>,
        path: &Path,
        opts: &Opts,
    ) -> FileOutcome {
        let attempt = opts.retry.run(
            |_| self.process_file(&mut *session, path),
            |attempt, e, wait| {
                self.log.warn(
                    LogCategory::General,
                    &format!(
                        "Attempt {attempt} for {} failed: {e:#}; retrying in {wait:?}",
                        path.display()
                    ),
                );
            },
        );
        match attempt {
            Ok((outcome, _)) => outcome,
            Err(e) => {
                self.log.error(
                    LogCategory::General,
                    &format!("Giving up on {}: {e:#}", path.display()),
                );
                FileOutcome::Failed
            }
        }
    }
}

fn build_record(
    id: i64,
    path: &Path,
    content_type: String,
    found: &MatchOutcome,
) -> ScanResultRecord {
    ScanResultRecord {
        id,
        timestamp: timestamp_now(),
        path: path_to_db_string(path),
        content_type,
        matched_terms: found.terms.join(MATCHED_TERMS_SEPARATOR),
        matched_content: found.lines.join("\n"),
    }
}

/// One pass over the tree. In whole-run scope any error returned here restarts the pass.
fn scan_attempt(
    pipeline: &FilePipeline<'_>,
    walk_ctx: &WalkContext,
    mut session: ScanSession<'_>,
    opts: &Opts,
) -> Result<RunSummary> {
    debug!("first id this attempt: {}", session.peek_id());
    session.transition(RunState::Walking);

    let mut walk_errors = WalkErrors::new(opts.strict);
    for outcome in walk_paths(walk_ctx) {
        let path = match outcome {
            WalkOutcome::Ok(path) => path,
            WalkOutcome::Err { msg, path } => {
                walk_errors.handle(msg, path, pipeline.log)?;
                continue;
            }
        };
        let outcome = match opts.retry_scope {
            RetryScope::WholeRun => pipeline.process_file(&mut session, &path)?,
            RetryScope::PerFile => pipeline.process_file_with_retry(&mut session, &path, opts),
        };
        session.summary.count(&outcome);
    }

    report_skipped_paths(&walk_errors, opts.verbose, pipeline.log);
    session.summary.walk_errors = walk_errors.len();
    pipeline
        .log
        .completed(LogCategory::Persistence, "Database insertion completed.");
    Ok(session.finish())
}

fn describe_terms(terms: &TermSet) -> String {
    terms.iter().collect::<Vec<_>>().join(", ")
}

/// Scan `root` for `terms`, recording matches in `store`. Extraction goes through `extractor`
/// with `opts.extract_timeout`; retries follow `opts.retry` and `opts.retry_scope`.
pub fn run_scan(
    terms: &TermSet,
    root: &Path,
    store: &mut ResultStore,
    extractor: &dyn Extractor,
    opts: &Opts,
    log: &RunLog,
) -> Result<RunSummary> {
    if !root.is_dir() {
        return Err(InputError::NotADirectory(root.to_path_buf()).into());
    }
    let pattern = SearchPattern::compile(terms)?;
    debug!("search pattern: {:?}", pattern.as_str());
    log.info(
        LogCategory::Search,
        &format!("Searching for terms: {}", describe_terms(terms)),
    );

    let pipeline = FilePipeline {
        pattern: &pattern,
        extractor: TextExtractor::new(extractor, opts.extract_timeout, log),
        log,
    };
    let walk_ctx = WalkContext {
        root: root.to_path_buf(),
        follow_links: opts.follow_links,
        filter: WalkFilter::new(&opts.db_path, &opts.log_dir, &opts.exclude),
    };

    let result = match opts.retry_scope {
        RetryScope::WholeRun => opts
            .retry
            .run(
                |attempt| {
                    if attempt > 1 {
                        log.warn(
                            LogCategory::General,
                            &format!("Restarting scan (attempt {attempt})"),
                        );
                    }
                    let session = ScanSession::begin(&mut *store)?;
                    scan_attempt(&pipeline, &walk_ctx, session, opts)
                },
                |attempt, e, wait| {
                    log.error(
                        LogCategory::General,
                        &format!("Scan attempt {attempt} failed: {e:#}; retrying in {wait:?}"),
                    );
                },
            )
            .map(|(mut summary, attempts)| {
                summary.attempts = attempts;
                summary
            }),
        // Setup gets the run budget; files get their own budget inside the walk.
        RetryScope::PerFile => opts
            .retry
            .run(
                |_| prepare_store(store),
                |attempt, e, wait| {
                    log.error(
                        LogCategory::General,
                        &format!(
                            "Scan setup attempt {attempt} failed: {e:#}; retrying in {wait:?}"
                        ),
                    );
                },
            )
            .and_then(|(next_id, attempts)| {
                let session = ScanSession::seeded(store, next_id);
                let mut summary = scan_attempt(&pipeline, &walk_ctx, session, opts)?;
                summary.attempts = attempts;
                Ok(summary)
            }),
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            log.error(LogCategory::General, &format!("Scan failed: {e:#}"));
            return Err(e.context("scan failed"));
        }
    };
    log.completed(
        LogCategory::Search,
        &format!(
            "Search completed: {} files, {} recorded, {} without matches, {} empty, {} insert failures, {} failed",
            summary.files_seen,
            summary.recorded,
            summary.no_match,
            summary.empty,
            summary.insert_failed,
            summary.failed
        ),
    );
    Ok(summary)
}
