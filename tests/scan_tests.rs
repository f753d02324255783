//! End-to-end scans with an in-process extractor standing in for the Tika server.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use termsift::engine::{ResultStore, RetryPolicy};
use termsift::errors::{ExtractionError, InputError, is_input_error};
use termsift::extract::{Extraction, Extractor};
use termsift::scan::run_scan;
use termsift::terms::TermSet;
use termsift::utils::{LogCategory, RunLog};
use termsift::{Opts, RetryScope, RunSummary, scan_dir};

/// Reads files as UTF-8 text. `*.bin` files fail like an unsupported format.
#[derive(Default)]
struct FakeExtractor {
    calls: RefCell<Vec<PathBuf>>,
}

impl FakeExtractor {
    fn saw(&self, name: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == name))
    }
}

impl Extractor for FakeExtractor {
    fn extract(&self, path: &Path, timeout: Duration) -> Result<Extraction, ExtractionError> {
        assert_eq!(timeout, Duration::from_secs(120));
        self.calls.borrow_mut().push(path.to_path_buf());
        if path.extension().is_some_and(|e| e == "bin") {
            return Err(ExtractionError::Unsupported);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Extraction {
            text,
            content_type: Some("text/plain; charset=UTF-8\n".to_string()),
        })
    }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    root: PathBuf,
    opts: Opts,
    log: RunLog,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("evidence");
    std::fs::create_dir_all(root.join("mail")).unwrap();
    std::fs::write(
        root.join("alpha.txt"),
        "Nothing here\n  The CAT sat  \nconcatenate\ncat and Dog\n",
    )
    .unwrap();
    std::fs::write(root.join("mail").join("beta.txt"), "a dog\r\nscattered\r\n").unwrap();
    std::fs::write(root.join("gamma.txt"), "no animals in this one\n").unwrap();
    std::fs::write(root.join("empty.txt"), "").unwrap();
    std::fs::write(root.join("broken.bin"), b"cat cat cat").unwrap();

    let opts = Opts {
        db_path: tmp.path().join("results-db.sqlite"),
        log_dir: tmp.path().join("logs"),
        retry: RetryPolicy::immediate(3),
        ..Opts::default()
    };
    let log = RunLog::new(&opts.log_dir);
    Fixture {
        _tmp: tmp,
        root,
        opts,
        log,
    }
}

fn terms() -> TermSet {
    TermSet::from_lines(["cat", "dog"])
}

fn scan(fx: &Fixture, store: &mut ResultStore, extractor: &FakeExtractor) -> RunSummary {
    run_scan(&terms(), &fx.root, store, extractor, &fx.opts, &fx.log).unwrap()
}

#[test]
fn test_records_only_matching_files() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    let extractor = FakeExtractor::default();

    let summary = scan(&fx, &mut store, &extractor);
    assert_eq!(summary.files_seen, 5);
    assert_eq!(summary.recorded, 2);
    assert_eq!(summary.no_match, 1);
    assert_eq!(summary.empty, 2, "empty file and failed extraction");
    assert_eq!(summary.insert_failed, 0);
    assert_eq!(summary.attempts, 1);

    let records = store.load_results().unwrap();
    assert_eq!(records.len(), 2);

    // Walk order is by file name: alpha.txt, then mail/beta.txt.
    let alpha = &records[0];
    assert_eq!(alpha.id, 1);
    assert!(alpha.path.ends_with("alpha.txt"));
    assert_eq!(alpha.content_type, "text/plain; charset=UTF-8");
    assert_eq!(alpha.matched_terms, "cat, dog");
    assert_eq!(alpha.matched_content, "The CAT sat\ncat and Dog");
    assert_eq!(alpha.timestamp.len(), "YYYY-MM-DD HH:MM:SS".len());

    let beta = &records[1];
    assert_eq!(beta.id, 2);
    assert!(beta.path.ends_with("beta.txt"));
    assert_eq!(beta.matched_terms, "dog");
    assert_eq!(beta.matched_content, "a dog");
}

#[test]
fn test_ids_continue_across_runs() {
    let fx = fixture();
    let extractor = FakeExtractor::default();
    {
        let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
        scan(&fx, &mut store, &extractor);
    }
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    scan(&fx, &mut store, &extractor);

    let ids: Vec<i64> = store.load_results().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_insert_failure_does_not_stop_the_run() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_alpha BEFORE INSERT ON search_results
             WHEN NEW.path LIKE '%alpha.txt'
             BEGIN SELECT RAISE(ABORT, 'simulated store failure'); END;",
        )
        .unwrap();
    let extractor = FakeExtractor::default();

    let summary = scan(&fx, &mut store, &extractor);
    assert_eq!(summary.insert_failed, 1);
    assert_eq!(summary.recorded, 1);
    assert_eq!(summary.failed, 0);

    let records = store.load_results().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].path.ends_with("beta.txt"));
    // The rejected record's id is spent, never reused.
    assert_eq!(records[0].id, 2);

    let sql_log =
        std::fs::read_to_string(fx.log.path_for(LogCategory::Persistence)).unwrap();
    assert!(sql_log.contains("alpha.txt"));
    assert!(sql_log.contains("simulated store failure"));
}

#[test]
fn test_failing_file_retried_then_given_up_while_run_continues() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    // RAISE(ROLLBACK) ends the transaction inside SQLite, so the store's own rollback fails
    // and the file's unit surfaces an error instead of a recovered insert failure.
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER unwind_alpha BEFORE INSERT ON search_results
             WHEN NEW.path LIKE '%alpha.txt'
             BEGIN SELECT RAISE(ROLLBACK, 'transaction unwound'); END;",
        )
        .unwrap();
    let extractor = FakeExtractor::default();

    let summary = scan(&fx, &mut store, &extractor);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.insert_failed, 0);
    assert_eq!(summary.recorded, 1);
    assert_eq!(summary.attempts, 1);

    // Extract, match and persist ran once per attempt.
    let alpha_calls = extractor
        .calls
        .borrow()
        .iter()
        .filter(|p| p.ends_with("alpha.txt"))
        .count();
    assert_eq!(alpha_calls, 3);

    let records = store.load_results().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].path.ends_with("beta.txt"));
    assert!(store.connection().is_autocommit());

    let general = std::fs::read_to_string(fx.log.path_for(LogCategory::General)).unwrap();
    assert!(general.contains("Attempt 1 for"));
    assert!(general.contains("Attempt 2 for"));
    assert!(!general.contains("Attempt 3 for"));
    let giving_up = general
        .lines()
        .find(|l| l.contains("Giving up on"))
        .unwrap();
    assert!(giving_up.contains("alpha.txt"));
    assert!(giving_up.contains("failed after 3 attempts"));
}

#[test]
fn test_run_setup_retried_while_store_is_locked() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    store.connection().busy_timeout(Duration::ZERO).unwrap();

    let holder = rusqlite::Connection::open(&fx.opts.db_path).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();
    let general_log = fx.log.path_for(LogCategory::General);
    let releaser = std::thread::spawn(move || {
        // Keep the lock until the first setup failure is logged.
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while std::time::Instant::now() < deadline
            && !std::fs::read_to_string(&general_log)
                .is_ok_and(|log| log.contains("Scan setup attempt 1 failed"))
        {
            std::thread::sleep(Duration::from_millis(5));
        }
        holder.execute_batch("COMMIT;").unwrap();
    });

    let opts = Opts {
        retry: RetryPolicy {
            max_attempts: 3,
            min_backoff: Duration::from_millis(300),
            max_backoff: Duration::from_millis(300),
        },
        ..fx.opts.clone()
    };
    let extractor = FakeExtractor::default();
    let summary = run_scan(&terms(), &fx.root, &mut store, &extractor, &opts, &fx.log).unwrap();
    releaser.join().unwrap();

    assert_eq!(summary.attempts, 2);
    assert_eq!(summary.recorded, 2);
    let ids: Vec<i64> = store.load_results().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_scan_dir_retries_opening_the_store() {
    let fx = fixture();
    let workdir = fx.root.parent().unwrap().to_path_buf();
    let fields = workdir.join("fields.txt");
    std::fs::write(&fields, "cat\ndog\n").unwrap();
    let opts = Opts {
        db_path: workdir.join("no-such-dir").join("results-db.sqlite"),
        ..fx.opts.clone()
    };

    let err = scan_dir(&fields, &fx.root, &opts).unwrap_err();
    assert!(!is_input_error(&err));
    assert!(format!("{err:#}").contains("failed after 3 attempts"));

    let general = std::fs::read_to_string(fx.log.path_for(LogCategory::General)).unwrap();
    assert!(general.contains("Opening run resources failed (attempt 1)"));
    assert!(general.contains("Opening run resources failed (attempt 2)"));
    assert!(general.contains("Scan failed"));
}

#[test]
fn test_logs_one_extraction_line_per_file() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    let extractor = FakeExtractor::default();
    scan(&fx, &mut store, &extractor);

    let extraction = std::fs::read_to_string(fx.log.path_for(LogCategory::Extraction)).unwrap();
    let processing = extraction
        .lines()
        .filter(|l| l.contains("Processing file:"))
        .count();
    assert_eq!(processing, 5);
    assert!(extraction.contains("Error processing file"));
    assert!(extraction.contains("broken.bin"));

    for category in LogCategory::ALL {
        let path = fx.log.path_for(category);
        if let Ok(content) = std::fs::read_to_string(&path) {
            assert!(!content.contains('\u{1b}'), "{} has ANSI", path.display());
        }
    }
    let search = std::fs::read_to_string(fx.log.path_for(LogCategory::Search)).unwrap();
    assert!(search.contains("Searching for terms: cat, dog"));
    assert!(search.contains("Search completed"));
}

#[test]
fn test_store_and_logs_inside_root_are_not_scanned() {
    let fx = fixture();
    let opts = Opts {
        db_path: fx.root.join("results-db.sqlite"),
        log_dir: fx.root.join("logs"),
        ..fx.opts.clone()
    };
    let log = RunLog::new(&opts.log_dir);
    let mut store = ResultStore::open(&opts.db_path).unwrap();
    // Log directory exists before the walk starts.
    log.info(LogCategory::General, "cat dog");
    let extractor = FakeExtractor::default();

    let summary = run_scan(&terms(), &fx.root, &mut store, &extractor, &opts, &log).unwrap();
    assert_eq!(summary.files_seen, 5);
    assert!(!extractor.saw("results-db.sqlite"));
    assert!(!extractor.saw("general_log.txt"));
}

#[test]
fn test_desktop_metadata_files_are_scanned() {
    let fx = fixture();
    std::fs::write(fx.root.join("Desktop.ini"), "[.ShellClassInfo]\nIconResource=dog.ico,0\n")
        .unwrap();
    std::fs::write(fx.root.join(".directory"), "Comment=the cat folder\n").unwrap();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    let extractor = FakeExtractor::default();

    let summary = scan(&fx, &mut store, &extractor);
    assert_eq!(summary.files_seen, 7);
    assert_eq!(summary.recorded, 4);
    assert!(extractor.saw("Desktop.ini"));
    assert!(extractor.saw(".directory"));
}

#[test]
fn test_missing_root_is_input_error() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    let extractor = FakeExtractor::default();
    let err = run_scan(
        &terms(),
        &fx.root.join("nope"),
        &mut store,
        &extractor,
        &fx.opts,
        &fx.log,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::NotADirectory(_))
    ));
    assert!(extractor.calls.borrow().is_empty());
}

#[test]
fn test_scan_dir_missing_fields_file() {
    let fx = fixture();
    let err = scan_dir(&fx.root.join("fields.txt"), &fx.root, &fx.opts).unwrap_err();
    assert!(is_input_error(&err));
    assert!(!fx.opts.db_path.exists(), "store is not opened on bad input");
}

#[test]
fn test_empty_term_set_records_nothing() {
    let fx = fixture();
    let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
    let extractor = FakeExtractor::default();
    let summary = run_scan(
        &TermSet::default(),
        &fx.root,
        &mut store,
        &extractor,
        &fx.opts,
        &fx.log,
    )
    .unwrap();
    assert_eq!(summary.recorded, 0);
    assert_eq!(store.result_count().unwrap(), 0);
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_dangling_symlink_skipped_silently() {
        let fx = fixture();
        symlink(fx.root.join("missing.txt"), fx.root.join("zz_dangling")).unwrap();
        symlink(fx.root.join("alpha.txt"), fx.root.join("zz_alias.txt")).unwrap();
        let mut store = ResultStore::open(&fx.opts.db_path).unwrap();
        let extractor = FakeExtractor::default();

        let summary = scan(&fx, &mut store, &extractor);
        assert!(!extractor.saw("zz_dangling"));
        // A link to a regular file is scanned like the file.
        assert!(extractor.saw("zz_alias.txt"));
        assert_eq!(summary.recorded, 3);
        assert_eq!(summary.walk_errors, 0);
    }

    fn strict_following(fx: &Fixture, scope: RetryScope) -> Opts {
        symlink(fx.root.join("missing.txt"), fx.root.join("zz_dangling")).unwrap();
        Opts {
            strict: true,
            follow_links: true,
            retry_scope: scope,
            ..fx.opts.clone()
        }
    }

    #[test]
    fn test_walk_error_tolerated_when_not_strict() {
        let fx = fixture();
        let opts = Opts {
            strict: false,
            ..strict_following(&fx, RetryScope::PerFile)
        };
        let mut store = ResultStore::open(&opts.db_path).unwrap();
        let extractor = FakeExtractor::default();

        let summary =
            run_scan(&terms(), &fx.root, &mut store, &extractor, &opts, &fx.log).unwrap();
        assert_eq!(summary.walk_errors, 1);
        assert_eq!(summary.recorded, 2);
        let general = std::fs::read_to_string(fx.log.path_for(LogCategory::General)).unwrap();
        assert!(general.contains("Skipped 1 paths"));
    }

    #[test]
    fn test_whole_run_retry_restarts_scan_and_duplicates_records() {
        let fx = fixture();
        let opts = strict_following(&fx, RetryScope::WholeRun);
        let mut store = ResultStore::open(&opts.db_path).unwrap();
        let extractor = FakeExtractor::default();

        let err =
            run_scan(&terms(), &fx.root, &mut store, &extractor, &opts, &fx.log).unwrap_err();
        assert!(format!("{err:#}").contains("failed after 3 attempts"));

        // Each attempt re-walked from the start and re-recorded what it reached
        // before the dangling link, under fresh ids.
        let records = store.load_results().unwrap();
        assert_eq!(records.len(), 6);
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        let alpha_rows = records
            .iter()
            .filter(|r| r.path.ends_with("alpha.txt"))
            .count();
        assert_eq!(alpha_rows, 3);

        let general = std::fs::read_to_string(fx.log.path_for(LogCategory::General)).unwrap();
        assert!(general.contains("Restarting scan (attempt 3)"));
        assert!(general.contains("Scan failed"));
    }

    #[test]
    fn test_per_file_scope_walk_error_is_fatal_without_restart() {
        let fx = fixture();
        let opts = strict_following(&fx, RetryScope::PerFile);
        let mut store = ResultStore::open(&opts.db_path).unwrap();
        let extractor = FakeExtractor::default();

        let err =
            run_scan(&terms(), &fx.root, &mut store, &extractor, &opts, &fx.log).unwrap_err();
        assert!(format!("{err:#}").contains("walk error"));
        assert_eq!(store.result_count().unwrap(), 2);
    }
}
