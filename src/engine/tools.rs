//! Path filters and small text helpers

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::utils::config::UNKNOWN_CONTENT_TYPE;

/// Paths the walk must never hand to the extractor: the results database (with its
/// journal/WAL/SHM siblings) and anything inside the log directory.
#[derive(Clone, Debug, Default)]
pub struct WalkFilter {
    pub db_canonical: Option<PathBuf>,
    pub log_dir_canonical: Option<PathBuf>,
    pub exclude: Vec<String>,
}

impl WalkFilter {
    pub fn new(db_path: &Path, log_dir: &Path, exclude: &[String]) -> Self {
        Self {
            db_canonical: db_path.canonicalize().ok(),
            log_dir_canonical: log_dir.canonicalize().ok(),
            exclude: exclude.to_vec(),
        }
    }

    fn is_store_file(&self, canonical: &Path) -> bool {
        let Some(db) = &self.db_canonical else {
            return false;
        };
        if canonical == db {
            return true;
        }
        let (Some(name), Some(db_name)) = (
            canonical.file_name().and_then(|n| n.to_str()),
            db.file_name().and_then(|n| n.to_str()),
        ) else {
            return false;
        };
        canonical.parent() == db.parent()
            && ["-journal", "-wal", "-shm"]
                .iter()
                .any(|suffix| name == format!("{db_name}{suffix}"))
    }

    /// Returns true if the walked `path` should be scanned.
    pub fn should_scan(&self, path: &Path) -> bool {
        if self.db_canonical.is_some() || self.log_dir_canonical.is_some() {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if self.is_store_file(&canonical) {
                return false;
            }
            if let Some(logs) = &self.log_dir_canonical
                && canonical.starts_with(logs)
            {
                return false;
            }
        }
        if self.exclude.is_empty() {
            return true;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let path_str = path.to_str().unwrap_or("");
        !self
            .exclude
            .iter()
            .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
    }
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.strip_prefix('!').unwrap_or(pattern).chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_chars(&pattern, &text)
}

fn glob_match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| glob_match_chars(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && glob_match_chars(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && glob_match_chars(rest, &text[1..]),
    }
}

/// Unicode "Other" (control, format, surrogate, private use, unassigned) and "Separator"
/// categories, except the ASCII space.
fn non_printable() -> &'static Regex {
    static NON_PRINTABLE: OnceLock<Regex> = OnceLock::new();
    NON_PRINTABLE
        .get_or_init(|| Regex::new(r"[[\p{C}\p{Z}]--[ ]]").expect("static non-printable class"))
}

/// Keep printable characters only.
pub fn clean_string(s: &str) -> String {
    non_printable().replace_all(s, "").into_owned()
}

/// Sanitize an extractor-reported content type; missing or blank becomes `"unknown"`.
pub fn sanitize_content_type(raw: Option<&str>) -> String {
    let cleaned = raw.map(clean_string).unwrap_or_default();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        UNKNOWN_CONTENT_TYPE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Path as stored in the `path` column.
pub fn path_to_db_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
