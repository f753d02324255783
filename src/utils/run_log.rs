//! Category log files: every run event is echoed to the console and appended,
//! timestamped and stripped of terminal colors, to one of four files under the log directory.

use chrono::Local;
use colored::Color;
use log::Level;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::utils::config::TIMESTAMP_FORMAT;
use crate::utils::logger::Colors;

/// Which log file an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogCategory {
    /// One line per extraction attempt, plus extraction failures.
    Extraction,
    /// Inserts, insert failures, end-of-walk markers.
    Persistence,
    /// Search start and end.
    Search,
    /// Walk errors, retries, configuration.
    General,
}

impl LogCategory {
    pub const ALL: [LogCategory; 4] = [
        LogCategory::Extraction,
        LogCategory::Persistence,
        LogCategory::Search,
        LogCategory::General,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            LogCategory::Extraction => "extraction_log.txt",
            LogCategory::Persistence => "persistence_log.txt",
            LogCategory::Search => "search_log.txt",
            LogCategory::General => "general_log.txt",
        }
    }

    fn color(self) -> Color {
        match self {
            LogCategory::Extraction => Colors::EXTRACTION,
            LogCategory::Persistence => Colors::PERSISTENCE,
            LogCategory::Search => Colors::SEARCH,
            LogCategory::General => Colors::GENERAL,
        }
    }
}

/// Current local time formatted for records and log lines.
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn ansi_pattern() -> &'static Regex {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("static ANSI pattern"))
}

/// Remove terminal SGR color sequences (`ESC [ ... m`).
pub fn strip_ansi(text: &str) -> String {
    ansi_pattern().replace_all(text, "").into_owned()
}

/// Writer for the per-category log files. Cheap to share by reference for the whole run.
#[derive(Clone, Debug)]
pub struct RunLog {
    dir: PathBuf,
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, category: LogCategory) -> PathBuf {
        self.dir.join(category.file_name())
    }

    /// Informational event in the category's color.
    pub fn info(&self, category: LogCategory, message: &str) {
        self.emit(category, Level::Info, Colors::colorize(category.color(), message));
    }

    /// Completion event (green).
    pub fn completed(&self, category: LogCategory, message: &str) {
        self.emit(category, Level::Info, Colors::colorize(Colors::COMPLETED, message));
    }

    pub fn warn(&self, category: LogCategory, message: &str) {
        self.emit(category, Level::Warn, Colors::colorize(Colors::SEARCH, message));
    }

    /// Failure event (red).
    pub fn error(&self, category: LogCategory, message: &str) {
        self.emit(category, Level::Error, Colors::colorize(Colors::FAILURE, message));
    }

    fn emit(&self, category: LogCategory, level: Level, colored: String) {
        log::log!(level, "{}", colored);
        let line = format!("[{}] {}", timestamp_now(), strip_ansi(&colored));
        if let Err(e) = self.append(category, &line) {
            log::warn!(
                "could not write {}: {}",
                self.path_for(category).display(),
                e
            );
        }
    }

    fn append(&self, category: LogCategory, line: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(category))?;
        writeln!(file, "{line}")
    }
}
