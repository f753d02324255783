use clap::Parser;
use std::path::PathBuf;

use crate::RetryScope;

/// Search documents recursively for whole-word terms and record matches in SQLite.
#[derive(Clone, Parser)]
#[command(name = "termsift")]
#[command(about = "Search for terms in files recursively and save matches in a SQLite database.")]
pub struct Cli {
    /// File with one search term per line.
    #[arg(value_name = "FIELDS_FILE")]
    pub fields_file: PathBuf,

    /// Directory to search recursively.
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// SQLite database file for the results. Default: results-db.sqlite.
    #[arg(value_name = "DATABASE")]
    pub database: Option<PathBuf>,

    /// Tika server URL. Default: $TIKA_SERVER_ENDPOINT or http://localhost:9998.
    #[arg(long, value_name = "URL")]
    pub tika_url: Option<String>,

    /// Extraction timeout per file, in seconds.
    #[arg(long, short = 't', value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// What is retried when an unexpected failure escapes: the whole run or a single file.
    #[arg(long, value_enum)]
    pub retry_scope: Option<RetryScope>,

    /// Attempts (including the first) before an unexpected failure is final.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Directory for the category log files. Default: ./logs.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Settings file. Default: .termsift.toml in the working directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links into directories.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Strict mode: an unreadable directory fails the run attempt instead of being skipped.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
