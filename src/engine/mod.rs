//! Engine module: matching, persistence, retry, CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod db_ops;
pub mod matcher;
pub mod retry;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use db_ops::{ResultStore, open_db, open_db_in_memory};
pub use matcher::{MatchOutcome, SearchPattern, split_lines};
pub use retry::RetryPolicy;
pub use tools::{WalkFilter, clean_string, glob_match, sanitize_content_type};
