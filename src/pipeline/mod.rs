//! Pipeline components: directory walk and walk-error handling.

pub mod error_handler;
pub mod walk;

pub use error_handler::{WalkErrors, report_skipped_paths};
pub use walk::{WalkContext, WalkOutcome, is_regular_file, to_outcome_walkdir, walk_paths};
