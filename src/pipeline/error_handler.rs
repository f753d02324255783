use anyhow::Result;
use std::path::PathBuf;

use crate::utils::{LogCategory, RunLog};

/// Walk errors seen during one attempt. In strict mode the first one fails the attempt.
#[derive(Debug, Default)]
pub struct WalkErrors {
    pub strict: bool,
    pub skipped: Vec<(PathBuf, String)>,
}

impl WalkErrors {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            skipped: Vec::new(),
        }
    }

    /// Record a walk error. Strict: return it as an unhandled failure. Otherwise log and keep going.
    pub fn handle(&mut self, msg: String, path: Option<PathBuf>, log: &RunLog) -> Result<()> {
        if self.strict {
            return Err(anyhow::anyhow!("walk error: {}", msg));
        }
        log.warn(LogCategory::General, &format!("Skipping unreadable path: {msg}"));
        let path = path.unwrap_or_else(|| PathBuf::from("<no-path>"));
        self.skipped.push((path, msg));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Summarize skipped paths after a walk; list them when verbose.
pub fn report_skipped_paths(errors: &WalkErrors, verbose: bool, log: &RunLog) {
    if errors.is_empty() {
        return;
    }
    log.warn(
        LogCategory::General,
        &format!(
            "Skipped {} paths due to permission errors or access issues",
            errors.len()
        ),
    );
    if verbose {
        for (path, msg) in &errors.skipped {
            log::debug!("  skipped: {} ({})", path.display(), msg);
        }
    }
}
