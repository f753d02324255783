//! Load `.termsift.toml` (CLI only). Library callers build [`Opts`](crate::Opts) themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Opts, RetryScope};

#[derive(Debug, Default, Deserialize)]
pub struct SettingsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    db_path: Option<String>,
    tika_url: Option<String>,
    timeout_secs: Option<u64>,
    max_attempts: Option<u32>,
    retry_scope: Option<RetryScope>,
    log_dir: Option<String>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    strict: Option<bool>,
    verbose: Option<bool>,
}

impl SettingsToml {
    /// Verbosity from the file, needed before logging is set up.
    pub fn verbose(&self) -> Option<bool> {
        self.settings.verbose
    }
}

/// Load the settings file at `path`. `Ok(None)` if it does not exist; an error if it cannot be
/// read or parsed (callers warn and carry on with defaults).
pub fn load_settings_toml(path: &Path) -> Result<Option<SettingsToml>> {
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read settings {}", path.display()))?;
    let parsed = toml::from_str(&s).with_context(|| format!("parse settings {}", path.display()))?;
    Ok(Some(parsed))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &SettingsToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.db_path {
        opts.db_path = PathBuf::from(p);
    }
    if let Some(ref p) = s.log_dir {
        opts.log_dir = PathBuf::from(p);
    }
    if let Some(secs) = s.timeout_secs {
        opts.extract_timeout = Duration::from_secs(secs);
    }
    apply_file_opt!(s, opts, tika_url => tika_url);
    apply_file_opt!(s, opts, max_attempts => retry.max_attempts);
    apply_file_opt!(s, opts, retry_scope => retry_scope);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, follow_links => follow_links);
    apply_file_opt!(s, opts, strict => strict);
    apply_file_opt!(s, opts, verbose => verbose);
}
