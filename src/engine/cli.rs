//! CLI run handler: defaults → settings file → environment → command line, then scan.

use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::utils::{
    PackagePaths, SettingsToml, apply_file_to_opts, load_settings_toml, setup_logging,
    tika_endpoint_from_env,
};
use crate::{Opts, scan_dir};

/// Build opts from every configuration layer. `cwd` is where `.env` is looked up.
pub fn setup_opts(cli: &Cli, cwd: &Path, settings: Option<&SettingsToml>) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = settings {
        apply_file_to_opts(file, &mut opts);
    }
    if let Some(url) = tika_endpoint_from_env(cwd) {
        opts.tika_url = url;
    }

    if let Some(ref db) = cli.database {
        opts.db_path = db.clone();
    }
    if let Some(ref url) = cli.tika_url {
        opts.tika_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        opts.extract_timeout = Duration::from_secs(secs);
    }
    if let Some(scope) = cli.retry_scope {
        opts.retry_scope = scope;
    }
    if let Some(n) = cli.max_attempts {
        opts.retry.max_attempts = n;
    }
    if let Some(ref dir) = cli.log_dir {
        opts.log_dir = dir.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if let Some(v) = cli.strict {
        opts.strict = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts
}

/// Run a scan for the parsed command line.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cwd.join(PackagePaths::get().settings_filename()));
    let settings = load_settings_toml(&settings_path);

    let file_verbose = settings
        .as_ref()
        .ok()
        .and_then(|s| s.as_ref())
        .and_then(SettingsToml::verbose);
    setup_logging(cli.verbose.or(file_verbose).unwrap_or(false));

    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            warn!("{:#}; using defaults", e);
            None
        }
    };
    let opts = setup_opts(cli, &cwd, settings.as_ref());
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    scan_dir(&cli.fields_file, &cli.directory, &opts)?;
    Ok(())
}
