//! Tika endpoint lookup: environment variable → `.env` in the working directory.

use log::debug;
use std::path::Path;

use crate::utils::config::TikaDefaults;

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read `TIKA_SERVER_ENDPOINT` from the environment, loading `dir/.env` first if the variable is unset.
pub fn tika_endpoint_from_env(dir: &Path) -> Option<String> {
    if let Some(s) = non_empty_var(TikaDefaults::ENDPOINT_ENV) {
        return Some(s);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        if let Err(e) = dotenvy::from_path(&env_path) {
            debug!("{}: {}", env_path.display(), e);
        }
        return non_empty_var(TikaDefaults::ENDPOINT_ENV);
    }
    None
}
