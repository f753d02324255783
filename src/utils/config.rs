//! Application configuration constants.
//! Defaults, retry tuning and file names in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                settings_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Settings file looked up in the working directory (e.g. `.termsift.toml`).
    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    /// Results database used when none is given on the command line.
    pub fn default_db_filename(&self) -> &'static str {
        "results-db.sqlite"
    }

    /// Directory (relative to the working directory) holding the category log files.
    pub fn default_log_dir(&self) -> &'static str {
        "logs"
    }
}

// ---- Extraction service ----

/// Apache Tika server defaults.
pub struct TikaDefaults;

impl TikaDefaults {
    /// Endpoint used when neither settings, environment nor CLI provide one.
    pub const ENDPOINT: &'static str = "http://localhost:9998";
    /// Environment variable (also read from `.env`) overriding the endpoint.
    pub const ENDPOINT_ENV: &'static str = "TIKA_SERVER_ENDPOINT";
    /// Per-file extraction timeout in seconds. Large documents need the headroom.
    pub const TIMEOUT_SECS: u64 = 120;
    /// Recursive-metadata endpoint returning text and metadata in one response.
    pub const RMETA_TEXT_PATH: &'static str = "/rmeta/text";
    /// Metadata key holding the extracted text in an rmeta response.
    pub const CONTENT_KEY: &'static str = "X-TIKA:content";
    /// Metadata key holding the detected media type.
    pub const CONTENT_TYPE_KEY: &'static str = "Content-Type";
}

/// Content type recorded when the extractor reports none (or only unprintable text).
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";

// ---- Retry ----

/// Retry budget and randomized exponential backoff bounds.
pub struct RetryConsts;

impl RetryConsts {
    /// Total attempts, including the first one.
    pub const MAX_ATTEMPTS: u32 = 3;
    /// Lower bound of the randomized wait between attempts.
    pub const MIN_BACKOFF: Duration = Duration::from_secs(1);
    /// Upper bound (cap) of the randomized wait between attempts.
    pub const MAX_BACKOFF: Duration = Duration::from_secs(10);
}

// ---- Persistence ----

/// Separator between distinct matched terms in the `matched_terms` column.
pub const MATCHED_TERMS_SEPARATOR: &str = ", ";

/// Timestamp layout for records and log lines (local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
