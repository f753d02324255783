pub mod config;
pub mod endpoint;
pub mod logger;
pub mod run_log;
pub mod settings_toml;

pub use config::*;
pub use endpoint::tika_endpoint_from_env;
pub use logger::{Colors, setup_logging};
pub use run_log::{LogCategory, RunLog, strip_ansi, timestamp_now};
pub use settings_toml::{SettingsToml, apply_file_to_opts, load_settings_toml};
