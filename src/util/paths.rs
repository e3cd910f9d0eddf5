//! Locations of the config file and logs
//!
//! Everything lives under one data directory, `~/.menu-monitor` unless the
//! binary pins another one with `--data-dir`.

use std::path::PathBuf;
use std::sync::OnceLock;

const DATA_DIR_NAME: &str = ".menu-monitor";
const LOG_FILE_NAME: &str = "menu-monitor.log";
const CONFIG_FILE_NAME: &str = "config.toml";

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Pin the data directory for the rest of the process. The first call wins;
/// `None` pins the home default.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let requested = custom_path.unwrap_or_else(home_data_dir);
    if let Err(rejected) = DATA_DIR.set(requested) {
        tracing::debug!(
            rejected = %rejected.display(),
            current = %data_dir().display(),
            "Data directory already pinned"
        );
    }
}

/// `~/.menu-monitor`, or a relative `.menu-monitor` without a home directory
fn home_data_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(DATA_DIR_NAME)
}

pub fn data_dir() -> PathBuf {
    match DATA_DIR.get() {
        Some(dir) => dir.clone(),
        None => home_data_dir(),
    }
}

pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

pub fn log_file_path() -> PathBuf {
    logs_dir().join(LOG_FILE_NAME)
}

pub fn config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE_NAME)
}
