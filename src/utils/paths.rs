use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs::home_dir;

use crate::errors::Result;

pub const HOME_ENV: &str = "NIGHTLY_CLOSE_HOME";
const DEFAULT_DIR_NAME: &str = ".nightly_close";
const DATA_DIR: &str = "data";
const LEDGER_FILE: &str = "closures.json";
const CONFIG_FILE: &str = "config.json";

/// Application directory: `$NIGHTLY_CLOSE_HOME`, else `~/.nightly_close`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn default_ledger_file_in(base: &Path) -> PathBuf {
    base.join(DATA_DIR).join(LEDGER_FILE)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}
