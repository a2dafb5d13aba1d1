use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use dirs::home_dir;

/// Overrides the data directory when set.
pub const HOME_ENV: &str = "CASHFLOW_CORE_HOME";

const DEFAULT_DIR_NAME: &str = ".cashflow_core";
const STORE_DIR: &str = "store";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";

/// Returns the application data directory, defaulting to `~/.cashflow_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Picks `root` when given, the data directory otherwise.
pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(app_data_dir)
}

/// Directory holding one JSON document per stored collection.
pub fn store_dir_in(base: &Path) -> PathBuf {
    base.join(STORE_DIR)
}

pub fn backup_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn config_backup_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_BACKUP_DIR)
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins() {
        let root = PathBuf::from("/tmp/cashflow-explicit");
        assert_eq!(resolve_base(Some(root.clone())), root);
        assert_eq!(store_dir_in(&root), root.join("store"));
        assert_eq!(config_file_in(&root), root.join("config.json"));
    }
}
