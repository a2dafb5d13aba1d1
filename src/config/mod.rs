use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::core::time::{Clock, SystemClock};
use crate::errors::LedgerError;
use crate::ledger::history::DEFAULT_HISTORY_DEPTH;
use crate::utils::paths::{app_data_dir, config_backup_dir_in, config_file_in, ensure_dir};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";

/// Weeks of daily spending shown by the heatmap.
pub const DEFAULT_HEATMAP_WEEKS: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Undo snapshots kept per session.
    pub history_depth: usize,
    pub heatmap_weeks: u32,
    /// Where ledger documents live; the app data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "id-ID".into(),
            currency: "IDR".into(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            heatmap_weeks: DEFAULT_HEATMAP_WEEKS,
            storage_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.history_depth == 0 {
            return Err(LedgerError::InvalidInput(
                "history_depth must be at least 1".into(),
            ));
        }
        if self.heatmap_weeks == 0 {
            return Err(LedgerError::InvalidInput(
                "heatmap_weeks must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        let backups_dir = config_backup_dir_in(&base);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: config_file_in(&base),
            backups_dir,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Reads the config file; a missing file gives the defaults.
    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: Config = serde_json::from_str(&data)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    /// Writes a timestamped copy of `config` and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, LedgerError> {
        ensure_dir(&self.backups_dir)?;
        let timestamp = self.clock.now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let name = match sanitize_note(note) {
            Some(label) => format!("config_{label}_{timestamp}.{BACKUP_EXTENSION}"),
            None => format!("config_{timestamp}.{BACKUP_EXTENSION}"),
        };
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, LedgerError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(LedgerError::Storage(format!(
                "configuration backup `{backup_name}` not found"
            )));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Backup names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, LedgerError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| parse_timestamp(b).cmp(&parse_timestamp(a)));
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// The last two `_` segments of a backup name hold its date and time.
fn parse_timestamp(name: &str) -> Option<NaiveDateTime> {
    let trimmed = name.strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let mut segments = trimmed.rsplit('_');
    let time_part = segments.next()?;
    let date_part = segments.next()?;
    NaiveDateTime::parse_from_str(&format!("{date_part}{time_part}"), "%Y%m%d%H%M%S").ok()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn manager() -> (ConfigManager, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("manager");
        (manager, temp)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let (manager, _guard) = manager();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_depth, 50);
        assert_eq!(config.currency, "IDR");
    }

    #[test]
    fn save_then_load() {
        let (manager, _guard) = manager();
        let config = Config {
            heatmap_weeks: 8,
            storage_dir: Some(PathBuf::from("/data/cashflow")),
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let (manager, _guard) = manager();
        fs::write(manager.path(), r#"{"history_depth": 10}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.history_depth, 10);
        assert_eq!(config.locale, "id-ID");
    }

    #[test]
    fn zero_depth_is_rejected() {
        let (manager, _guard) = manager();
        let config = Config {
            history_depth: 0,
            ..Config::default()
        };
        assert!(matches!(manager.save(&config), Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn backups_list_and_restore() {
        let (manager, _guard) = manager();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
        let manager = manager.with_clock(clock);
        let config = Config {
            locale: "en-US".into(),
            ..Config::default()
        };
        let name = manager.backup(&config, Some("Before Trip!")).unwrap();
        assert_eq!(name, "config_before-trip_20260312_120000.json");
        assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);
        assert_eq!(manager.restore(&name).unwrap(), config);
        assert!(manager.restore("config_missing.json").is_err());
    }
}
