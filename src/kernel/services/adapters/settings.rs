//! JSON-backed settings and command history.
//!
//! Both files live in one directory. Reads never fail the caller: a missing
//! or corrupt file yields defaults and a warning. Every mutation is written
//! back immediately.

use crate::kernel::services::ports::settings::{CommandHistory, Settings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::paths;

const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "command_history.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot determine settings directory")]
    NoConfigDir,
    #[error("settings IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct SettingsStore {
    dir: PathBuf,
    settings: Settings,
    history: CommandHistory,
}

impl SettingsStore {
    /// Opens the store rooted at `dir` and loads whatever is there.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let settings = load_or_default(&dir.join(SETTINGS_FILE));
        let history = load_or_default(&dir.join(HISTORY_FILE));
        Self {
            dir,
            settings,
            history,
        }
    }

    pub fn default_location() -> Result<Self, SettingsError> {
        let dir = paths::get_config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Re-reads both files from disk.
    pub fn reload(&mut self) {
        self.settings = load_or_default(&self.settings_path());
        self.history = load_or_default(&self.history_path());
    }

    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) -> Result<(), SettingsError> {
        f(&mut self.settings);
        write_json(&self.settings_path(), &self.settings)
    }

    pub fn record_command(&mut self, command: &str) -> Result<(), SettingsError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.record_command_at(command, now)
    }

    pub fn record_command_at(&mut self, command: &str, now_secs: u64) -> Result<(), SettingsError> {
        self.history.record(command, now_secs);
        write_json(&self.history_path(), &self.history)
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
            return T::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "settings malformed, using defaults");
            T::default()
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
