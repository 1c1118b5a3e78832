//! Per-platform application directories.
//!
//! - macOS: ~/Library/Application Support/zcode-workspace (data and config)
//! - Linux: $XDG_DATA_HOME or ~/.local/share, $XDG_CONFIG_HOME or ~/.config
//! - Windows: %APPDATA%\zcode-workspace

use std::path::PathBuf;

pub const APP_NAME: &str = "zcode-workspace";
const LOG_DIR: &str = "logs";

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn data_dir_with(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        env("HOME").map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "windows")]
    {
        env("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".local/share")))
            .map(|base| base.join(APP_NAME))
    }
}

fn config_dir_with(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        data_dir_with(env)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        env("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".config")))
            .map(|base| base.join(APP_NAME))
    }
}

pub fn get_data_dir() -> Option<PathBuf> {
    data_dir_with(env_var)
}

/// Directory holding `settings.json` and `command_history.json`.
pub fn get_config_dir() -> Option<PathBuf> {
    config_dir_with(env_var)
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_data_dir().map(|p| p.join(LOG_DIR))
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_log_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine log directory",
        )
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/paths.rs"]
mod tests;
