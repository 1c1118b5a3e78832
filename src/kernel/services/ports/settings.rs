use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::search::DEFAULT_MAX_RESULTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutosaveMode {
    Off,
    #[default]
    AfterDelay,
    OnFocusChange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub autosave: AutosaveSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_font_family() -> String {
    "monospace".to_string()
}

fn default_font_size() -> f32 {
    14.0
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            theme: default_theme(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveSettings {
    #[serde(default)]
    pub mode: AutosaveMode,
    #[serde(default = "default_autosave_delay_ms")]
    pub delay_ms: u64,
}

fn default_autosave_delay_ms() -> u64 {
    1000
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            mode: AutosaveMode::default(),
            delay_ms: default_autosave_delay_ms(),
        }
    }
}

impl AutosaveSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandUsage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub last_used: u64,
}

/// How often and how recently each command was run, keyed by command id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandHistory {
    pub entries: BTreeMap<String, CommandUsage>,
}

impl CommandHistory {
    pub fn record(&mut self, command: &str, now_secs: u64) {
        let usage = self.entries.entry(command.to_string()).or_default();
        usage.count = usage.count.saturating_add(1);
        usage.last_used = now_secs;
    }

    pub fn usage(&self, command: &str) -> Option<CommandUsage> {
        self.entries.get(command).copied()
    }

    /// Most recently used first; ties broken by use count, then id.
    pub fn recent(&self, limit: usize) -> Vec<&str> {
        let mut entries: Vec<(&String, &CommandUsage)> = self.entries.iter().collect();
        entries.sort_by(|(a_id, a), (b_id, b)| {
            b.last_used
                .cmp(&a.last_used)
                .then(b.count.cmp(&a.count))
                .then(a_id.cmp(b_id))
        });
        entries
            .into_iter()
            .take(limit)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
