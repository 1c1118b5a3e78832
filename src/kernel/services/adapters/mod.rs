//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod engine;
pub mod file;
pub mod paths;
pub mod search;
pub mod settings;

pub use engine::HeadlessEngine;
pub use file::LocalFileProvider;
pub use paths::{ensure_log_dir, get_config_dir, get_data_dir, get_log_dir};
pub use search::{
    search_workspace, LineMatcher, SearchTask, WalkOutcome, WorkspaceSearchService, IGNORED_DIRS,
};
pub use settings::{SettingsError, SettingsStore};
