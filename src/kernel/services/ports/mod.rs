//! Service ports: traits + data contracts.

pub mod engine;
pub mod file;
pub mod observer;
pub mod prompt;
pub mod runtime;
pub mod search;
pub mod settings;

pub use engine::{DocumentHandle, EditorEngine, EngineError};
pub use file::{FileError, FileProvider, Result as FileResult};
pub use observer::WorkspaceObserver;
pub use prompt::{DiscardPrompt, FixedAnswer};
pub use runtime::BoxFuture;
pub use search::{
    MatchSpan, SearchError, SearchMessage, SearchOptions, SearchRequest, SearchResult,
    SearchSummary, DEFAULT_MAX_RESULTS,
};
pub use settings::{
    AutosaveMode, AutosaveSettings, CommandHistory, CommandUsage, EditorSettings, SearchSettings,
    Settings,
};
