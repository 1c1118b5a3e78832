//! Headless workspace session core.

pub mod autosave;
pub mod buffer;
pub mod engine;
pub mod error;
pub mod language;
pub mod pane;
pub mod search;
pub mod services;
pub mod workspace;

pub use autosave::AutosaveScheduler;
pub use buffer::{Acquire, Buffer, BufferEvent, BufferId, BufferListener, BufferStore, DocPath};
pub use engine::{EngineGate, EngineState};
pub use error::{Result, WorkspaceError};
pub use language::LanguageId;
pub use pane::{Pane, PaneId, Panes, Tab, TabId};
pub use search::{SearchSession, SearchUpdate};
pub use workspace::{SaveAllReport, Workspace, WorkspaceConfig, WorkspaceServices};

#[cfg(test)]
#[path = "../../tests/unit/support.rs"]
pub(crate) mod test_support;
