use super::buffer::DocPath;
use super::pane::PaneId;
use super::services::adapters::settings::SettingsError;
use super::services::ports::{EngineError, FileError, SearchError};

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("editor engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("{0} has never been saved; a target path is required")]
    UntitledNeedsPath(String),
    #[error("no tab for {path} in the {pane:?} pane")]
    UnknownTab { pane: PaneId, path: DocPath },
    #[error("no open buffer for {0}")]
    UnknownBuffer(DocPath),
    #[error("close of {0} was cancelled")]
    CloseCancelled(String),
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
