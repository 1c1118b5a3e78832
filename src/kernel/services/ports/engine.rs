//! Editing engine port.
//!
//! The engine is opaque to the workspace: it is loaded once, bound to its
//! container, and then handed one document per buffer.

use super::runtime::BoxFuture;
use crate::kernel::{DocPath, LanguageId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine failed to load: {0}")]
    Load(String),
    #[error("engine failed to bind its container: {0}")]
    Bind(String),
    #[error("engine rejected document {path}: {message}")]
    Document { path: String, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub trait EditorEngine: Send + Sync {
    /// Fetches and instantiates the engine. Called at most once per activation attempt.
    fn load(&self) -> BoxFuture<'_, Result<(), EngineError>>;

    /// One-time binding of a loaded engine to its host container.
    fn bind_container(&self) -> BoxFuture<'_, Result<(), EngineError>>;

    fn create_document(
        &self,
        path: &DocPath,
        content: &str,
        language: LanguageId,
    ) -> Result<DocumentHandle, EngineError>;

    fn bind_document(&self, handle: DocumentHandle) -> Result<(), EngineError>;

    fn dispose_document(&self, _handle: DocumentHandle) {}
}
