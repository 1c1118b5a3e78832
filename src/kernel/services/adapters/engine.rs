//! Engine used when no rendering host is attached.
//!
//! Loading is immediate and documents are only tracked, so the workspace's
//! activation and document lifecycle run unchanged in a terminal driver.

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::kernel::services::ports::{BoxFuture, DocumentHandle, EditorEngine, EngineError};
use crate::kernel::{DocPath, LanguageId};

#[derive(Debug, Default)]
pub struct HeadlessEngine {
    next_handle: AtomicU64,
    documents: Mutex<FxHashMap<DocumentHandle, DocPath>>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn document_path(&self, handle: DocumentHandle) -> Option<DocPath> {
        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(&handle).cloned())
    }
}

impl EditorEngine for HeadlessEngine {
    fn load(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async {
            tracing::debug!("headless engine loaded");
            Ok(())
        })
    }

    fn bind_container(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async { Ok(()) })
    }

    fn create_document(
        &self,
        path: &DocPath,
        content: &str,
        language: LanguageId,
    ) -> Result<DocumentHandle, EngineError> {
        let handle = DocumentHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let mut docs = self.documents.lock().map_err(|_| EngineError::Document {
            path: path.to_string(),
            message: "document table poisoned".to_string(),
        })?;
        docs.insert(handle, path.clone());
        tracing::trace!(
            path = %path,
            handle = handle.raw(),
            bytes = content.len(),
            language = language.language_id(),
            "headless document created"
        );
        Ok(handle)
    }

    fn bind_document(&self, handle: DocumentHandle) -> Result<(), EngineError> {
        if self.document_path(handle).is_none() {
            return Err(EngineError::Bind(format!(
                "unknown document handle {}",
                handle.raw()
            )));
        }
        Ok(())
    }

    fn dispose_document(&self, handle: DocumentHandle) {
        if let Ok(mut docs) = self.documents.lock() {
            docs.remove(&handle);
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/engine.rs"]
mod tests;
