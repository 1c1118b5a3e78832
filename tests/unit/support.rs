//! In-memory stand-ins for the workspace ports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::Semaphore;

use crate::kernel::services::ports::search::{SearchResult, SearchSummary};
use crate::kernel::services::ports::{
    BoxFuture, DiscardPrompt, DocumentHandle, EditorEngine, EngineError, FileError, FileProvider,
    FileResult, WorkspaceObserver,
};
use crate::kernel::{DocPath, LanguageId, PaneId};

pub struct FakeEngine {
    gate: Option<Semaphore>,
    fail_load: AtomicBool,
    fail_documents: AtomicBool,
    loads: AtomicUsize,
    binds: AtomicUsize,
    next_handle: AtomicU64,
    pub documents: Mutex<Vec<(DocPath, String, LanguageId)>>,
    pub bound: Mutex<Vec<DocumentHandle>>,
    pub disposed: Mutex<Vec<DocumentHandle>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            gate: None,
            fail_load: AtomicBool::new(false),
            fail_documents: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
            binds: AtomicUsize::new(0),
            next_handle: AtomicU64::new(1),
            documents: Mutex::new(Vec::new()),
            bound: Mutex::new(Vec::new()),
            disposed: Mutex::new(Vec::new()),
        }
    }

    /// Loads block until `release` is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_documents(&self, fail: bool) {
        self.fail_documents.store(fail, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }
}

impl EditorEngine for FakeEngine {
    fn load(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|e| EngineError::Load(e.to_string()))?;
                permit.forget();
            }
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(EngineError::Load("bundle missing".to_string()));
            }
            Ok(())
        })
    }

    fn bind_container(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            self.binds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn create_document(
        &self,
        path: &DocPath,
        content: &str,
        language: LanguageId,
    ) -> Result<DocumentHandle, EngineError> {
        if self.fail_documents.load(Ordering::SeqCst) {
            return Err(EngineError::Document {
                path: path.to_string(),
                message: "model limit reached".to_string(),
            });
        }
        self.documents
            .lock()
            .unwrap()
            .push((path.clone(), content.to_string(), language));
        Ok(DocumentHandle::new(
            self.next_handle.fetch_add(1, Ordering::SeqCst),
        ))
    }

    fn bind_document(&self, handle: DocumentHandle) -> Result<(), EngineError> {
        self.bound.lock().unwrap().push(handle);
        Ok(())
    }

    fn dispose_document(&self, handle: DocumentHandle) {
        self.disposed.lock().unwrap().push(handle);
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    pub files: Mutex<BTreeMap<PathBuf, String>>,
    pub writes: Mutex<Vec<(PathBuf, String)>>,
    fail_writes: AtomicBool,
}

impl MemoryFiles {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let store = Self::default();
        {
            let mut map = store.files.lock().unwrap();
            for (path, content) in files {
                map.insert(PathBuf::from(path), content.to_string());
            }
        }
        store
    }

    pub fn set(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().unwrap().clone()
    }
}

impl FileProvider for MemoryFiles {
    fn read_file(&self, path: &Path) -> FileResult<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    fn read_file_bytes(&self, path: &Path) -> FileResult<Vec<u8>> {
        self.read_file(path).map(String::into_bytes)
    }

    fn write_file(&self, path: &Path, content: &str) -> FileResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FileError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only volume",
            )));
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));
        self.set(&path.to_string_lossy(), content);
        Ok(())
    }
}

/// Answers discard prompts from a queue, `false` once it runs dry.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<Vec<bool>>,
    pub asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[bool]) -> Self {
        let mut queue = answers.to_vec();
        queue.reverse();
        Self {
            answers: Mutex::new(queue),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, answer: bool) {
        self.answers.lock().unwrap().insert(0, answer);
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl DiscardPrompt for ScriptedPrompt {
    fn confirm_discard<'a>(&'a self, tab_title: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            self.asked.lock().unwrap().push(tab_title.to_string());
            self.answers.lock().unwrap().pop().unwrap_or(false)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Dirty(PaneId, DocPath, bool),
    Tabs(PaneId),
    ActivePane(PaneId),
    SearchProgress(u64, usize),
    SearchFinished(SearchSummary),
    SaveFailed(DocPath),
    EngineFailed(String),
}

#[derive(Default)]
pub struct RecordingObserver {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingObserver {
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap())
    }

    fn push(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl WorkspaceObserver for RecordingObserver {
    fn notify_dirty_changed(&self, pane: PaneId, path: &DocPath, dirty: bool) {
        self.push(Notice::Dirty(pane, path.clone(), dirty));
    }

    fn notify_tabs_changed(&self, pane: PaneId) {
        self.push(Notice::Tabs(pane));
    }

    fn notify_active_pane_changed(&self, pane: PaneId) {
        self.push(Notice::ActivePane(pane));
    }

    fn notify_search_progress(&self, search_id: u64, partial: &[SearchResult]) {
        self.push(Notice::SearchProgress(search_id, partial.len()));
    }

    fn notify_search_finished(&self, summary: &SearchSummary) {
        self.push(Notice::SearchFinished(summary.clone()));
    }

    fn notify_save_failed(&self, path: &DocPath, _message: &str) {
        self.push(Notice::SaveFailed(path.clone()));
    }

    fn notify_engine_failed(&self, message: &str) {
        self.push(Notice::EngineFailed(message.to_string()));
    }
}
