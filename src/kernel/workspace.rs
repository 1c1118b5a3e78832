//! Workspace session core.
//!
//! `Workspace` is the single owner of the buffer store, both panes, the
//! engine gate, the autosave table and the search session. It runs on one
//! cooperative loop: every mutating operation takes `&mut self`, and the
//! only suspension points are engine activation, file I/O, discard prompts
//! and search.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::autosave::AutosaveScheduler;
use super::buffer::{Acquire, Buffer, BufferListener, BufferStore, DocPath};
use super::engine::{EngineGate, EngineState};
use super::error::{Result, WorkspaceError};
use super::language::LanguageId;
use super::pane::{Pane, PaneId, Panes, Tab, TabId};
use super::search::{SearchSession, SearchUpdate};
use super::services::ports::{
    AutosaveMode, AutosaveSettings, DiscardPrompt, DocumentHandle, EditorEngine, FileError,
    FileProvider, SearchRequest, SearchResult, SearchSettings, Settings, WorkspaceObserver,
};

/// External collaborators the workspace is wired to.
#[derive(Clone)]
pub struct WorkspaceServices {
    pub engine: Arc<dyn EditorEngine>,
    pub files: Arc<dyn FileProvider>,
    pub prompt: Arc<dyn DiscardPrompt>,
    pub runtime: tokio::runtime::Handle,
}

/// The part of `Settings` the session core acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkspaceConfig {
    pub autosave: AutosaveSettings,
    pub search: SearchSettings,
}

impl From<&Settings> for WorkspaceConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            autosave: settings.autosave,
            search: settings.search,
        }
    }
}

#[derive(Debug, Default)]
pub struct SaveAllReport {
    pub saved: Vec<DocPath>,
    pub failed: Vec<(DocPath, WorkspaceError)>,
}

impl SaveAllReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Workspace {
    buffers: BufferStore,
    panes: Panes,
    engine: Arc<EngineGate>,
    autosave: AutosaveScheduler,
    files: Arc<dyn FileProvider>,
    prompt: Arc<dyn DiscardPrompt>,
    runtime: tokio::runtime::Handle,
    observers: Vec<Arc<dyn WorkspaceObserver>>,
    documents: FxHashMap<DocPath, DocumentHandle>,
    next_untitled: u64,
    search: SearchSession,
    config: WorkspaceConfig,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("buffers", &self.buffers)
            .field("panes", &self.panes)
            .field("engine", &self.engine)
            .field("documents", &self.documents.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Workspace {
    pub fn new(services: WorkspaceServices, settings: &Settings) -> Self {
        let config = WorkspaceConfig::from(settings);
        Self {
            buffers: BufferStore::new(),
            panes: Panes::new(),
            engine: Arc::new(EngineGate::new(services.engine)),
            autosave: AutosaveScheduler::new(config.autosave, services.runtime.clone()),
            search: SearchSession::new(services.runtime.clone(), services.files.clone()),
            files: services.files,
            prompt: services.prompt,
            runtime: services.runtime,
            observers: Vec::new(),
            documents: FxHashMap::default(),
            next_untitled: 0,
            config,
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn WorkspaceObserver>) {
        self.observers.push(observer);
    }

    pub fn subscribe_buffers(&mut self, listener: BufferListener) {
        self.buffers.subscribe(listener);
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }

    pub fn buffer(&self, path: &DocPath) -> Option<&Buffer> {
        self.buffers.get(path)
    }

    pub fn panes(&self) -> &Panes {
        &self.panes
    }

    pub fn pane(&self, pane: PaneId) -> &Pane {
        self.panes.pane(pane)
    }

    pub fn tab(&self, pane: PaneId, path: &DocPath) -> Option<&Tab> {
        self.panes.pane(pane).tab(path)
    }

    pub fn active_pane(&self) -> PaneId {
        self.panes.active()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.panes.pane(self.panes.active()).active_tab()
    }

    pub fn engine(&self) -> &Arc<EngineGate> {
        &self.engine
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn document(&self, path: &DocPath) -> Option<DocumentHandle> {
        self.documents.get(path).copied()
    }

    pub fn autosave(&self) -> &AutosaveScheduler {
        &self.autosave
    }

    pub fn search_session(&self) -> &SearchSession {
        &self.search
    }

    pub fn config(&self) -> WorkspaceConfig {
        self.config
    }

    // ---------------------------------------------------------------------
    // Opening
    // ---------------------------------------------------------------------

    /// Opens a file from disk in `pane`, or focuses its tab if already there.
    ///
    /// The file is only read when no buffer exists for it yet; an open buffer
    /// is shared as-is so in-progress edits are never clobbered.
    pub async fn open_file(&mut self, pane: PaneId, path: impl AsRef<Path>) -> Result<TabId> {
        let path = path.as_ref();
        let doc = DocPath::file(path);
        validate(&doc)?;
        self.ensure_engine().await?;

        let content = if self.buffers.contains(&doc) {
            None
        } else {
            Some(self.read(path).await?)
        };
        self.open_ready(pane, doc, content).await
    }

    /// Opens `doc` in `pane`. Supplying `content` merges it into the shared
    /// buffer and marks every tab for the path clean.
    pub async fn open(
        &mut self,
        pane: PaneId,
        doc: DocPath,
        content: Option<String>,
    ) -> Result<TabId> {
        validate(&doc)?;
        self.ensure_engine().await?;
        self.open_ready(pane, doc, content).await
    }

    /// Creates an empty `Untitled-<n>` document. Names are never reused.
    pub async fn create_untitled(&mut self, pane: PaneId) -> Result<DocPath> {
        self.ensure_engine().await?;
        let doc = loop {
            self.next_untitled = self.next_untitled.saturating_add(1);
            let doc = DocPath::Untitled(format!("Untitled-{}", self.next_untitled));
            // `open` accepts caller-chosen untitled names; skip any already taken.
            if !self.buffers.contains(&doc) && !self.panes.is_open(&doc) {
                break doc;
            }
        };
        self.open_ready(pane, doc.clone(), Some(String::new()))
            .await?;
        Ok(doc)
    }

    /// Opens the file of a search hit.
    pub async fn open_search_result(
        &mut self,
        pane: PaneId,
        result: &SearchResult,
    ) -> Result<TabId> {
        self.open_file(pane, &result.path).await
    }

    async fn open_ready(
        &mut self,
        pane: PaneId,
        doc: DocPath,
        content: Option<String>,
    ) -> Result<TabId> {
        if let Some(index) = self.panes.pane(pane).position(&doc) {
            if let Some(content) = content.as_deref() {
                self.merge(&doc, content);
            }
            let id = self.panes.pane(pane).tabs()[index].id;
            self.switch_tab(pane, index).await;
            return Ok(id);
        }

        let created = !self.buffers.contains(&doc);
        let (_, acquire) = self.buffers.get_or_create(&doc, content.as_deref());
        if created {
            if let Err(e) = self.create_document(&doc) {
                self.buffers.release(&doc);
                return Err(e);
            }
        } else if content.is_some() {
            self.after_merge(&doc, acquire);
        }

        let left = self.left_path(pane);
        let id = self.panes.alloc_tab_id();
        self.panes.pane_mut(pane).push(Tab::new(id, doc.clone()));
        self.buffers.attach(&doc);
        if self.panes.is_dirty(&doc) {
            self.set_tab_dirty(pane, &doc, true);
        }
        tracing::debug!(pane = ?pane, path = %doc, tab = id.raw(), "tab opened");
        self.notify(|o| o.notify_tabs_changed(pane));

        if let Some(left) = left {
            self.autosave_left(Some(&left)).await;
        }
        Ok(id)
    }

    fn create_document(&mut self, doc: &DocPath) -> Result<()> {
        let Some(buffer) = self.buffers.get(doc) else {
            return Err(WorkspaceError::UnknownBuffer(doc.clone()));
        };
        let engine = self.engine.engine();
        let handle = engine.create_document(doc, &buffer.text(), buffer.language())?;
        if let Err(e) = engine.bind_document(handle) {
            engine.dispose_document(handle);
            tracing::error!(path = %doc, error = %e, "engine document bind failed");
            return Err(e.into());
        }
        self.documents.insert(doc.clone(), handle);
        Ok(())
    }

    fn merge(&mut self, doc: &DocPath, content: &str) {
        let (_, acquire) = self.buffers.get_or_create(doc, Some(content));
        self.after_merge(doc, acquire);
    }

    /// A merged buffer matches what the caller just read, so nothing is unsaved.
    fn after_merge(&mut self, doc: &DocPath, acquire: Acquire) {
        if acquire == Acquire::Reloaded {
            self.autosave.cancel(doc);
        }
        self.mark_dirty(doc, false);
    }

    // ---------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------

    /// Applies new content from the editing engine. Returns whether it changed.
    pub fn update_content(&mut self, path: &DocPath, content: &str) -> Result<bool> {
        let changed = self
            .buffers
            .write(path, content)
            .ok_or_else(|| WorkspaceError::UnknownBuffer(path.clone()))?;
        if changed {
            self.mark_dirty(path, true);
            self.autosave.on_content_changed(path);
        }
        Ok(changed)
    }

    pub fn set_dirty(&mut self, pane: PaneId, path: &DocPath, dirty: bool) -> Result<bool> {
        let changed = self
            .panes
            .pane_mut(pane)
            .set_dirty(path, dirty)
            .ok_or_else(|| unknown_tab(pane, path))?;
        if changed {
            self.notify(|o| o.notify_dirty_changed(pane, path, dirty));
        }
        Ok(changed)
    }

    pub fn set_language(&mut self, path: &DocPath, language: LanguageId) -> Result<bool> {
        if !self.buffers.contains(path) {
            return Err(WorkspaceError::UnknownBuffer(path.clone()));
        }
        Ok(self.buffers.set_language(path, language))
    }

    fn mark_dirty(&mut self, path: &DocPath, dirty: bool) {
        for pane in PaneId::ALL {
            self.set_tab_dirty(pane, path, dirty);
        }
    }

    fn set_tab_dirty(&mut self, pane: PaneId, path: &DocPath, dirty: bool) {
        if self.panes.pane_mut(pane).set_dirty(path, dirty) == Some(true) {
            self.notify(|o| o.notify_dirty_changed(pane, path, dirty));
        }
    }

    // ---------------------------------------------------------------------
    // Focus and navigation
    // ---------------------------------------------------------------------

    pub async fn activate(&mut self, pane: PaneId, path: &DocPath) -> Result<()> {
        let index = self
            .panes
            .pane(pane)
            .position(path)
            .ok_or_else(|| unknown_tab(pane, path))?;
        self.switch_tab(pane, index).await;
        Ok(())
    }

    pub async fn next_tab(&mut self, pane: PaneId) -> bool {
        self.cycle_tab(pane, true).await
    }

    pub async fn prev_tab(&mut self, pane: PaneId) -> bool {
        self.cycle_tab(pane, false).await
    }

    async fn cycle_tab(&mut self, pane: PaneId, forward: bool) -> bool {
        let left = self.left_path(pane);
        if !self.panes.pane_mut(pane).cycle(forward) {
            return false;
        }
        self.notify(|o| o.notify_tabs_changed(pane));
        self.autosave_left(left.as_ref()).await;
        true
    }

    async fn switch_tab(&mut self, pane: PaneId, index: usize) {
        let left = self.left_path(pane);
        if !self.panes.pane_mut(pane).set_active(index) {
            return;
        }
        self.notify(|o| o.notify_tabs_changed(pane));
        self.autosave_left(left.as_ref()).await;
    }

    /// Moves focus to `pane`. Leaving a pane counts as leaving its active tab.
    pub async fn focus_pane(&mut self, pane: PaneId) -> bool {
        let left = self.left_path(pane.other());
        if !self.panes.set_active(pane) {
            return false;
        }
        tracing::debug!(pane = ?pane, "active pane changed");
        self.notify(|o| o.notify_active_pane_changed(pane));
        self.autosave_left(left.as_ref()).await;
        true
    }

    /// The window lost focus.
    pub async fn focus_lost(&mut self) {
        let active = self.left_path(self.panes.active());
        if let Some(target) = self.autosave.on_focus_lost(active.as_ref()) {
            self.save_if_dirty(&target).await;
        }
    }

    /// Moves the tab for `path` from one pane to the other, keeping its buffer.
    pub fn move_tab(&mut self, from: PaneId, path: &DocPath, to: PaneId) -> Result<TabId> {
        if from == to {
            return self
                .tab(from, path)
                .map(|tab| tab.id)
                .ok_or_else(|| unknown_tab(from, path));
        }
        let index = self
            .panes
            .pane(from)
            .position(path)
            .ok_or_else(|| unknown_tab(from, path))?;
        let Some(tab) = self.panes.pane_mut(from).remove(index) else {
            return Err(unknown_tab(from, path));
        };

        let id = match self.panes.pane(to).position(path) {
            Some(existing) => {
                // The target already shows this buffer; the moved tab merges into it.
                self.buffers.detach(path);
                self.panes.pane_mut(to).set_active(existing);
                if tab.dirty {
                    self.set_tab_dirty(to, path, true);
                }
                self.panes.pane(to).tabs()[existing].id
            }
            None => {
                let id = tab.id;
                self.panes.pane_mut(to).push(tab);
                id
            }
        };
        tracing::debug!(from = ?from, to = ?to, path = %path, "tab moved");
        self.notify(|o| o.notify_tabs_changed(from));
        self.notify(|o| o.notify_tabs_changed(to));
        Ok(id)
    }

    fn left_path(&self, pane: PaneId) -> Option<DocPath> {
        self.panes
            .pane(pane)
            .active_tab()
            .map(|tab| tab.path.clone())
    }

    async fn autosave_left(&mut self, left: Option<&DocPath>) {
        if let Some(target) = self.autosave.on_tab_activated(left) {
            self.save_if_dirty(&target).await;
        }
    }

    // ---------------------------------------------------------------------
    // Closing
    // ---------------------------------------------------------------------

    /// Closes the tab for `path` in `pane`, asking first if it has unsaved
    /// changes. Returns `true` when the buffer was released as well.
    pub async fn close(&mut self, pane: PaneId, path: &DocPath) -> Result<bool> {
        let tab = self
            .tab(pane, path)
            .cloned()
            .ok_or_else(|| unknown_tab(pane, path))?;
        if tab.dirty && !self.prompt.confirm_discard(&tab.title).await {
            tracing::debug!(pane = ?pane, path = %path, "close declined");
            return Err(WorkspaceError::CloseCancelled(tab.title));
        }

        let Some(index) = self.panes.pane(pane).position(path) else {
            return Err(unknown_tab(pane, path));
        };
        self.panes.pane_mut(pane).remove(index);
        self.notify(|o| o.notify_tabs_changed(pane));

        let released = match self.buffers.detach(path) {
            Some(0) => self.release(path),
            _ => false,
        };
        tracing::debug!(pane = ?pane, path = %path, released, "tab closed");
        Ok(released)
    }

    fn release(&mut self, path: &DocPath) -> bool {
        if !self.buffers.release(path) {
            return false;
        }
        self.autosave.cancel(path);
        if let Some(handle) = self.documents.remove(path) {
            self.engine.engine().dispose_document(handle);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    pub async fn save(&mut self, pane: PaneId, path: &DocPath) -> Result<()> {
        if !self.pane(pane).contains(path) {
            return Err(unknown_tab(pane, path));
        }
        self.save_path(path).await
    }

    /// Writes `path`'s buffer to `new_path` and re-keys the buffer and every
    /// tab showing it. Untitled documents become file-backed.
    pub async fn save_as(
        &mut self,
        pane: PaneId,
        path: &DocPath,
        new_path: impl AsRef<Path>,
    ) -> Result<DocPath> {
        let target = DocPath::file(new_path.as_ref());
        validate(&target)?;
        if !self.pane(pane).contains(path) {
            return Err(unknown_tab(pane, path));
        }
        if &target == path {
            self.save_path(path).await?;
            return Ok(target);
        }
        if self.buffers.contains(&target) {
            return Err(WorkspaceError::InvalidPath(format!(
                "{} is already open",
                target
            )));
        }

        let content = self
            .buffers
            .get(path)
            .map(Buffer::text)
            .ok_or_else(|| WorkspaceError::UnknownBuffer(path.clone()))?;
        if let Err(e) = self.write(new_path.as_ref(), content).await {
            self.report_save_failure(&target, &e);
            return Err(e);
        }

        self.buffers.rekey(path, &target);
        self.panes.retitle(path, &target);
        if let Some(handle) = self.documents.remove(path) {
            self.documents.insert(target.clone(), handle);
        }
        self.autosave.cancel(path);
        for pane in PaneId::ALL {
            if self.panes.pane(pane).contains(&target) {
                self.notify(|o| o.notify_tabs_changed(pane));
            }
        }
        self.mark_dirty(&target, false);
        tracing::info!(from = %path, to = %target, "saved as");
        Ok(target)
    }

    /// Saves every dirty file-backed buffer. Failures do not stop the rest.
    pub async fn save_all(&mut self) -> SaveAllReport {
        let mut dirty: Vec<DocPath> = self
            .buffers
            .paths()
            .filter(|path| !path.is_untitled() && self.panes.is_dirty(path))
            .cloned()
            .collect();
        dirty.sort();

        let mut report = SaveAllReport::default();
        for path in dirty {
            match self.save_path(&path).await {
                Ok(()) => report.saved.push(path),
                Err(e) => report.failed.push((path, e)),
            }
        }
        report
    }

    /// Re-reads a file that changed on disk and merges it into its buffer.
    pub async fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let doc = DocPath::file(path);
        if !self.buffers.contains(&doc) {
            return Err(WorkspaceError::UnknownBuffer(doc));
        }
        let content = self.read(path).await?;
        self.merge(&doc, &content);
        tracing::debug!(path = %doc, "reloaded from disk");
        Ok(())
    }

    async fn save_if_dirty(&mut self, path: &DocPath) {
        if !self.panes.is_dirty(path) {
            return;
        }
        if let Err(e) = self.save_path(path).await {
            tracing::warn!(path = %path, error = %e, "autosave failed");
        }
    }

    async fn save_path(&mut self, path: &DocPath) -> Result<()> {
        let Some(file) = path.as_file().map(Path::to_path_buf) else {
            return Err(WorkspaceError::UntitledNeedsPath(path.title()));
        };
        let content = self
            .buffers
            .get(path)
            .map(Buffer::text)
            .ok_or_else(|| WorkspaceError::UnknownBuffer(path.clone()))?;

        if let Err(e) = self.write(&file, content).await {
            self.report_save_failure(path, &e);
            return Err(e);
        }
        self.autosave.cancel(path);
        self.mark_dirty(path, false);
        tracing::debug!(path = %path, "saved");
        Ok(())
    }

    fn report_save_failure(&self, path: &DocPath, error: &WorkspaceError) {
        let message = error.to_string();
        tracing::error!(path = %path, error = %message, "save failed");
        self.notify(|o| o.notify_save_failed(path, &message));
    }

    async fn read(&self, path: &Path) -> Result<String> {
        let files = Arc::clone(&self.files);
        let path = path.to_path_buf();
        let content = self
            .runtime
            .spawn_blocking(move || files.read_file(&path))
            .await
            .map_err(join_error)??;
        Ok(content)
    }

    async fn write(&self, path: &Path, content: String) -> Result<()> {
        let files = Arc::clone(&self.files);
        let path: PathBuf = path.to_path_buf();
        self.runtime
            .spawn_blocking(move || files.write_file(&path, &content))
            .await
            .map_err(join_error)??;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Autosave
    // ---------------------------------------------------------------------

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.config = WorkspaceConfig::from(settings);
        self.autosave
            .configure(self.config.autosave.mode, self.config.autosave.delay());
    }

    pub fn configure_autosave(&mut self, mode: AutosaveMode, delay: Duration) {
        self.config.autosave = AutosaveSettings {
            mode,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        };
        self.autosave.configure(mode, delay);
    }

    /// Waits for the next debounce timer and saves its path if still dirty.
    ///
    /// Returns `None` once no timer is pending.
    pub async fn next_autosave(&mut self) -> Option<Result<DocPath>> {
        loop {
            if self.autosave.pending_count() == 0 {
                return None;
            }
            let path = self.autosave.next_due().await?;
            if !self.panes.is_dirty(&path) {
                continue;
            }
            return Some(self.save_path(&path).await.map(|()| path));
        }
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// A request for `query` under `root` with the configured defaults.
    pub fn search_request(&self, root: impl Into<PathBuf>, query: impl Into<String>) -> SearchRequest {
        SearchRequest::new(root, query)
            .case_sensitive(self.config.search.case_sensitive)
            .max_results(self.config.search.max_results)
    }

    /// Starts a workspace search, superseding any search in flight.
    pub fn search(&mut self, request: SearchRequest) -> Result<u64> {
        Ok(self.search.start(request)?)
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Waits for the next update of the live search and forwards it to observers.
    pub async fn next_search_update(&mut self) -> Option<SearchUpdate> {
        let update = self.search.next_update().await?;
        match &update {
            SearchUpdate::Progress { search_id, results } => {
                self.notify(|o| o.notify_search_progress(*search_id, results));
            }
            SearchUpdate::Finished(summary) => {
                self.notify(|o| o.notify_search_finished(summary));
            }
            SearchUpdate::Failed { search_id, message } => {
                tracing::warn!(search_id, error = %message, "workspace search failed");
            }
            SearchUpdate::Cancelled { .. } => {}
        }
        Some(update)
    }

    // ---------------------------------------------------------------------
    // Engine
    // ---------------------------------------------------------------------

    async fn ensure_engine(&self) -> Result<()> {
        if self.engine.ensure_ready().await {
            return Ok(());
        }
        let message = match self.engine.take_failure() {
            Some(message) => {
                self.notify(|o| o.notify_engine_failed(&message));
                message
            }
            None => match self.engine.state() {
                EngineState::Failed(message) => message,
                _ => "engine is not ready".to_string(),
            },
        };
        Err(WorkspaceError::EngineUnavailable(message))
    }

    fn notify(&self, f: impl Fn(&dyn WorkspaceObserver)) {
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }
}

fn validate(doc: &DocPath) -> Result<()> {
    match doc {
        DocPath::File(path) if !path.is_absolute() => Err(WorkspaceError::InvalidPath(format!(
            "{} is not absolute",
            path.display()
        ))),
        DocPath::Untitled(name) if name.trim().is_empty() => Err(WorkspaceError::InvalidPath(
            "untitled document needs a name".to_string(),
        )),
        _ => Ok(()),
    }
}

fn unknown_tab(pane: PaneId, path: &DocPath) -> WorkspaceError {
    WorkspaceError::UnknownTab {
        pane,
        path: path.clone(),
    }
}

fn join_error(e: tokio::task::JoinError) -> WorkspaceError {
    WorkspaceError::File(FileError::Io(std::io::Error::other(e.to_string())))
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/workspace.rs"]
mod tests;
