//! Autosave scheduler.
//!
//! Keeps at most one pending timer per path. A timer is a spawned sleep that
//! posts an `AutosaveDue` notice back to the owner; rescheduling aborts the
//! previous task and bumps the path's generation, so a notice that was
//! already in flight when it got replaced is dropped on receipt.

use rustc_hash::FxHashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::buffer::DocPath;
use super::services::ports::{AutosaveMode, AutosaveSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveDue {
    pub path: DocPath,
    generation: u64,
}

#[derive(Debug)]
struct PendingSave {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct AutosaveScheduler {
    mode: AutosaveMode,
    delay: Duration,
    pending: FxHashMap<DocPath, PendingSave>,
    next_generation: u64,
    runtime: tokio::runtime::Handle,
    tx: mpsc::UnboundedSender<AutosaveDue>,
    rx: mpsc::UnboundedReceiver<AutosaveDue>,
}

impl AutosaveScheduler {
    /// Timers are spawned on `runtime`, so edits may arrive from any thread.
    pub fn new(settings: AutosaveSettings, runtime: tokio::runtime::Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            mode: settings.mode,
            delay: settings.delay(),
            pending: FxHashMap::default(),
            next_generation: 0,
            runtime,
            tx,
            rx,
        }
    }

    pub fn mode(&self) -> AutosaveMode {
        self.mode
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn configure(&mut self, mode: AutosaveMode, delay: Duration) {
        if mode != AutosaveMode::AfterDelay {
            self.cancel_all();
        }
        tracing::debug!(
            ?mode,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "autosave configured"
        );
        self.mode = mode;
        self.delay = delay;
    }

    /// (Re)starts the debounce timer for `path`. Returns `true` if a timer is now pending.
    pub fn on_content_changed(&mut self, path: &DocPath) -> bool {
        if self.mode != AutosaveMode::AfterDelay || path.is_untitled() {
            return false;
        }
        self.next_generation = self.next_generation.saturating_add(1);
        let due = AutosaveDue {
            path: path.clone(),
            generation: self.next_generation,
        };
        let tx = self.tx.clone();
        let delay = self.delay;
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(due);
        });

        let replaced = self.pending.insert(
            path.clone(),
            PendingSave {
                generation: self.next_generation,
                handle,
            },
        );
        if let Some(previous) = replaced {
            previous.handle.abort();
        }
        true
    }

    /// Path to save immediately when focus leaves the window, if the policy asks for it.
    pub fn on_focus_lost(&self, active: Option<&DocPath>) -> Option<DocPath> {
        self.focus_change_target(active)
    }

    /// Path to save immediately when switching away from a tab.
    pub fn on_tab_activated(&self, from: Option<&DocPath>) -> Option<DocPath> {
        self.focus_change_target(from)
    }

    fn focus_change_target(&self, left: Option<&DocPath>) -> Option<DocPath> {
        if self.mode != AutosaveMode::OnFocusChange {
            return None;
        }
        left.filter(|path| !path.is_untitled()).cloned()
    }

    pub fn is_pending(&self, path: &DocPath) -> bool {
        self.pending.contains_key(path)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cancel(&mut self, path: &DocPath) -> bool {
        match self.pending.remove(path) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
    }

    /// Waits for the next live timer to fire and returns its path.
    pub async fn next_due(&mut self) -> Option<DocPath> {
        loop {
            let due = self.rx.recv().await?;
            if self.accept(&due) {
                return Some(due.path);
            }
        }
    }

    fn accept(&mut self, due: &AutosaveDue) -> bool {
        match self.pending.get(&due.path) {
            Some(pending) if pending.generation == due.generation => {
                self.pending.remove(&due.path);
                true
            }
            _ => {
                tracing::trace!(path = %due.path, generation = due.generation, "stale autosave notice dropped");
                false
            }
        }
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/autosave.rs"]
mod tests;
