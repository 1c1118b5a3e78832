//! Search session state.
//!
//! At most one search is live. Every message carries the id of the task
//! that produced it, and anything not tagged with the live id is dropped,
//! so results of a replaced or cleared search never reach the caller.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::services::adapters::search::{SearchTask, WorkspaceSearchService};
use super::services::ports::search::{
    SearchError, SearchMessage, SearchRequest, SearchResult, SearchSummary,
};
use super::services::ports::FileProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUpdate {
    Progress {
        search_id: u64,
        results: Vec<SearchResult>,
    },
    Finished(SearchSummary),
    Cancelled {
        search_id: u64,
    },
    Failed {
        search_id: u64,
        message: String,
    },
}

pub struct SearchSession {
    service: WorkspaceSearchService,
    task: Option<SearchTask>,
    request: Option<SearchRequest>,
    results: Vec<SearchResult>,
    searching: bool,
    summary: Option<SearchSummary>,
    last_error: Option<String>,
    tx: mpsc::UnboundedSender<SearchMessage>,
    rx: mpsc::UnboundedReceiver<SearchMessage>,
}

impl SearchSession {
    pub fn new(runtime: tokio::runtime::Handle, files: Arc<dyn FileProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service: WorkspaceSearchService::new(runtime, files),
            task: None,
            request: None,
            results: Vec::new(),
            searching: false,
            summary: None,
            last_error: None,
            tx,
            rx,
        }
    }

    /// Starts a search, cancelling the one in flight. Invalid input leaves the
    /// current session untouched.
    pub fn start(&mut self, request: SearchRequest) -> Result<u64, SearchError> {
        let task = self.service.start(request.clone(), self.tx.clone())?;
        let search_id = task.id();
        if let Some(previous) = self.task.replace(task) {
            previous.cancel();
            tracing::debug!(search_id = previous.id(), "search superseded");
        }

        self.request = Some(request);
        self.results.clear();
        self.searching = true;
        self.summary = None;
        self.last_error = None;
        Ok(search_id)
    }

    /// Cancels the live search and drops its results.
    pub fn clear(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.request = None;
        self.results.clear();
        self.searching = false;
        self.summary = None;
        self.last_error = None;
    }

    pub fn active_id(&self) -> Option<u64> {
        self.task.as_ref().map(SearchTask::id)
    }

    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn summary(&self) -> Option<&SearchSummary> {
        self.summary.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Folds one message into the session. Returns `None` for stale messages.
    pub fn apply(&mut self, msg: SearchMessage) -> Option<SearchUpdate> {
        if self.active_id() != Some(msg.search_id()) || !self.searching {
            tracing::trace!(search_id = msg.search_id(), "stale search message dropped");
            return None;
        }

        match msg {
            SearchMessage::Progress { search_id, results } => {
                self.results.extend(results.iter().cloned());
                Some(SearchUpdate::Progress { search_id, results })
            }
            SearchMessage::Complete(summary) => {
                self.searching = false;
                self.summary = Some(summary.clone());
                Some(SearchUpdate::Finished(summary))
            }
            SearchMessage::Cancelled { search_id } => {
                self.searching = false;
                Some(SearchUpdate::Cancelled { search_id })
            }
            SearchMessage::Error { search_id, message } => {
                self.searching = false;
                self.last_error = Some(message.clone());
                Some(SearchUpdate::Failed { search_id, message })
            }
        }
    }

    /// Waits for the next update of the live search. `None` once nothing is in flight.
    pub async fn next_update(&mut self) -> Option<SearchUpdate> {
        while self.searching {
            let msg = self.rx.recv().await?;
            if let Some(update) = self.apply(msg) {
                return Some(update);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/search.rs"]
mod tests;
