//! Background workspace search.
//!
//! The query is compiled on the caller's thread so input errors come back
//! synchronously; the walk itself runs on the blocking pool and reports
//! through a channel tagged with the task's id.

use super::matcher::LineMatcher;
use super::walker;
use crate::kernel::services::ports::search::{
    Result, SearchError, SearchMessage, SearchRequest, SearchSummary,
};
use crate::kernel::services::ports::FileProvider;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

static SEARCH_ID: AtomicU64 = AtomicU64::new(0);

fn next_search_id() -> u64 {
    SEARCH_ID.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Debug)]
pub struct SearchTask {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl SearchTask {
    fn new() -> Self {
        Self {
            id: next_search_id(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancelled_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

pub struct WorkspaceSearchService {
    runtime: tokio::runtime::Handle,
    files: Arc<dyn FileProvider>,
}

impl WorkspaceSearchService {
    pub fn new(runtime: tokio::runtime::Handle, files: Arc<dyn FileProvider>) -> Self {
        Self { runtime, files }
    }

    pub fn start(
        &self,
        request: SearchRequest,
        tx: UnboundedSender<SearchMessage>,
    ) -> Result<SearchTask> {
        let matcher = LineMatcher::for_request(&request)?;

        let task = SearchTask::new();
        let search_id = task.id();
        let cancelled = task.cancelled_flag();
        let files = Arc::clone(&self.files);
        let tx_for_complete = tx.clone();

        tracing::debug!(
            search_id,
            root = %request.root.display(),
            query = %request.query,
            regex = request.options.is_regex,
            "workspace search started"
        );

        self.runtime.spawn(async move {
            let cancelled_for_check = cancelled.clone();
            let result = tokio::task::spawn_blocking(move || {
                walker::walk(
                    &request.root,
                    &matcher,
                    request.options.max_results,
                    files.as_ref(),
                    &cancelled,
                    |batch| {
                        let _ = tx.send(SearchMessage::Progress {
                            search_id,
                            results: batch.to_vec(),
                        });
                    },
                )
            })
            .await;

            let message = match result {
                Ok(Ok(outcome)) => {
                    tracing::debug!(
                        search_id,
                        total = outcome.results.len(),
                        files = outcome.files_searched,
                        truncated = outcome.truncated,
                        "workspace search complete"
                    );
                    SearchMessage::Complete(SearchSummary {
                        search_id,
                        total_results: outcome.results.len(),
                        files_searched: outcome.files_searched,
                        truncated: outcome.truncated,
                    })
                }
                Ok(Err(SearchError::Cancelled)) => SearchMessage::Cancelled { search_id },
                Ok(Err(e)) => {
                    tracing::warn!(search_id, error = %e, "workspace search failed");
                    SearchMessage::Error {
                        search_id,
                        message: e.to_string(),
                    }
                }
                Err(_) if cancelled_for_check.load(Ordering::Relaxed) => {
                    SearchMessage::Cancelled { search_id }
                }
                Err(e) => SearchMessage::Error {
                    search_id,
                    message: format!("Search task failed: {}", e),
                },
            };
            let _ = tx_for_complete.send(message);
        });

        Ok(task)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/service.rs"]
mod tests;
