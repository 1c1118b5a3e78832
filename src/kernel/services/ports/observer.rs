//! Presentation callbacks.
//!
//! The core makes no assumption about how many observers exist; every hook
//! has an empty default so observers only implement what they render.

use super::search::{SearchResult, SearchSummary};
use crate::kernel::{DocPath, PaneId};

pub trait WorkspaceObserver: Send + Sync {
    fn notify_dirty_changed(&self, _pane: PaneId, _path: &DocPath, _dirty: bool) {}

    fn notify_tabs_changed(&self, _pane: PaneId) {}

    fn notify_active_pane_changed(&self, _pane: PaneId) {}

    fn notify_search_progress(&self, _search_id: u64, _partial: &[SearchResult]) {}

    fn notify_search_finished(&self, _summary: &SearchSummary) {}

    fn notify_save_failed(&self, _path: &DocPath, _message: &str) {}

    fn notify_engine_failed(&self, _message: &str) {}
}
