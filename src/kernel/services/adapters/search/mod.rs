//! Workspace search.
//!
//! - LineMatcher: literal (memchr) or regex matching within one line
//! - walker: ordered, pruned, cancellable walk with a global result cap
//! - WorkspaceSearchService: runs the walk off-thread and streams messages

mod matcher;
mod service;
mod walker;

pub use matcher::LineMatcher;
pub use service::{SearchTask, WorkspaceSearchService};
pub use walker::{search_workspace, WalkOutcome, IGNORED_DIRS};
