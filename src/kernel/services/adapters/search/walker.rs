//! Workspace walk.
//!
//! Depth-first over the root, directories before files, siblings by name.
//! Version-control, dependency and dot-prefixed directories are pruned
//! without descending. The walk stops the moment the result cap is reached
//! and checks the cancellation flag before every file and every line.

use ignore::{DirEntry, WalkBuilder};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use super::matcher::LineMatcher;
use crate::kernel::services::ports::search::{
    MatchSpan, Result, SearchError, SearchRequest, SearchResult,
};
use crate::kernel::services::ports::FileProvider;

pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "target",
    "__pycache__",
    ".venv",
];

const BINARY_PROBE_LEN: usize = 8192;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    pub results: Vec<SearchResult>,
    pub files_searched: usize,
    /// The walk stopped at the result cap rather than at the end of the tree.
    pub truncated: bool,
}

/// Runs a whole search synchronously. `progress` receives each newly found batch.
pub fn search_workspace(
    request: &SearchRequest,
    files: &dyn FileProvider,
    cancelled: &AtomicBool,
    progress: impl FnMut(&[SearchResult]),
) -> Result<WalkOutcome> {
    let matcher = LineMatcher::for_request(request)?;
    walk(
        &request.root,
        &matcher,
        request.options.max_results,
        files,
        cancelled,
        progress,
    )
}

pub(crate) fn walk(
    root: &Path,
    matcher: &LineMatcher,
    max_results: usize,
    files: &dyn FileProvider,
    cancelled: &AtomicBool,
    mut progress: impl FnMut(&[SearchResult]),
) -> Result<WalkOutcome> {
    std::fs::read_dir(root).map_err(|source| SearchError::Root {
        path: root.to_path_buf(),
        source,
    })?;

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_path(directories_first)
        .filter_entry(keep_entry)
        .build();

    let mut outcome = WalkOutcome::default();
    let mut reported = 0usize;
    let mut spans: Vec<MatchSpan> = Vec::new();

    for entry in walker {
        if cancelled.load(AtomicOrdering::Relaxed) {
            return Err(SearchError::Cancelled);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "search walk entry skipped");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(text) = read_text(files, path) else {
            continue;
        };
        outcome.files_searched += 1;

        for (index, line) in text.lines().enumerate() {
            if cancelled.load(AtomicOrdering::Relaxed) {
                return Err(SearchError::Cancelled);
            }

            matcher.find_in_line(line, &mut spans);
            if spans.is_empty() {
                continue;
            }
            outcome.results.push(SearchResult {
                path: path.to_path_buf(),
                line: index + 1,
                spans: std::mem::take(&mut spans),
            });

            if outcome.results.len() >= max_results {
                outcome.truncated = true;
                progress(&outcome.results[reported..]);
                return Ok(outcome);
            }
        }

        if outcome.results.len() > reported {
            progress(&outcome.results[reported..]);
            reported = outcome.results.len();
        }
    }

    Ok(outcome)
}

fn directories_first(a: &Path, b: &Path) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.file_name().cmp(&b.file_name()))
}

fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if !entry.file_type().is_some_and(|t| t.is_dir()) {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !(name.starts_with('.') || IGNORED_DIRS.contains(&name.as_ref()))
}

/// Reads a file as text. Unreadable, binary and non-UTF-8 files yield `None`.
fn read_text(files: &dyn FileProvider, path: &Path) -> Option<String> {
    let bytes = match files.read_file_bytes(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "search skipped unreadable file");
            return None;
        }
    };
    if is_likely_binary(&bytes) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

fn is_likely_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/walker.rs"]
mod tests;
