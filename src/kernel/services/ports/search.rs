use std::io;
use std::path::PathBuf;

pub const DEFAULT_MAX_RESULTS: usize = 2000;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("result cap must be at least 1")]
    InvalidCap,
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
    #[error("cannot read search root {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("search cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub is_regex: bool,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            is_regex: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub root: PathBuf,
    pub query: String,
    pub options: SearchOptions,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            query: query.into(),
            options: SearchOptions::default(),
        }
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.options.case_sensitive = value;
        self
    }

    pub fn regex(mut self, value: bool) -> Self {
        self.options.is_regex = value;
        self
    }

    pub fn max_results(mut self, value: usize) -> Self {
        self.options.max_results = value;
        self
    }
}

/// Column range inside one line, in chars, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One matching line. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub path: PathBuf,
    pub line: usize,
    pub spans: Vec<MatchSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    pub search_id: u64,
    pub total_results: usize,
    pub files_searched: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub enum SearchMessage {
    Progress {
        search_id: u64,
        results: Vec<SearchResult>,
    },
    Complete(SearchSummary),
    Cancelled {
        search_id: u64,
    },
    Error {
        search_id: u64,
        message: String,
    },
}

impl SearchMessage {
    pub fn search_id(&self) -> u64 {
        match self {
            Self::Progress { search_id, .. }
            | Self::Cancelled { search_id }
            | Self::Error { search_id, .. } => *search_id,
            Self::Complete(summary) => summary.search_id,
        }
    }
}
