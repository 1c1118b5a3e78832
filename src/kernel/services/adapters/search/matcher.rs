//! Per-line matcher.
//!
//! - Literal, case-sensitive: `memmem::Finder`
//! - Literal, case-insensitive ASCII query: ASCII-folded haystack + `Finder`
//!   on ASCII lines; non-ASCII lines go through the escaped regex so folding
//!   matches regex mode (e.g. `k` finds the Kelvin sign)
//! - Literal, case-insensitive non-ASCII query: escaped case-insensitive regex
//! - Regex: `Regex::find_iter`, zero-width matches dropped

use memchr::memmem::Finder;
use regex::{Regex, RegexBuilder};

use crate::kernel::services::ports::search::{MatchSpan, Result, SearchError, SearchRequest};

pub enum LineMatcher {
    Literal {
        finder: Finder<'static>,
        ascii_fold: bool,
        unicode: Option<Regex>,
    },
    Regex(Regex),
}

impl std::fmt::Debug for LineMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal {
                finder, ascii_fold, ..
            } => f
                .debug_struct("Literal")
                .field("needle", &String::from_utf8_lossy(finder.needle()))
                .field("ascii_fold", ascii_fold)
                .finish(),
            Self::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
        }
    }
}

impl LineMatcher {
    /// Validates the request and compiles its query. Rejects input errors before any walk.
    pub fn for_request(request: &SearchRequest) -> Result<Self> {
        if request.options.max_results == 0 {
            return Err(SearchError::InvalidCap);
        }
        Self::new(
            &request.query,
            request.options.case_sensitive,
            request.options.is_regex,
        )
    }

    pub fn new(query: &str, case_sensitive: bool, is_regex: bool) -> Result<Self> {
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        if is_regex {
            let regex = RegexBuilder::new(query)
                .case_insensitive(!case_sensitive)
                .build()?;
            return Ok(Self::Regex(regex));
        }

        if case_sensitive {
            return Ok(Self::Literal {
                finder: Finder::new(query.as_bytes()).into_owned(),
                ascii_fold: false,
                unicode: None,
            });
        }

        if query.is_ascii() {
            let folded = query.to_ascii_lowercase();
            return Ok(Self::Literal {
                finder: Finder::new(folded.as_bytes()).into_owned(),
                ascii_fold: true,
                unicode: Some(folding_regex(query)?),
            });
        }

        Ok(Self::Regex(folding_regex(query)?))
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }

    /// Appends the non-overlapping matches in `line` as char-column spans.
    pub fn find_in_line(&self, line: &str, out: &mut Vec<MatchSpan>) {
        let mut columns = ColumnCursor::new(line);
        match self {
            Self::Literal {
                unicode: Some(regex),
                ..
            } if !line.is_ascii() => {
                for m in regex.find_iter(line) {
                    out.push(columns.span(m.start(), m.end()));
                }
            }
            Self::Literal {
                finder, ascii_fold, ..
            } => {
                let folded;
                let haystack = if *ascii_fold {
                    folded = line.to_ascii_lowercase();
                    folded.as_bytes()
                } else {
                    line.as_bytes()
                };
                let needle_len = finder.needle().len();
                let mut pos = 0usize;
                while let Some(offset) = finder.find(&haystack[pos..]) {
                    let start = pos + offset;
                    let end = start + needle_len;
                    out.push(columns.span(start, end));
                    pos = end;
                }
            }
            Self::Regex(regex) => {
                // find_iter steps past empty matches itself; they carry no span to show.
                for m in regex.find_iter(line).filter(|m| !m.is_empty()) {
                    out.push(columns.span(m.start(), m.end()));
                }
            }
        }
    }
}

/// Case-insensitive matcher for a literal query, with Unicode simple folding.
fn folding_regex(query: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()?)
}

/// Converts ascending byte offsets into char columns without rescanning the line.
struct ColumnCursor<'a> {
    line: &'a str,
    byte: usize,
    column: usize,
}

impl<'a> ColumnCursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            byte: 0,
            column: 0,
        }
    }

    fn column_at(&mut self, byte: usize) -> usize {
        if byte >= self.byte {
            self.column += self.line[self.byte..byte].chars().count();
        } else {
            self.column = self.line[..byte].chars().count();
        }
        self.byte = byte;
        self.column
    }

    fn span(&mut self, start: usize, end: usize) -> MatchSpan {
        let start = self.column_at(start);
        let end = self.column_at(end);
        MatchSpan::new(start, end)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/matcher.rs"]
mod tests;
