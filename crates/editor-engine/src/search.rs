//! Text search.
//!
//! Search runs line by line over raw bytes with `regex::bytes`, so documents that are not valid
//! UTF-8 remain searchable. Matches never span a line terminator. Results are computed lazily per
//! line and cached until the next mutation invalidates them.
//!
//! Supported modes:
//! - plain substring search (escaped and compiled into a regex)
//! - regex search
//! - optional whole-word matching and case folding

use crate::document::Document;
use crate::error::{EngineError, Result};
use crate::position::Position;
use regex::bytes::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::ops::Range;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// A match within one line, as a half-open byte column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchMatch {
    /// Line of the match.
    pub line: usize,
    /// Inclusive start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Start of the match.
    pub fn start_position(&self) -> Position {
        Position::new(self.line, self.start)
    }

    /// End of the match.
    pub fn end_position(&self) -> Position {
        Position::new(self.line, self.end)
    }
}

#[derive(Debug, Clone)]
struct Query {
    pattern: String,
    options: SearchOptions,
    regex: Regex,
}

impl Query {
    fn compile(pattern: &str, options: SearchOptions) -> Result<Self> {
        let source = if options.regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|err| EngineError::InvalidRegex(err.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            options,
            regex,
        })
    }

    fn find_in_line(&self, line: &[u8]) -> Vec<Range<usize>> {
        self.regex
            .find_iter(line)
            .filter(|m| !m.is_empty())
            .filter(|m| !self.options.whole_word || is_whole_word(line, m.start(), m.end()))
            .map(|m| m.range())
            .collect()
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_whole_word(line: &[u8], start: usize, end: usize) -> bool {
    let before = line[..start]
        .utf8_chunks()
        .last()
        .filter(|chunk| chunk.invalid().is_empty())
        .and_then(|chunk| chunk.valid().chars().next_back());
    let after = line[end..]
        .utf8_chunks()
        .next()
        .and_then(|chunk| chunk.valid().chars().next());

    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Active query plus per-line match cache.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    query: Option<Query>,
    cache: HashMap<usize, Vec<Range<usize>>>,
    current: Option<SearchMatch>,
}

impl SearchEngine {
    /// Create an engine with no query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active query. An empty pattern clears it.
    pub fn set_query(&mut self, pattern: &str, options: SearchOptions) -> Result<()> {
        let query = if pattern.is_empty() {
            None
        } else {
            Some(Query::compile(pattern, options)?)
        };
        tracing::debug!(pattern, ?options, "search query set");
        self.query = query;
        self.invalidate();
        Ok(())
    }

    /// Drop the active query.
    pub fn clear_query(&mut self) {
        self.query = None;
        self.invalidate();
    }

    /// The active pattern.
    pub fn pattern(&self) -> Option<&str> {
        self.query.as_ref().map(|q| q.pattern.as_str())
    }

    /// Options of the active query.
    pub fn options(&self) -> Option<SearchOptions> {
        self.query.as_ref().map(|q| q.options)
    }

    /// The match last returned by [`SearchEngine::next_match`] / [`SearchEngine::previous_match`].
    pub fn current(&self) -> Option<SearchMatch> {
        self.current
    }

    /// Forget cached results. Called on every document mutation.
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.current = None;
    }

    /// Lazily iterate every match in document order.
    pub fn matches<'a>(&'a self, document: &'a Document) -> Matches<'a> {
        Matches {
            query: self.query.as_ref(),
            document,
            next_line: 0,
            line: 0,
            pending: Vec::new().into_iter(),
        }
    }

    /// Total number of matches.
    pub fn match_count(&mut self, document: &Document) -> Result<usize> {
        let mut count = 0;
        for line in 0..document.line_count() {
            count += self.line_matches(document, line)?.len();
        }
        Ok(count)
    }

    /// Matches on `line`, computed on first use.
    pub fn line_matches(&mut self, document: &Document, line: usize) -> Result<&[Range<usize>]> {
        let Some(query) = &self.query else {
            return Ok(&[]);
        };
        if !self.cache.contains_key(&line) {
            let content = document.line_content(line)?;
            self.cache.insert(line, query.find_in_line(&content));
        }
        Ok(self.cache.get(&line).map_or(&[][..], Vec::as_slice))
    }

    /// First match starting after `from`, wrapping to the start of the document.
    pub fn next_match(&mut self, document: &Document, from: Position) -> Result<Option<SearchMatch>> {
        if self.query.is_none() {
            return Ok(None);
        }
        let line_count = document.line_count();
        let from_line = from.line.min(line_count - 1);

        for step in 0..=line_count {
            let line = (from_line + step) % line_count;
            let found = self.line_matches(document, line)?.iter().find(|range| {
                match step {
                    0 => range.start > from.column,
                    s if s == line_count => range.start <= from.column,
                    _ => true,
                }
            });
            if let Some(range) = found.cloned() {
                return Ok(self.select(line, range));
            }
        }
        Ok(self.select_none())
    }

    /// Last match starting before `from`, wrapping to the end of the document.
    pub fn previous_match(
        &mut self,
        document: &Document,
        from: Position,
    ) -> Result<Option<SearchMatch>> {
        if self.query.is_none() {
            return Ok(None);
        }
        let line_count = document.line_count();
        let from_line = from.line.min(line_count - 1);

        for step in 0..=line_count {
            let line = (from_line + line_count * 2 - step) % line_count;
            let found = self.line_matches(document, line)?.iter().rev().find(|range| {
                match step {
                    0 => range.start < from.column,
                    s if s == line_count => range.start >= from.column,
                    _ => true,
                }
            });
            if let Some(range) = found.cloned() {
                return Ok(self.select(line, range));
            }
        }
        Ok(self.select_none())
    }

    fn select(&mut self, line: usize, range: Range<usize>) -> Option<SearchMatch> {
        self.current = Some(SearchMatch {
            line,
            start: range.start,
            end: range.end,
        });
        self.current
    }

    fn select_none(&mut self) -> Option<SearchMatch> {
        self.current = None;
        None
    }
}

/// Lazy iterator over matches, line by line.
#[derive(Debug)]
pub struct Matches<'a> {
    query: Option<&'a Query>,
    document: &'a Document,
    next_line: usize,
    line: usize,
    pending: std::vec::IntoIter<Range<usize>>,
}

impl Iterator for Matches<'_> {
    type Item = SearchMatch;

    fn next(&mut self) -> Option<SearchMatch> {
        let query = self.query?;
        loop {
            if let Some(range) = self.pending.next() {
                return Some(SearchMatch {
                    line: self.line,
                    start: range.start,
                    end: range.end,
                });
            }
            if self.next_line >= self.document.line_count() {
                return None;
            }
            let content = self.document.line_content(self.next_line).ok()?;
            self.pending = query.find_in_line(&content).into_iter();
            self.line = self.next_line;
            self.next_line += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn m(line: usize, start: usize, end: usize) -> SearchMatch {
        SearchMatch { line, start, end }
    }

    #[test]
    fn test_plain_search_escapes_pattern() {
        let doc = Document::new("a.b axb\na.b");
        let mut search = SearchEngine::new();
        search.set_query("a.b", SearchOptions::default()).unwrap();
        let all: Vec<_> = search.matches(&doc).collect();
        assert_eq!(all, vec![m(0, 0, 3), m(1, 0, 3)]);
    }

    #[test]
    fn test_case_insensitive_regex() {
        let doc = Document::new("Foo fOO\nbar");
        let mut search = SearchEngine::new();
        let options = SearchOptions {
            case_sensitive: false,
            regex: true,
            ..Default::default()
        };
        search.set_query("fo+", options).unwrap();
        assert_eq!(search.match_count(&doc).unwrap(), 2);
    }

    #[test]
    fn test_whole_word() {
        let doc = Document::new("cat concat cat_ cat.");
        let mut search = SearchEngine::new();
        let options = SearchOptions {
            whole_word: true,
            ..Default::default()
        };
        search.set_query("cat", options).unwrap();
        let all: Vec<_> = search.matches(&doc).collect();
        assert_eq!(all, vec![m(0, 0, 3), m(0, 16, 19)]);
    }

    #[test]
    fn test_invalid_regex() {
        let mut search = SearchEngine::new();
        let options = SearchOptions {
            regex: true,
            ..Default::default()
        };
        assert!(matches!(
            search.set_query("(", options),
            Err(EngineError::InvalidRegex(_))
        ));
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let doc = Document::new("abc");
        let mut search = SearchEngine::new();
        let options = SearchOptions {
            regex: true,
            ..Default::default()
        };
        search.set_query("x*", options).unwrap();
        assert_eq!(search.matches(&doc).count(), 0);
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let doc = Document::new("foo\nbar foo\nfoo");
        let mut search = SearchEngine::new();
        search.set_query("foo", SearchOptions::default()).unwrap();

        let origin = Position::new(0, 0);
        assert_eq!(search.next_match(&doc, origin).unwrap(), Some(m(1, 4, 7)));
        assert_eq!(
            search.next_match(&doc, Position::new(1, 4)).unwrap(),
            Some(m(2, 0, 3))
        );
        // Wraps back to the first match.
        assert_eq!(
            search.next_match(&doc, Position::new(2, 0)).unwrap(),
            Some(m(0, 0, 3))
        );
        assert_eq!(search.current(), Some(m(0, 0, 3)));

        assert_eq!(search.previous_match(&doc, origin).unwrap(), Some(m(2, 0, 3)));
        assert_eq!(
            search.previous_match(&doc, Position::new(1, 4)).unwrap(),
            Some(m(0, 0, 3))
        );
    }

    #[test]
    fn test_single_match_wraps_to_itself() {
        let doc = Document::new("only one here");
        let mut search = SearchEngine::new();
        search.set_query("one", SearchOptions::default()).unwrap();
        let at = Position::new(0, 5);
        assert_eq!(search.next_match(&doc, at).unwrap(), Some(m(0, 5, 8)));
        assert_eq!(search.previous_match(&doc, at).unwrap(), Some(m(0, 5, 8)));
    }

    #[test]
    fn test_search_non_utf8_bytes() {
        let doc = Document::new(vec![0xff, b'a', b'b', 0xfe, b'\n', b'a', b'b']);
        let mut search = SearchEngine::new();
        search.set_query("ab", SearchOptions::default()).unwrap();
        let all: Vec<_> = search.matches(&doc).collect();
        assert_eq!(all, vec![m(0, 1, 3), m(1, 0, 2)]);
    }
}
