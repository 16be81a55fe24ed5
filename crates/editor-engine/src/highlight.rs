//! Syntax highlighting hook.
//!
//! The engine does not tokenize anything. Embedders pass a [`SyntaxHighlighter`] to
//! [`crate::EditorEngine::snapshot`] and its spans are attached to each rendered row.

/// Opaque style identifier chosen by the highlighter.
pub type StyleId = u32;

/// A styled byte range within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleSpan {
    /// Inclusive start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
    /// Style to apply.
    pub style: StyleId,
}

impl StyleSpan {
    /// Create a new span.
    pub fn new(start: usize, end: usize, style: StyleId) -> Self {
        Self { start, end, style }
    }
}

/// Produces style spans for a single line (terminator excluded).
pub trait SyntaxHighlighter {
    /// Highlight one line.
    fn highlight_line(&self, line: &[u8]) -> Vec<StyleSpan>;
}

impl<F> SyntaxHighlighter for F
where
    F: Fn(&[u8]) -> Vec<StyleSpan>,
{
    fn highlight_line(&self, line: &[u8]) -> Vec<StyleSpan> {
        self(line)
    }
}
