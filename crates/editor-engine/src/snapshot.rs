//! Render snapshots.
//!
//! A [`ViewSnapshot`] is an owned, read-only picture of a window of visible rows: folded lines are
//! skipped, and each row carries its bytes, fold state, style spans, diagnostics and carets.

use crate::diagnostics::DiagnosticMarker;
use crate::highlight::StyleSpan;

/// Fold information for a row that starts a fold region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldMarker {
    /// Last line of the region.
    pub end_line: usize,
    /// Whether the region is collapsed.
    pub is_collapsed: bool,
    /// Text to show after the row while collapsed.
    pub placeholder: String,
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    /// Visual row index.
    pub row: usize,
    /// Logical line shown in this row.
    pub line: usize,
    /// Line bytes without the terminator.
    pub text: Vec<u8>,
    /// Set when a fold region starts on this line.
    pub fold: Option<FoldMarker>,
    /// Highlighter output.
    pub spans: Vec<StyleSpan>,
    /// Diagnostics anchored on this line.
    pub diagnostics: Vec<DiagnosticMarker>,
    /// Columns of carets on this line.
    pub carets: Vec<usize>,
}

/// A window of visible rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Document version the snapshot was taken at.
    pub version: u64,
    /// Visual row of the first entry in `rows`.
    pub first_row: usize,
    /// Total visible rows in the document.
    pub total_rows: usize,
    /// The rows.
    pub rows: Vec<ViewRow>,
}
