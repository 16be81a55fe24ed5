//! Diagnostic markers.
//!
//! Markers are point anchors (line, column) carrying a severity and a message. They are derived
//! state: an integration supplies them, and the overlay keeps them attached to the right text as
//! the document changes.
//!
//! Repositioning rules for an edit:
//! - markers on lines wholly inside the deleted range are removed
//! - markers on a line the edit splits or joins are re-anchored per [`ReanchorPolicy`]
//! - markers on the edited line of a single-line edit shift by the column delta
//! - markers after the edit shift by the line delta

use crate::delta::TextDeltaEdit;
use crate::error::{EngineError, Result};
use crate::position::Position;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

/// Stable marker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerId(pub u64);

/// A single diagnostic anchored at a position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticMarker {
    /// Zero-based line.
    pub line: usize,
    /// Byte column within the line.
    pub column: usize,
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// Diagnostic message.
    pub message: String,
    /// Optional diagnostic source (e.g. `"rustc"`).
    pub source: Option<String>,
    /// Optional diagnostic code (stringified).
    pub code: Option<String>,
}

impl DiagnosticMarker {
    /// Create a marker without source or code.
    pub fn new(
        line: usize,
        column: usize,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            severity,
            message: message.into(),
            source: None,
            code: None,
        }
    }

    /// Attach a source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Anchor position.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// What happens to markers on a line that an edit splits or joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReanchorPolicy {
    /// Move the marker to column 0 of the resulting line.
    #[default]
    LineStart,
    /// Drop the marker.
    Remove,
}

/// A marker together with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    /// Marker id.
    pub id: MarkerId,
    /// The marker.
    pub marker: DiagnosticMarker,
}

/// Per-severity totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticCounts {
    /// Number of errors.
    pub errors: usize,
    /// Number of warnings.
    pub warnings: usize,
    /// Number of informational markers.
    pub information: usize,
    /// Number of hints.
    pub hints: usize,
}

enum Anchor {
    Keep(Position),
    Reanchor(usize),
    Remove,
}

/// Markers sorted by position.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticOverlay {
    entries: Vec<DiagnosticEntry>,
    next_id: u64,
    policy: ReanchorPolicy,
}

impl DiagnosticOverlay {
    /// Create an empty overlay.
    pub fn new(policy: ReanchorPolicy) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            policy,
        }
    }

    /// Current re-anchoring policy.
    pub fn policy(&self) -> ReanchorPolicy {
        self.policy
    }

    /// Change the re-anchoring policy.
    pub fn set_policy(&mut self, policy: ReanchorPolicy) {
        self.policy = policy;
    }

    /// Add a marker. Bounds are the caller's responsibility.
    pub fn add(&mut self, marker: DiagnosticMarker) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        let pos = self
            .entries
            .partition_point(|e| (e.marker.position(), e.id) < (marker.position(), id));
        self.entries.insert(pos, DiagnosticEntry { id, marker });
        id
    }

    /// Remove a marker.
    pub fn remove(&mut self, id: MarkerId) -> Result<DiagnosticMarker> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(EngineError::UnknownMarker(id))?;
        Ok(self.entries.remove(index).marker)
    }

    /// Replace every marker.
    pub fn replace_all(&mut self, markers: Vec<DiagnosticMarker>) -> Vec<MarkerId> {
        self.entries.clear();
        markers.into_iter().map(|marker| self.add(marker)).collect()
    }

    /// Drop every marker.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Marker by id.
    pub fn get(&self, id: MarkerId) -> Option<&DiagnosticMarker> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.marker)
    }

    /// All markers in document order.
    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the overlay holds no markers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Markers on `line`, in column order.
    pub fn markers_for_line(&self, line: usize) -> &[DiagnosticEntry] {
        let start = self.entries.partition_point(|e| e.marker.line < line);
        let end = self.entries.partition_point(|e| e.marker.line <= line);
        &self.entries[start..end]
    }

    /// Per-severity totals.
    pub fn counts(&self) -> DiagnosticCounts {
        let mut counts = DiagnosticCounts::default();
        for entry in &self.entries {
            match entry.marker.severity {
                DiagnosticSeverity::Error => counts.errors += 1,
                DiagnosticSeverity::Warning => counts.warnings += 1,
                DiagnosticSeverity::Information => counts.information += 1,
                DiagnosticSeverity::Hint => counts.hints += 1,
            }
        }
        counts
    }

    /// Reposition markers after `edit`. Returns how many were removed.
    pub fn apply_edit(&mut self, edit: &TextDeltaEdit) -> usize {
        let before = self.entries.len();
        let policy = self.policy;

        self.entries.retain_mut(|entry| {
            let target = match map_anchor(entry.marker.position(), edit) {
                Anchor::Keep(position) => position,
                Anchor::Reanchor(line) if policy == ReanchorPolicy::LineStart => {
                    Position::new(line, 0)
                }
                Anchor::Reanchor(_) | Anchor::Remove => return false,
            };
            entry.marker.line = target.line;
            entry.marker.column = target.column;
            true
        });
        self.entries
            .sort_by_key(|e| (e.marker.line, e.marker.column, e.id));

        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, "diagnostic markers removed by edit");
        }
        removed
    }
}

fn map_anchor(position: Position, edit: &TextDeltaEdit) -> Anchor {
    let start = edit.start;
    let old_end = edit.old_end;
    let new_end = edit.new_end;
    let Position { line, column } = position;

    if line < start.line {
        return Anchor::Keep(position);
    }
    if line > old_end.line {
        return Anchor::Keep(Position::new(edit.shift_line(line), column));
    }

    if !edit.changes_lines() {
        let column = if column < start.column {
            column
        } else if column >= old_end.column {
            column - old_end.column + new_end.column
        } else {
            start.column
        };
        return Anchor::Keep(Position::new(line, column));
    }

    // Whole line (terminator included) inside the deleted range.
    let wholly_deleted = (line > start.line && line < old_end.line)
        || (line == start.line && start.column == 0 && old_end.line > start.line);
    if wholly_deleted {
        return Anchor::Remove;
    }

    if line == start.line {
        // Pure insertion at column 0: the whole line moves down intact.
        if start.column == 0 && old_end == start {
            return Anchor::Keep(Position::new(new_end.line, column + new_end.column));
        }
        if line == old_end.line && column >= old_end.column {
            return Anchor::Reanchor(new_end.line);
        }
        return Anchor::Reanchor(start.line);
    }

    // line == old_end.line > start.line
    if old_end.column == 0 && new_end.column == 0 {
        return Anchor::Keep(Position::new(edit.shift_line(line), column));
    }
    Anchor::Reanchor(new_end.line)
}
