//! Structured text change deltas.
//!
//! Every mutation of the document is described by a [`TextDeltaEdit`]: the byte offset, the exact
//! deleted and inserted bytes, and the line/column span before and after. Overlays (folds,
//! diagnostics, search) reposition themselves from these edits instead of rescanning the document,
//! and embedders can forward them to incremental consumers.

use crate::line_index::EditSpan;
use crate::position::Position;

/// A single applied edit.
///
/// Edits inside a [`TextDelta`] must be applied **in order** to transform the "before" document
/// into the "after" document. Offsets and positions of each edit refer to the document at the
/// time that edit is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Byte offset of the edit.
    pub offset: usize,
    /// Exact deleted bytes (may be empty).
    pub deleted: Vec<u8>,
    /// Exact inserted bytes (may be empty).
    pub inserted: Vec<u8>,
    /// Position of `offset`.
    pub start: Position,
    /// End of the deleted range before the edit.
    pub old_end: Position,
    /// End of the inserted bytes after the edit.
    pub new_end: Position,
}

/// What happened to the start of a pre-edit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineFate {
    /// The line starts before the edit and keeps its number.
    Kept(usize),
    /// The line starts at or after the end of the edit and now has this number.
    Moved(usize),
    /// The line start was deleted by the edit.
    Deleted,
}

impl TextDeltaEdit {
    pub(crate) fn new(offset: usize, deleted: Vec<u8>, inserted: Vec<u8>, span: EditSpan) -> Self {
        Self {
            offset,
            deleted,
            inserted,
            start: span.start,
            old_end: span.old_end,
            new_end: span.new_end,
        }
    }

    /// Length of the deleted bytes.
    pub fn deleted_len(&self) -> usize {
        self.deleted.len()
    }

    /// Length of the inserted bytes.
    pub fn inserted_len(&self) -> usize {
        self.inserted.len()
    }

    /// Exclusive end offset in the pre-edit document.
    pub fn old_end_offset(&self) -> usize {
        self.offset + self.deleted.len()
    }

    /// Exclusive end offset in the post-edit document.
    pub fn new_end_offset(&self) -> usize {
        self.offset + self.inserted.len()
    }

    /// Net change in line count.
    pub fn line_delta(&self) -> isize {
        self.new_end.line as isize - self.old_end.line as isize
    }

    /// Whether the edit added or removed line boundaries.
    pub fn changes_lines(&self) -> bool {
        self.old_end.line != self.start.line || self.new_end.line != self.start.line
    }

    /// Map a pre-edit byte offset into the post-edit document.
    ///
    /// Offsets inside the deleted range collapse to the edit start. An offset equal to the end of
    /// the deleted range follows the inserted text.
    pub fn map_offset(&self, offset: usize) -> usize {
        let old_end = self.old_end_offset();
        if offset >= old_end && (offset > self.offset || self.deleted.is_empty()) {
            offset - old_end + self.new_end_offset()
        } else if offset > self.offset {
            self.offset
        } else {
            offset
        }
    }

    pub(crate) fn shift_line(&self, line: usize) -> usize {
        line.saturating_add_signed(self.line_delta())
    }

    /// Classify the start of pre-edit `line`.
    pub(crate) fn line_fate(&self, line: usize) -> LineFate {
        let start = self.start;
        let old_end = self.old_end;

        if line < start.line || (line == start.line && start.column > 0) {
            return LineFate::Kept(line);
        }
        if line > old_end.line {
            return LineFate::Moved(self.shift_line(line));
        }

        // The line start sits inside [start, old_end].
        if line == start.line {
            // start.column == 0: the line begins exactly at the edit.
            if self.deleted.is_empty() {
                return LineFate::Moved(self.shift_line(line));
            }
            if old_end.line == start.line {
                return LineFate::Kept(line);
            }
            return LineFate::Deleted;
        }
        if line == old_end.line && old_end.column == 0 {
            return LineFate::Moved(self.shift_line(line));
        }
        LineFate::Deleted
    }
}

/// A structured description of a document text change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDelta {
    /// Byte length before applying `edits`.
    pub before_len: usize,
    /// Byte length after applying `edits`.
    pub after_len: usize,
    /// Ordered list of edits that transforms the "before" document into the "after" document.
    pub edits: Vec<TextDeltaEdit>,
    /// If known, the history group this change belongs to.
    pub undo_group_id: Option<u64>,
}

impl TextDelta {
    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(offset: usize, deleted: &str, inserted: &str, span: [(usize, usize); 3]) -> TextDeltaEdit {
        TextDeltaEdit {
            offset,
            deleted: deleted.as_bytes().to_vec(),
            inserted: inserted.as_bytes().to_vec(),
            start: span[0].into(),
            old_end: span[1].into(),
            new_end: span[2].into(),
        }
    }

    #[test]
    fn test_line_fate_for_line_deletion() {
        // "a\nb\nc\nd\n": delete lines 1..=2
        let e = edit(2, "b\nc\n", "", [(1, 0), (3, 0), (1, 0)]);
        assert_eq!(e.line_fate(0), LineFate::Kept(0));
        assert_eq!(e.line_fate(1), LineFate::Deleted);
        assert_eq!(e.line_fate(2), LineFate::Deleted);
        assert_eq!(e.line_fate(3), LineFate::Moved(1));
        assert_eq!(e.line_fate(4), LineFate::Moved(2));
    }

    #[test]
    fn test_line_fate_for_inserted_lines() {
        let e = edit(2, "", "x\ny\n", [(1, 0), (1, 0), (3, 0)]);
        assert_eq!(e.line_fate(0), LineFate::Kept(0));
        assert_eq!(e.line_fate(1), LineFate::Moved(3));

        // Splitting line 1 in the middle keeps its start in place.
        let e = edit(3, "", "\n", [(1, 1), (1, 1), (2, 0)]);
        assert_eq!(e.line_fate(1), LineFate::Kept(1));
        assert_eq!(e.line_fate(2), LineFate::Moved(3));
    }

    #[test]
    fn test_map_offset() {
        let e = edit(4, "xy", "abc", [(0, 4), (0, 6), (0, 7)]);
        assert_eq!(e.map_offset(2), 2);
        assert_eq!(e.map_offset(4), 4);
        assert_eq!(e.map_offset(5), 4);
        assert_eq!(e.map_offset(6), 7);
        assert_eq!(e.map_offset(10), 11);

        let insert = edit(4, "", "ab", [(0, 4), (0, 4), (0, 6)]);
        assert_eq!(insert.map_offset(4), 6);
        assert_eq!(insert.map_offset(3), 3);
    }
}
