//! Line index.
//!
//! Maps between byte offsets and [`Position`]s. The index stores the byte length of every line
//! (terminator included) in a weighted tree, so line starts are prefix sums and both directions of
//! the mapping are O(log n).
//!
//! The buffer is scanned once when a document is loaded. After that, [`PositionIndex::apply_edit`]
//! patches only the lines an edit touches, using nothing but the inserted bytes.

use crate::error::{EngineError, Result};
use crate::position::Position;
use crate::tree::WeightTree;
use std::ops::Range;

/// Line boundaries of an edit, before and after it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpan {
    /// Position of the first affected byte (same before and after the edit).
    pub start: Position,
    /// End of the deleted range, in pre-edit coordinates.
    pub old_end: Position,
    /// End of the inserted text, in post-edit coordinates.
    pub new_end: Position,
}

/// Offset ↔ position mapping over line lengths.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    /// Length of each line in bytes, including its `\n` (the last line has none).
    lines: WeightTree<usize>,
}

impl PositionIndex {
    /// Index over an empty document (one empty line).
    pub fn new() -> Self {
        Self::from_bytes(b"")
    }

    /// Scan `bytes` and build the index.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            lines: WeightTree::from_items(line_lengths(bytes)),
        }
    }

    /// Number of lines. Never zero.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total byte length covered by the index.
    pub fn byte_len(&self) -> usize {
        self.lines.total_weight()
    }

    /// Byte offset of the first byte of `line`.
    pub fn line_start(&self, line: usize) -> Result<usize> {
        self.check_line(line)?;
        Ok(self.lines.weight_before(line))
    }

    /// Length of `line` in bytes, excluding its terminator.
    pub fn line_len(&self, line: usize) -> Result<usize> {
        let raw = self.raw_line_len(line)?;
        Ok(if self.is_last_line(line) { raw } else { raw - 1 })
    }

    /// Byte range of `line`, including its terminator.
    pub fn line_range(&self, line: usize) -> Result<Range<usize>> {
        let start = self.line_start(line)?;
        let raw = self.raw_line_len(line)?;
        Ok(start..start + raw)
    }

    /// Position of byte `offset`. `offset == byte_len()` maps to the end of the last line.
    pub fn offset_to_position(&self, offset: usize) -> Result<Position> {
        let len = self.byte_len();
        if offset > len {
            return Err(EngineError::InvalidOffset { offset, len });
        }

        match self.lines.locate(offset) {
            Some((line, start)) => Ok(Position::new(line, offset - start)),
            None => {
                let line = self.line_count() - 1;
                let start = self.lines.weight_before(line);
                Ok(Position::new(line, offset - start))
            }
        }
    }

    /// Byte offset of `position`. The column may equal the line length (end of line).
    pub fn position_to_offset(&self, position: Position) -> Result<usize> {
        let len = self.line_len(position.line)?;
        if position.column > len {
            return Err(EngineError::ColumnOutOfBounds {
                line: position.line,
                column: position.column,
                len,
            });
        }
        Ok(self.lines.weight_before(position.line) + position.column)
    }

    /// Update the index for replacing `deleted_len` bytes at `offset` with `inserted`.
    ///
    /// Must be called with the index still describing the pre-edit document.
    pub fn apply_edit(
        &mut self,
        offset: usize,
        deleted_len: usize,
        inserted: &[u8],
    ) -> Result<EditSpan> {
        let len = self.byte_len();
        let end = offset.saturating_add(deleted_len);
        if offset > len || end > len {
            return Err(EngineError::InvalidRange {
                start: offset,
                end,
                len,
            });
        }

        let start = self.offset_to_position(offset)?;
        let old_end = self.offset_to_position(end)?;

        let prefix = start.column;
        let last_range = self.line_range(old_end.line)?;
        let suffix = last_range.end - end;

        // Every line from `start.line` to `old_end.line` is replaced. The prefix of the first
        // line holds no terminator; the suffix of the last one carries its terminator, if any.
        let mut segments = inserted.split(|b| *b == b'\n');
        let first_segment = segments.next().map_or(0, <[u8]>::len);
        let mut new_lines = Vec::new();
        let mut tail = prefix + first_segment;
        for segment in segments {
            new_lines.push(tail + 1);
            tail = segment.len();
        }
        let new_end = Position::new(start.line + new_lines.len(), tail);
        new_lines.push(tail + suffix);

        tracing::trace!(
            offset,
            deleted_len,
            inserted_len = inserted.len(),
            removed_lines = old_end.line - start.line + 1,
            added_lines = new_lines.len(),
            "patched line index"
        );

        self.lines.splice(start.line..old_end.line + 1, new_lines);

        Ok(EditSpan {
            start,
            old_end,
            new_end,
        })
    }

    /// Line lengths (terminators included), for consistency checks.
    pub fn raw_line_lengths(&self) -> Vec<usize> {
        self.lines.iter().copied().collect()
    }

    fn raw_line_len(&self, line: usize) -> Result<usize> {
        self.lines
            .get(line)
            .copied()
            .ok_or(EngineError::LineOutOfBounds {
                line,
                line_count: self.line_count(),
            })
    }

    fn is_last_line(&self, line: usize) -> bool {
        line + 1 == self.line_count()
    }

    fn check_line(&self, line: usize) -> Result<()> {
        let line_count = self.line_count();
        if line >= line_count {
            return Err(EngineError::LineOutOfBounds { line, line_count });
        }
        Ok(())
    }
}

impl Default for PositionIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Line lengths of `bytes`, terminators included. Always yields at least one line.
pub(crate) fn line_lengths(bytes: &[u8]) -> Vec<usize> {
    let mut lengths: Vec<usize> = bytes
        .split(|b| *b == b'\n')
        .map(|segment| segment.len() + 1)
        .collect();
    if let Some(last) = lengths.last_mut() {
        *last -= 1;
    }
    lengths
}
