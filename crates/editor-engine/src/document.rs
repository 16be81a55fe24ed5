//! Document: byte storage plus its line index.
//!
//! [`Document`] is the only place where bytes change. Every mutation goes through
//! [`Document::replace`], which validates the range, patches the line index, updates the piece
//! table and returns the [`TextDeltaEdit`] describing what happened.

use crate::delta::TextDeltaEdit;
use crate::error::{EngineError, Result};
use crate::line_index::PositionIndex;
use crate::position::Position;
use crate::storage::PieceTable;
use std::borrow::Cow;
use std::ops::Range;

/// Buffer and position index kept in lockstep.
#[derive(Debug, Clone, Default)]
pub struct Document {
    buffer: PieceTable,
    index: PositionIndex,
}

impl Document {
    /// Load `bytes` as a new document.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let index = PositionIndex::from_bytes(&bytes);
        Self {
            buffer: PieceTable::new(bytes),
            index,
        }
    }

    /// Total byte length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of lines. An empty document has one line.
    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// The underlying piece table.
    pub fn buffer(&self) -> &PieceTable {
        &self.buffer
    }

    /// The underlying line index.
    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    pub(crate) fn set_gc_threshold(&mut self, threshold: usize) {
        self.buffer.set_gc_threshold(threshold);
    }

    /// Bytes in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>> {
        self.buffer.slice(start, end)
    }

    /// The whole document.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_bytes()
    }

    /// Line `line` including its terminator.
    pub fn line(&self, line: usize) -> Result<Cow<'_, [u8]>> {
        let range = self.index.line_range(line)?;
        self.buffer.slice(range.start, range.end)
    }

    /// Line `line` without its terminator.
    pub fn line_content(&self, line: usize) -> Result<Cow<'_, [u8]>> {
        let start = self.index.line_start(line)?;
        let len = self.index.line_len(line)?;
        self.buffer.slice(start, start + len)
    }

    /// Length of `line` in bytes, excluding the terminator.
    pub fn line_len(&self, line: usize) -> Result<usize> {
        self.index.line_len(line)
    }

    /// Byte range of `line` including its terminator.
    pub fn line_range(&self, line: usize) -> Result<Range<usize>> {
        self.index.line_range(line)
    }

    /// See [`PositionIndex::offset_to_position`].
    pub fn offset_to_position(&self, offset: usize) -> Result<Position> {
        self.index.offset_to_position(offset)
    }

    /// See [`PositionIndex::position_to_offset`].
    pub fn position_to_offset(&self, position: Position) -> Result<usize> {
        self.index.position_to_offset(position)
    }

    /// Clamp `position` to the nearest valid position.
    pub fn clamp_position(&self, position: Position) -> Position {
        let line = position.line.min(self.line_count() - 1);
        let len = self.index.line_len(line).unwrap_or(0);
        Position::new(line, position.column.min(len))
    }

    /// Replace `deleted_len` bytes at `offset` with `inserted`.
    ///
    /// On error nothing is modified.
    pub fn replace(
        &mut self,
        offset: usize,
        deleted_len: usize,
        inserted: &[u8],
    ) -> Result<TextDeltaEdit> {
        let len = self.len();
        let end = offset.saturating_add(deleted_len);
        if offset > len || end > len {
            return Err(EngineError::InvalidRange {
                start: offset,
                end,
                len,
            });
        }

        let deleted = self.buffer.slice(offset, end)?.into_owned();
        let span = self.index.apply_edit(offset, deleted_len, inserted)?;
        self.buffer.replace(offset, deleted_len, inserted)?;

        Ok(TextDeltaEdit::new(offset, deleted, inserted.to_vec(), span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_keeps_index_in_sync() {
        let mut doc = Document::new("alpha\nbeta\ngamma");
        let edit = doc.replace(6, 4, b"BE\nTA").unwrap();

        assert_eq!(doc.to_bytes(), b"alpha\nBE\nTA\ngamma");
        assert_eq!(edit.deleted, b"beta");
        assert_eq!(edit.start, Position::new(1, 0));
        assert_eq!(edit.old_end, Position::new(1, 4));
        assert_eq!(edit.new_end, Position::new(2, 2));
        assert_eq!(doc.line_count(), 4);
        assert_eq!(&*doc.line(2).unwrap(), b"TA\n");
        assert_eq!(&*doc.line_content(3).unwrap(), b"gamma");
    }

    #[test]
    fn test_replace_rejects_bad_range() {
        let mut doc = Document::new("abc");
        assert!(doc.replace(2, 2, b"x").is_err());
        assert_eq!(doc.to_bytes(), b"abc");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn test_clamp_position() {
        let doc = Document::new("ab\ncdef");
        assert_eq!(doc.clamp_position(Position::new(0, 9)), Position::new(0, 2));
        assert_eq!(doc.clamp_position(Position::new(7, 1)), Position::new(1, 1));
    }
}
