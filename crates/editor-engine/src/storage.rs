//! Byte storage layer.
//!
//! A piece table over opaque bytes. The original bytes are never modified; inserted bytes are
//! appended to an add buffer. The document is the in-order concatenation of the pieces, which
//! live in a byte-weighted balanced tree so that locating, splitting and splicing pieces is
//! O(log n) in the number of pieces.

use crate::error::{EngineError, Result};
use crate::tree::{WeightTree, Weighted};
use std::borrow::Cow;

/// Buffer type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    /// Read-only original buffer
    Original,
    /// Append-only add buffer
    Add,
}

/// Piece structure: references a fragment in a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// Buffer type
    pub buffer_type: BufferType,
    /// Start position in the corresponding buffer (byte offset)
    pub start: usize,
    /// Byte length of the fragment
    pub len: usize,
}

impl Piece {
    /// Create a new Piece
    pub fn new(buffer_type: BufferType, start: usize, len: usize) -> Self {
        Self {
            buffer_type,
            start,
            len,
        }
    }

    fn end(&self) -> usize {
        self.start + self.len
    }

    /// Keep `[from, to)` of this piece (offsets relative to the piece).
    fn sub(&self, from: usize, to: usize) -> Piece {
        Piece::new(self.buffer_type, self.start + from, to - from)
    }

    /// Only add-buffer pieces that are contiguous in the add buffer are merged.
    fn can_append(&self, buffer_type: BufferType, start: usize) -> bool {
        self.buffer_type == BufferType::Add && buffer_type == BufferType::Add && self.end() == start
    }
}

impl Weighted for Piece {
    fn weight(&self) -> usize {
        self.len
    }
}

/// Piece Table - main storage structure
#[derive(Debug, Clone)]
pub struct PieceTable {
    /// Read-only original buffer
    original_buffer: Vec<u8>,
    /// Append-only add buffer
    add_buffer: Vec<u8>,
    pieces: WeightTree<Piece>,
    /// Operation counter (for triggering GC)
    operation_count: usize,
    /// GC threshold (compact the add buffer after every N operations)
    gc_threshold: usize,
}

impl PieceTable {
    /// Default number of mutations between add-buffer compactions.
    pub const DEFAULT_GC_THRESHOLD: usize = 1000;

    /// Create a piece table holding `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let original_buffer = bytes.into();
        let pieces = if original_buffer.is_empty() {
            WeightTree::new()
        } else {
            WeightTree::from_items([Piece::new(
                BufferType::Original,
                0,
                original_buffer.len(),
            )])
        };

        Self {
            original_buffer,
            add_buffer: Vec::new(),
            pieces,
            operation_count: 0,
            gc_threshold: Self::DEFAULT_GC_THRESHOLD,
        }
    }

    /// Create an empty Piece Table
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Total byte length.
    pub fn len(&self) -> usize {
        self.pieces.total_weight()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Number of pieces currently describing the document.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Size of the add buffer in bytes, including unreferenced data awaiting GC.
    pub fn add_buffer_size(&self) -> usize {
        self.add_buffer.len()
    }

    /// Insert `bytes` at `offset`.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let len = self.len();
        if offset > len {
            return Err(EngineError::InvalidOffset { offset, len });
        }
        if bytes.is_empty() {
            return Ok(());
        }

        let add_start = self.add_buffer.len();
        self.add_buffer.extend_from_slice(bytes);
        let new_piece = Piece::new(BufferType::Add, add_start, bytes.len());

        match self.pieces.locate(offset) {
            Some((index, piece_start)) if offset > piece_start => {
                // Split the piece around the insertion point.
                let Some(&piece) = self.pieces.get(index) else {
                    unreachable!("located piece {index} must exist");
                };
                let within = offset - piece_start;
                let left = piece.sub(0, within);
                let right = piece.sub(within, piece.len);
                self.pieces.splice(index..index + 1, [left, new_piece, right]);
            }
            located => {
                // Insertion at a piece boundary (or at the end).
                let index = located.map_or(self.pieces.len(), |(index, _)| index);
                self.insert_at_boundary(index, new_piece);
            }
        }

        self.check_gc();
        Ok(())
    }

    fn insert_at_boundary(&mut self, index: usize, new_piece: Piece) {
        if let Some(previous_index) = index.checked_sub(1)
            && let Some(&previous) = self.pieces.get(previous_index)
            && previous.can_append(new_piece.buffer_type, new_piece.start)
        {
            let merged = Piece::new(previous.buffer_type, previous.start, previous.len + new_piece.len);
            self.pieces.splice(previous_index..index, [merged]);
            return;
        }
        self.pieces.insert(index, new_piece);
    }

    /// Delete `len` bytes starting at `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<()> {
        let total = self.len();
        let end = offset.saturating_add(len);
        if offset > total || end > total {
            return Err(EngineError::InvalidRange {
                start: offset,
                end,
                len: total,
            });
        }
        if len == 0 {
            return Ok(());
        }

        let (Some((first, first_start)), Some((last, last_start))) =
            (self.pieces.locate(offset), self.pieces.locate(end - 1))
        else {
            unreachable!("range {offset}..{end} was validated against length {total}");
        };

        let mut kept = Vec::with_capacity(2);
        if let Some(&piece) = self.pieces.get(first)
            && offset > first_start
        {
            kept.push(piece.sub(0, offset - first_start));
        }
        if let Some(&piece) = self.pieces.get(last) {
            let within = end - last_start;
            if within < piece.len {
                kept.push(piece.sub(within, piece.len));
            }
        }
        self.pieces.splice(first..last + 1, kept);

        self.check_gc();
        Ok(())
    }

    /// Replace `len` bytes at `offset` with `bytes`.
    pub fn replace(&mut self, offset: usize, len: usize, bytes: &[u8]) -> Result<()> {
        self.check_range(offset, offset.saturating_add(len))?;
        self.delete(offset, len)?;
        self.insert(offset, bytes)
    }

    /// Bytes in `[start, end)`.
    ///
    /// Borrows directly from a buffer when the range lies inside a single piece.
    pub fn slice(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(Cow::Borrowed(&[]));
        }

        let Some((index, piece_start)) = self.pieces.locate(start) else {
            unreachable!("range {start}..{end} was validated");
        };

        let mut skip = start - piece_start;
        let mut remaining = end - start;
        let mut pieces = self.pieces.iter_from(index);

        if let Some(piece) = pieces.next() {
            let available = piece.len - skip;
            if remaining <= available {
                let bytes = self.piece_bytes(piece);
                return Ok(Cow::Borrowed(&bytes[skip..skip + remaining]));
            }

            let mut out = Vec::with_capacity(remaining);
            out.extend_from_slice(&self.piece_bytes(piece)[skip..]);
            remaining -= available;
            skip = 0;

            for piece in pieces {
                let take = remaining.min(piece.len);
                out.extend_from_slice(&self.piece_bytes(piece)[skip..take]);
                remaining -= take;
                if remaining == 0 {
                    break;
                }
            }
            return Ok(Cow::Owned(out));
        }

        Ok(Cow::Borrowed(&[]))
    }

    /// Byte at `offset`, if any.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        let (index, piece_start) = self.pieces.locate(offset)?;
        let piece = self.pieces.get(index)?;
        self.piece_bytes(piece).get(offset - piece_start).copied()
    }

    /// The whole document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for piece in self.pieces.iter() {
            out.extend_from_slice(self.piece_bytes(piece));
        }
        out
    }

    /// Iterate over the document as a sequence of borrowed chunks.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.pieces.iter().map(|piece| self.piece_bytes(piece))
    }

    fn piece_bytes(&self, piece: &Piece) -> &[u8] {
        let buffer = match piece.buffer_type {
            BufferType::Original => &self.original_buffer,
            BufferType::Add => &self.add_buffer,
        };
        &buffer[piece.start..piece.end()]
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        let len = self.len();
        if start > end || end > len {
            return Err(EngineError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    /// Garbage collection: compact the add buffer, dropping bytes no piece references.
    pub fn gc(&mut self) {
        let mut pieces: Vec<Piece> = self.pieces.iter().copied().collect();

        let mut referenced: Vec<(usize, usize)> = pieces
            .iter()
            .filter(|p| p.buffer_type == BufferType::Add)
            .map(|p| (p.start, p.end()))
            .collect();

        self.operation_count = 0;
        if referenced.is_empty() {
            self.add_buffer.clear();
            return;
        }

        referenced.sort_unstable_by_key(|range| range.0);

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(referenced.len());
        for (start, end) in referenced {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        // (old_start, old_end, new_start)
        let mut compacted = Vec::new();
        let mut mappings = Vec::with_capacity(merged.len());
        for (old_start, old_end) in merged {
            mappings.push((old_start, old_end, compacted.len()));
            compacted.extend_from_slice(&self.add_buffer[old_start..old_end]);
        }

        for piece in pieces.iter_mut().filter(|p| p.buffer_type == BufferType::Add) {
            let idx = match mappings.binary_search_by_key(&piece.start, |(s, _, _)| *s) {
                Ok(exact) => exact,
                Err(insert_pos) => insert_pos.saturating_sub(1),
            };
            if let Some((old_start, old_end, new_start)) = mappings.get(idx).copied()
                && piece.start < old_end
            {
                piece.start = new_start + (piece.start - old_start);
            }
        }

        tracing::trace!(
            before = self.add_buffer.len(),
            after = compacted.len(),
            "compacted add buffer"
        );
        self.add_buffer = compacted;
        self.pieces.rebuild(pieces);
    }

    fn check_gc(&mut self) {
        self.operation_count = self.operation_count.saturating_add(1);
        if self.gc_threshold > 0 && self.operation_count >= self.gc_threshold {
            self.gc();
        }
    }

    /// Set GC threshold. `0` disables automatic compaction; [`PieceTable::gc`] still works.
    pub fn set_gc_threshold(&mut self, threshold: usize) {
        self.gc_threshold = threshold;
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::empty()
    }
}
