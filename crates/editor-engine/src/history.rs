//! Edit log (undo/redo).
//!
//! A linear log of reversible operations with a pointer separating the undo side from the redo
//! side. Recording truncates everything after the pointer. Entries carry a group id; undo and
//! redo always move a whole group, so the per-cursor edits of one multi-cursor operation are
//! reverted together.

use crate::cursor::CursorId;
use crate::delta::TextDeltaEdit;
use crate::document::Document;
use crate::error::Result;
use crate::position::Position;

/// A reversible operation on the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Bytes inserted at `offset`.
    Insert {
        /// Byte offset.
        offset: usize,
        /// Position of `offset` when the op was applied.
        position: Position,
        /// Inserted bytes.
        text: Vec<u8>,
    },
    /// Bytes removed from `offset`.
    Delete {
        /// Byte offset.
        offset: usize,
        /// Position of `offset` when the op was applied.
        position: Position,
        /// Removed bytes.
        text: Vec<u8>,
    },
    /// Bytes at `offset` replaced by other bytes.
    Replace {
        /// Byte offset.
        offset: usize,
        /// Position of `offset` when the op was applied.
        position: Position,
        /// Bytes that were there before.
        old_text: Vec<u8>,
        /// Bytes that are there after.
        new_text: Vec<u8>,
    },
}

impl EditOp {
    /// The op that performed `edit`, or `None` for an edit that changed nothing.
    pub fn from_edit(edit: &TextDeltaEdit) -> Option<Self> {
        let offset = edit.offset;
        let position = edit.start;
        match (edit.deleted.is_empty(), edit.inserted.is_empty()) {
            (true, true) => None,
            (true, false) => Some(EditOp::Insert {
                offset,
                position,
                text: edit.inserted.clone(),
            }),
            (false, true) => Some(EditOp::Delete {
                offset,
                position,
                text: edit.deleted.clone(),
            }),
            (false, false) => Some(EditOp::Replace {
                offset,
                position,
                old_text: edit.deleted.clone(),
                new_text: edit.inserted.clone(),
            }),
        }
    }

    /// Byte offset the op applies at.
    pub fn offset(&self) -> usize {
        match self {
            EditOp::Insert { offset, .. }
            | EditOp::Delete { offset, .. }
            | EditOp::Replace { offset, .. } => *offset,
        }
    }

    /// Position the op applies at.
    pub fn position(&self) -> Position {
        match self {
            EditOp::Insert { position, .. }
            | EditOp::Delete { position, .. }
            | EditOp::Replace { position, .. } => *position,
        }
    }

    /// Bytes the op removes.
    pub fn deleted(&self) -> &[u8] {
        match self {
            EditOp::Insert { .. } => &[],
            EditOp::Delete { text, .. } => text,
            EditOp::Replace { old_text, .. } => old_text,
        }
    }

    /// Bytes the op inserts.
    pub fn inserted(&self) -> &[u8] {
        match self {
            EditOp::Insert { text, .. } => text,
            EditOp::Delete { .. } => &[],
            EditOp::Replace { new_text, .. } => new_text,
        }
    }

    /// The op that undoes this one.
    pub fn inverse(&self) -> EditOp {
        match self.clone() {
            EditOp::Insert {
                offset,
                position,
                text,
            } => EditOp::Delete {
                offset,
                position,
                text,
            },
            EditOp::Delete {
                offset,
                position,
                text,
            } => EditOp::Insert {
                offset,
                position,
                text,
            },
            EditOp::Replace {
                offset,
                position,
                old_text,
                new_text,
            } => EditOp::Replace {
                offset,
                position,
                old_text: new_text,
                new_text: old_text,
            },
        }
    }

    pub(crate) fn apply(&self, document: &mut Document) -> Result<TextDeltaEdit> {
        document.replace(self.offset(), self.deleted().len(), self.inserted())
    }
}

/// One recorded operation with the cursor that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// The operation.
    pub op: EditOp,
    /// Cursor that performed the operation.
    pub cursor: CursorId,
    /// Cursor byte offset right before the operation.
    pub cursor_before: usize,
    /// Cursor byte offset right after the operation.
    pub cursor_after: usize,
    /// Entries sharing a group are undone and redone together.
    pub group: u64,
}

/// A cursor position produced by undo or redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredCursor {
    /// Cursor id.
    pub id: CursorId,
    /// Restored position.
    pub position: Position,
}

/// Result of [`EditLog::undo`] / [`EditLog::redo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// A group was reverted or re-applied.
    Applied {
        /// Where each affected cursor lands, in document order.
        cursors: Vec<RestoredCursor>,
        /// Document edits performed, in application order.
        edits: Vec<TextDeltaEdit>,
    },
    /// The undo side of the log is empty.
    NothingToUndo,
    /// The redo side of the log is empty.
    NothingToRedo,
}

impl HistoryOutcome {
    /// Whether anything changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, HistoryOutcome::Applied { .. })
    }

    /// Position of the first restored cursor, if anything was applied.
    pub fn cursor(&self) -> Option<Position> {
        match self {
            HistoryOutcome::Applied { cursors, .. } => cursors.first().map(|c| c.position),
            _ => None,
        }
    }
}

/// Linear undo/redo log.
#[derive(Debug, Clone)]
pub struct EditLog {
    entries: Vec<LogEntry>,
    /// Number of entries on the undo side.
    pointer: usize,
    max_entries: usize,
    /// Pointer value at the last save point. `None` once that state is unreachable.
    clean_index: Option<usize>,
    next_group: u64,
    open_group: Option<u64>,
}

impl EditLog {
    /// Create a log keeping at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointer: 0,
            max_entries,
            clean_index: Some(0),
            next_group: 0,
            open_group: None,
        }
    }

    /// All entries, undo side first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries on the undo side.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Whether [`EditLog::undo`] would change anything.
    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    /// Whether [`EditLog::redo`] would change anything.
    pub fn can_redo(&self) -> bool {
        self.pointer < self.entries.len()
    }

    /// Undo steps (groups) available.
    pub fn undo_depth(&self) -> usize {
        count_groups(&self.entries[..self.pointer])
    }

    /// Redo steps (groups) available.
    pub fn redo_depth(&self) -> usize {
        count_groups(&self.entries[self.pointer..])
    }

    /// Whether the log is at the last save point.
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.pointer)
    }

    /// Mark the current state as the save point.
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.pointer);
        self.end_group();
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = 0;
        self.clean_index = Some(0);
        self.open_group = None;
    }

    /// Start a group: entries recorded until [`EditLog::end_group`] undo together.
    pub fn begin_group(&mut self) -> u64 {
        let group = self.allocate_group();
        self.open_group = Some(group);
        group
    }

    /// Close the open group, if any.
    pub fn end_group(&mut self) {
        self.open_group = None;
    }

    /// The open group, if any.
    pub fn current_group(&self) -> Option<u64> {
        self.open_group
    }

    fn allocate_group(&mut self) -> u64 {
        let group = self.next_group;
        self.next_group = self.next_group.wrapping_add(1);
        group
    }

    /// Append an operation, discarding the redo side. Returns the entry's group.
    pub fn record(
        &mut self,
        op: EditOp,
        cursor: CursorId,
        cursor_before: usize,
        cursor_after: usize,
    ) -> u64 {
        self.truncate_redo();

        let group = match self.open_group {
            Some(group) => group,
            None => self.allocate_group(),
        };
        self.entries.push(LogEntry {
            op,
            cursor,
            cursor_before,
            cursor_after,
            group,
        });
        self.pointer += 1;
        self.enforce_capacity();
        group
    }

    fn truncate_redo(&mut self) {
        if self.pointer == self.entries.len() {
            return;
        }
        // The save point becomes unreachable if it was on the redo side.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.pointer
        {
            self.clean_index = None;
        }
        self.entries.truncate(self.pointer);
    }

    /// Drop whole leading groups until the log fits. The newest group is never split, so an
    /// oversized group stays until the next group pushes it out.
    fn enforce_capacity(&mut self) {
        let mut excess = 0;
        while self.entries.len() - excess > self.max_entries {
            let group = self.entries[excess].group;
            let end = excess
                + self.entries[excess..]
                    .iter()
                    .take_while(|entry| entry.group == group)
                    .count();
            if end >= self.pointer {
                break;
            }
            excess = end;
        }
        if excess == 0 {
            return;
        }

        self.entries.drain(..excess);
        self.pointer -= excess;
        self.clean_index = self
            .clean_index
            .and_then(|clean_index| clean_index.checked_sub(excess));
        tracing::trace!(dropped = excess, "edit log at capacity");
    }

    /// Revert the most recent group.
    pub fn undo(&mut self, document: &mut Document) -> Result<HistoryOutcome> {
        let Some(group) = self.pointer.checked_sub(1).map(|i| self.entries[i].group) else {
            return Ok(HistoryOutcome::NothingToUndo);
        };
        self.end_group();

        let mut edits = Vec::new();
        let mut cursors: Vec<(CursorId, usize)> = Vec::new();
        while let Some(index) = self.pointer.checked_sub(1)
            && self.entries[index].group == group
        {
            let entry = &self.entries[index];
            let edit = entry.op.inverse().apply(document)?;
            for (_, offset) in &mut cursors {
                *offset = edit.map_offset(*offset);
            }
            cursors.push((entry.cursor, entry.cursor_before));
            edits.push(edit);
            self.pointer = index;
        }

        tracing::debug!(group, edits = edits.len(), "undo");
        Self::finish(document, cursors, edits)
    }

    /// Re-apply the next undone group.
    pub fn redo(&mut self, document: &mut Document) -> Result<HistoryOutcome> {
        let Some(group) = self.entries.get(self.pointer).map(|entry| entry.group) else {
            return Ok(HistoryOutcome::NothingToRedo);
        };
        self.end_group();

        let mut edits = Vec::new();
        let mut cursors: Vec<(CursorId, usize)> = Vec::new();
        while let Some(entry) = self.entries.get(self.pointer)
            && entry.group == group
        {
            let edit = entry.op.apply(document)?;
            for (_, offset) in &mut cursors {
                *offset = edit.map_offset(*offset);
            }
            cursors.push((entry.cursor, entry.cursor_after));
            edits.push(edit);
            self.pointer += 1;
        }

        tracing::debug!(group, edits = edits.len(), "redo");
        Self::finish(document, cursors, edits)
    }

    fn finish(
        document: &Document,
        cursors: Vec<(CursorId, usize)>,
        edits: Vec<TextDeltaEdit>,
    ) -> Result<HistoryOutcome> {
        // A cursor touched by several entries ends where its last processed entry puts it.
        let mut restored: Vec<RestoredCursor> = Vec::with_capacity(cursors.len());
        for (id, offset) in cursors.into_iter().rev() {
            if restored.iter().any(|c| c.id == id) {
                continue;
            }
            restored.push(RestoredCursor {
                id,
                position: document.offset_to_position(offset)?,
            });
        }
        restored.sort_by_key(|c| (c.position, c.id));

        Ok(HistoryOutcome::Applied {
            cursors: restored,
            edits,
        })
    }
}

fn count_groups(entries: &[LogEntry]) -> usize {
    entries.chunk_by(|a, b| a.group == b.group).count()
}
