//! Cursors, selections and coordinated multi-cursor edits.
//!
//! A [`CursorSet`] always holds at least one cursor. Cursors are kept sorted in document order;
//! cursors that land on the same position, or whose selections overlap, are merged and the
//! lowest id survives.
//!
//! [`CursorSet::apply_edit`] runs one edit callback per cursor and applies the resulting
//! replacements in descending offset order, so each cursor's target range is unaffected by the
//! edits of cursors after it in the document.

use crate::delta::TextDeltaEdit;
use crate::document::Document;
use crate::error::{EngineError, Result};
use crate::history::{EditLog, EditOp, RestoredCursor};
use crate::position::{Position, Selection};
use crate::unicode::UnicodeService;
use std::ops::Range;

/// Stable cursor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CursorId(pub u64);

/// A caret with an optional selection anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Identifier.
    pub id: CursorId,
    /// Caret position (the moving end of a selection).
    pub position: Position,
    /// Fixed end of the selection, if any.
    pub anchor: Option<Position>,
    /// Preferred column for vertical motion.
    pub sticky_column: usize,
}

impl Cursor {
    /// A caret without selection.
    pub fn new(id: CursorId, position: Position) -> Self {
        Self {
            id,
            position,
            anchor: None,
            sticky_column: position.column,
        }
    }

    /// The selected span, if it covers any text.
    pub fn selection(&self) -> Option<Selection> {
        self.anchor
            .filter(|anchor| *anchor != self.position)
            .map(|anchor| Selection::from_anchor(anchor, self.position))
    }

    /// Whether the cursor selects any text.
    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    /// `[min, max]` of anchor and caret.
    pub fn range(&self) -> (Position, Position) {
        match self.anchor {
            Some(anchor) if anchor < self.position => (anchor, self.position),
            Some(anchor) => (self.position, anchor),
            None => (self.position, self.position),
        }
    }
}

/// Cursor motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// One grapheme left, wrapping to the end of the previous line.
    Left,
    /// One grapheme right, wrapping to the start of the next line.
    Right,
    /// One line up, keeping the sticky column.
    Up,
    /// One line down, keeping the sticky column.
    Down,
    /// To the start of the previous word.
    WordLeft,
    /// To the end of the next word.
    WordRight,
    /// Column 0.
    LineStart,
    /// End of the line (before the terminator).
    LineEnd,
    /// Start of the document.
    DocumentStart,
    /// End of the document.
    DocumentEnd,
}

/// Replacement produced by one cursor during [`CursorSet::apply_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorEdit {
    /// Pre-edit byte range to replace.
    pub range: Range<usize>,
    /// Replacement bytes.
    pub text: Vec<u8>,
    /// Where the caret ends up, as an offset into `text`.
    pub cursor_after: usize,
}

impl CursorEdit {
    /// Replace `range` with `text`, leaving the caret after the text.
    pub fn replace(range: Range<usize>, text: impl Into<Vec<u8>>) -> Self {
        let text = text.into();
        Self {
            cursor_after: text.len(),
            range,
            text,
        }
    }

    /// Insert `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<Vec<u8>>) -> Self {
        Self::replace(offset..offset, text)
    }

    /// Delete `range`.
    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, Vec::new())
    }
}

/// What the edit callback sees for one cursor.
#[derive(Debug)]
pub struct EditTarget<'a> {
    cursor: &'a Cursor,
    offset: usize,
    selection: Option<Range<usize>>,
    document: &'a Document,
}

impl<'a> EditTarget<'a> {
    /// The cursor being edited.
    pub fn cursor(&self) -> &'a Cursor {
        self.cursor
    }

    /// Caret byte offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Selected byte range, if any.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// The document before any edit of this operation.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Replace the selection with `text`, or insert it at the caret.
    pub fn type_text(&self, text: &[u8]) -> CursorEdit {
        let range = self.selection().unwrap_or(self.offset..self.offset);
        CursorEdit::replace(range, text)
    }
}

/// Ordered, non-empty set of cursors.
#[derive(Debug, Clone)]
pub struct CursorSet {
    cursors: Vec<Cursor>,
    primary: CursorId,
    next_id: u64,
}

impl Default for CursorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorSet {
    /// One caret at the start of the document.
    pub fn new() -> Self {
        Self {
            cursors: vec![Cursor::new(CursorId(0), Position::default())],
            primary: CursorId(0),
            next_id: 1,
        }
    }

    /// Cursors in document order.
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// Number of cursors. Never zero.
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Always `false`; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Cursor by id.
    pub fn get(&self, id: CursorId) -> Option<&Cursor> {
        self.cursors.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: CursorId) -> Result<&mut Cursor> {
        self.cursors
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EngineError::UnknownCursor(id))
    }

    /// The primary cursor.
    pub fn primary(&self) -> &Cursor {
        self.get(self.primary).unwrap_or(&self.cursors[0])
    }

    /// Id of the primary cursor.
    pub fn primary_id(&self) -> CursorId {
        self.primary().id
    }

    /// Add a caret at `position`. Returns the id of the cursor that holds it after merging.
    pub fn add(&mut self, position: Position) -> CursorId {
        let id = CursorId(self.next_id);
        self.next_id += 1;
        self.cursors.push(Cursor::new(id, position));
        self.normalize()
            .into_iter()
            .find(|(removed, _)| *removed == id)
            .map_or(id, |(_, survivor)| survivor)
    }

    /// Remove a cursor. The last remaining cursor is never removed; returns whether it was.
    pub fn remove(&mut self, id: CursorId) -> Result<bool> {
        let index = self
            .cursors
            .iter()
            .position(|c| c.id == id)
            .ok_or(EngineError::UnknownCursor(id))?;
        if self.cursors.len() == 1 {
            return Ok(false);
        }
        self.cursors.remove(index);
        if self.primary == id {
            self.primary = self.cursors[0].id;
        }
        Ok(true)
    }

    /// Keep only the primary cursor.
    pub fn clear_secondary(&mut self) {
        let primary = self.primary().clone();
        self.primary = primary.id;
        self.cursors = vec![primary];
    }

    /// Drop every selection anchor.
    pub fn clear_selections(&mut self) {
        for cursor in &mut self.cursors {
            cursor.anchor = None;
        }
        self.normalize();
    }

    /// Collapse to a single primary caret at `position`.
    pub fn reset(&mut self, position: Position) {
        let id = self.primary_id();
        self.cursors = vec![Cursor::new(id, position)];
        self.primary = id;
    }

    /// Move cursor `id` to `position`. With `extend`, the previous caret becomes the anchor.
    pub fn set_position(&mut self, id: CursorId, position: Position, extend: bool) -> Result<()> {
        let cursor = self.get_mut(id)?;
        place(cursor, position, extend, true);
        self.normalize();
        Ok(())
    }

    /// Select `anchor..head` with cursor `id`.
    pub fn set_selection(&mut self, id: CursorId, anchor: Position, head: Position) -> Result<()> {
        let cursor = self.get_mut(id)?;
        cursor.anchor = (anchor != head).then_some(anchor);
        cursor.position = head;
        cursor.sticky_column = head.column;
        self.normalize();
        Ok(())
    }

    /// Apply `motion` to every cursor.
    pub fn move_all(
        &mut self,
        motion: Motion,
        extend: bool,
        document: &Document,
        unicode: &dyn UnicodeService,
    ) -> Result<()> {
        for cursor in &mut self.cursors {
            move_cursor(cursor, motion, extend, document, unicode)?;
        }
        self.normalize();
        Ok(())
    }

    /// Apply `motion` to one cursor.
    pub fn move_one(
        &mut self,
        id: CursorId,
        motion: Motion,
        extend: bool,
        document: &Document,
        unicode: &dyn UnicodeService,
    ) -> Result<()> {
        let cursor = self.get_mut(id)?;
        move_cursor(cursor, motion, extend, document, unicode)?;
        self.normalize();
        Ok(())
    }

    /// Put cursors where undo/redo left them. Cursors not mentioned keep their place, clamped.
    pub fn restore(&mut self, restored: &[RestoredCursor], document: &Document) {
        for cursor in &mut self.cursors {
            cursor.position = document.clamp_position(cursor.position);
            cursor.anchor = cursor.anchor.map(|a| document.clamp_position(a));
        }
        for item in restored {
            match self.cursors.iter_mut().find(|c| c.id == item.id) {
                Some(cursor) => place(cursor, item.position, false, true),
                None => {
                    self.cursors.push(Cursor::new(item.id, item.position));
                    self.next_id = self.next_id.max(item.id.0 + 1);
                }
            }
        }
        self.normalize();
    }

    /// Clamp every cursor into `document` (used after loading new content).
    pub fn clamp_to(&mut self, document: &Document) {
        self.restore(&[], document);
    }

    /// Run `edit_fn` for every cursor and apply the returned edits atomically.
    ///
    /// Edits are applied from the last cursor in the document to the first. Returned ranges must
    /// not overlap; if any range is invalid nothing is modified. Every applied edit is recorded
    /// in `log`. Returns the document edits in application order.
    pub fn apply_edit<F>(
        &mut self,
        document: &mut Document,
        log: &mut EditLog,
        mut edit_fn: F,
    ) -> Result<Vec<TextDeltaEdit>>
    where
        F: FnMut(&EditTarget<'_>) -> Option<CursorEdit>,
    {
        self.normalize();

        let mut heads = Vec::with_capacity(self.cursors.len());
        let mut anchors = Vec::with_capacity(self.cursors.len());
        for cursor in &self.cursors {
            heads.push(document.position_to_offset(cursor.position)?);
            anchors.push(
                cursor
                    .anchor
                    .map(|anchor| document.position_to_offset(anchor))
                    .transpose()?,
            );
        }

        let mut planned: Vec<(usize, CursorEdit)> = Vec::new();
        for index in (0..self.cursors.len()).rev() {
            let head = heads[index];
            let selection = anchors[index]
                .filter(|anchor| *anchor != head)
                .map(|anchor| anchor.min(head)..anchor.max(head));
            let target = EditTarget {
                cursor: &self.cursors[index],
                offset: head,
                selection,
                document: &*document,
            };
            if let Some(edit) = edit_fn(&target) {
                planned.push((index, edit));
            }
        }

        // Ranges must be valid and strictly descending.
        let len = document.len();
        let mut upper = len;
        for (_, edit) in &planned {
            let Range { start, end } = edit.range;
            if start > end || end > upper {
                return Err(EngineError::InvalidRange { start, end, len });
            }
            upper = start;
        }

        let mut landed: Vec<(usize, usize)> = Vec::with_capacity(planned.len());
        let mut edits = Vec::with_capacity(planned.len());
        for (index, edit) in planned {
            let before = heads[index];
            let after = edit.range.start + edit.cursor_after.min(edit.text.len());

            if edit.range.is_empty() && edit.text.is_empty() {
                landed.push((index, after));
                continue;
            }

            let applied = document.replace(edit.range.start, edit.range.len(), &edit.text)?;
            for head in &mut heads {
                *head = applied.map_offset(*head);
            }
            for anchor in anchors.iter_mut().flatten() {
                *anchor = applied.map_offset(*anchor);
            }
            for (_, offset) in &mut landed {
                *offset = applied.map_offset(*offset);
            }
            landed.push((index, after));

            if let Some(op) = EditOp::from_edit(&applied) {
                log.record(op, self.cursors[index].id, before, after);
            }
            edits.push(applied);
        }

        for (index, offset) in landed {
            heads[index] = offset;
            anchors[index] = None;
            let position = document.offset_to_position(offset)?;
            self.cursors[index].sticky_column = position.column;
        }
        for (index, cursor) in self.cursors.iter_mut().enumerate() {
            cursor.position = document.offset_to_position(heads[index])?;
            cursor.anchor = anchors[index]
                .map(|anchor| document.offset_to_position(anchor))
                .transpose()?;
        }
        self.normalize();

        Ok(edits)
    }

    /// Byte offsets `(head, anchor)` of every cursor, in document order.
    pub(crate) fn offsets(&self, document: &Document) -> Result<Vec<(usize, Option<usize>)>> {
        self.cursors
            .iter()
            .map(|cursor| {
                let head = document.position_to_offset(cursor.position)?;
                let anchor = cursor
                    .anchor
                    .map(|anchor| document.position_to_offset(anchor))
                    .transpose()?;
                Ok((head, anchor))
            })
            .collect()
    }

    /// Move cursors whose pre-edit `offsets` were taken before `edits` were applied.
    pub(crate) fn relocate(
        &mut self,
        offsets: Vec<(usize, Option<usize>)>,
        edits: &[TextDeltaEdit],
        document: &Document,
    ) -> Result<()> {
        let map = |offset: usize| edits.iter().fold(offset, |o, edit| edit.map_offset(o));
        for (cursor, (head, anchor)) in self.cursors.iter_mut().zip(offsets) {
            cursor.position = document.offset_to_position(map(head))?;
            cursor.anchor = anchor
                .map(|anchor| document.offset_to_position(map(anchor)))
                .transpose()?;
            if cursor.anchor == Some(cursor.position) {
                cursor.anchor = None;
            }
        }
        self.normalize();
        Ok(())
    }

    /// Sort and merge. Returns `(removed, survivor)` pairs.
    pub(crate) fn normalize(&mut self) -> Vec<(CursorId, CursorId)> {
        self.cursors
            .sort_by(|a, b| a.range().0.cmp(&b.range().0).then(a.id.cmp(&b.id)));

        let mut merged: Vec<Cursor> = Vec::with_capacity(self.cursors.len());
        let mut removed = Vec::new();
        for cursor in self.cursors.drain(..) {
            let Some(last) = merged.last_mut() else {
                merged.push(cursor);
                continue;
            };

            let (last_min, last_max) = last.range();
            let (min, max) = cursor.range();
            // Half-open: touching selections stay separate, identical carets merge.
            if min < last_max || (min, max) == (last_min, last_max) {
                let (survivor, other) = if cursor.id < last.id {
                    (cursor, last.clone())
                } else {
                    (last.clone(), cursor)
                };
                removed.push((other.id, survivor.id));
                *last = union(survivor, last_min, last_max.max(max));
            } else {
                merged.push(cursor);
            }
        }
        self.cursors = merged;

        for (gone, survivor) in &removed {
            if self.primary == *gone {
                self.primary = *survivor;
            }
        }
        if !removed.is_empty() {
            tracing::debug!(?removed, "merged cursors");
        }
        removed
    }
}

fn union(survivor: Cursor, start: Position, end: Position) -> Cursor {
    if start == end {
        return Cursor {
            position: start,
            anchor: None,
            ..survivor
        };
    }
    let forward = survivor.anchor.is_none_or(|anchor| anchor <= survivor.position);
    let (anchor, position) = if forward { (start, end) } else { (end, start) };
    Cursor {
        position,
        anchor: Some(anchor),
        ..survivor
    }
}

fn place(cursor: &mut Cursor, position: Position, extend: bool, update_sticky: bool) {
    if extend {
        cursor.anchor = cursor.anchor.or(Some(cursor.position));
    } else {
        cursor.anchor = None;
    }
    cursor.position = position;
    if update_sticky {
        cursor.sticky_column = position.column;
    }
    if cursor.anchor == Some(cursor.position) {
        cursor.anchor = None;
    }
}

fn move_cursor(
    cursor: &mut Cursor,
    motion: Motion,
    extend: bool,
    document: &Document,
    unicode: &dyn UnicodeService,
) -> Result<()> {
    let Position { line, column } = cursor.position;
    let last_line = document.line_count() - 1;
    let content = document.line_content(line)?;

    let target = match motion {
        Motion::Left if column > 0 => {
            Position::new(line, unicode.previous_grapheme_boundary(&content, column))
        }
        Motion::Left if line > 0 => Position::new(line - 1, document.line_len(line - 1)?),
        Motion::Right if column < content.len() => {
            Position::new(line, unicode.next_grapheme_boundary(&content, column))
        }
        Motion::Right if line < last_line => Position::new(line + 1, 0),
        Motion::Left | Motion::Right => cursor.position,
        Motion::Up | Motion::Down => {
            let target_line = match motion {
                Motion::Up => line.checked_sub(1),
                _ => (line < last_line).then_some(line + 1),
            };
            let Some(target_line) = target_line else {
                // Vertical motion past the first or last line does nothing.
                return Ok(());
            };
            let target = document.line_content(target_line)?;
            let column = snap_to_grapheme(&target, cursor.sticky_column, unicode);
            place(cursor, Position::new(target_line, column), extend, false);
            return Ok(());
        }
        Motion::WordLeft => match word_left(&content, column, unicode) {
            Some(column) => Position::new(line, column),
            None if line > 0 => Position::new(line - 1, document.line_len(line - 1)?),
            None => cursor.position,
        },
        Motion::WordRight => match word_right(&content, column, unicode) {
            Some(column) => Position::new(line, column),
            None if line < last_line => Position::new(line + 1, 0),
            None => cursor.position,
        },
        Motion::LineStart => Position::new(line, 0),
        Motion::LineEnd => Position::new(line, content.len()),
        Motion::DocumentStart => Position::new(0, 0),
        Motion::DocumentEnd => Position::new(last_line, document.line_len(last_line)?),
    };

    place(cursor, target, extend, true);
    Ok(())
}

fn snap_to_grapheme(line: &[u8], column: usize, unicode: &dyn UnicodeService) -> usize {
    let column = column.min(line.len());
    if unicode.is_grapheme_boundary(line, column) {
        column
    } else {
        unicode.previous_grapheme_boundary(line, column)
    }
}

/// Start of the word before `column`, or `None` at column 0.
fn word_left(line: &[u8], column: usize, unicode: &dyn UnicodeService) -> Option<usize> {
    if column == 0 {
        return None;
    }
    let mut pos = column.min(line.len());
    while pos > 0 {
        let previous = unicode.previous_grapheme_boundary(line, pos);
        if !unicode.is_whitespace(&line[previous..pos]) {
            break;
        }
        pos = previous;
    }
    while pos > 0 {
        pos = unicode.previous_grapheme_boundary(line, pos);
        if unicode.is_word_boundary(line, pos) {
            break;
        }
    }
    Some(pos)
}

/// End of the word after `column`, or `None` at the end of the line.
fn word_right(line: &[u8], column: usize, unicode: &dyn UnicodeService) -> Option<usize> {
    if column >= line.len() {
        return None;
    }
    let mut pos = column;
    while pos < line.len() {
        let next = unicode.next_grapheme_boundary(line, pos);
        if !unicode.is_whitespace(&line[pos..next]) {
            break;
        }
        pos = next;
    }
    while pos < line.len() {
        pos = unicode.next_grapheme_boundary(line, pos);
        if unicode.is_word_boundary(line, pos) {
            break;
        }
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unicode::DefaultUnicode;
    use pretty_assertions::assert_eq;

    fn positions(set: &CursorSet) -> Vec<Position> {
        set.cursors().iter().map(|c| c.position).collect()
    }

    #[test]
    fn test_add_merges_duplicates_keeping_lowest_id() {
        let mut set = CursorSet::new();
        let second = set.add(Position::new(0, 3));
        assert_eq!(second, CursorId(1));

        let duplicate = set.add(Position::new(0, 3));
        assert_eq!(duplicate, CursorId(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_overlapping_selections_merge() {
        let mut set = CursorSet::new();
        set.set_selection(CursorId(0), Position::new(0, 0), Position::new(0, 5))
            .unwrap();
        let other = set.add(Position::new(0, 8));
        set.set_selection(other, Position::new(0, 8), Position::new(0, 3))
            .unwrap();

        assert_eq!(set.len(), 1);
        let cursor = &set.cursors()[0];
        assert_eq!(cursor.id, CursorId(0));
        assert_eq!(cursor.range(), (Position::new(0, 0), Position::new(0, 8)));
        assert_eq!(cursor.position, Position::new(0, 8));
    }

    #[test]
    fn test_touching_selections_stay_separate() {
        let mut set = CursorSet::new();
        set.set_selection(CursorId(0), Position::new(0, 0), Position::new(0, 3))
            .unwrap();
        let other = set.add(Position::new(0, 3));
        set.set_selection(other, Position::new(0, 3), Position::new(0, 6))
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_apply_edit_descending_order() {
        let mut doc = Document::new("aa\nbb\ncc");
        let mut log = EditLog::new(100);
        let mut set = CursorSet::new();
        set.add(Position::new(1, 0));
        set.add(Position::new(2, 0));

        let edits = set
            .apply_edit(&mut doc, &mut log, |target| {
                Some(CursorEdit::insert(target.offset(), b"> ".to_vec()))
            })
            .unwrap();

        assert_eq!(doc.to_bytes(), b"> aa\n> bb\n> cc");
        assert_eq!(edits.iter().map(|e| e.offset).collect::<Vec<_>>(), vec![6, 3, 0]);
        assert_eq!(
            positions(&set),
            vec![Position::new(0, 2), Position::new(1, 2), Position::new(2, 2)]
        );
        assert_eq!(log.entries().len(), 3);
    }

    #[test]
    fn test_apply_edit_rejects_overlap_without_mutation() {
        let mut doc = Document::new("abcdef");
        let mut log = EditLog::new(100);
        let mut set = CursorSet::new();
        set.add(Position::new(0, 4));

        let result = set.apply_edit(&mut doc, &mut log, |_| Some(CursorEdit::delete(1..5)));
        assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
        assert_eq!(doc.to_bytes(), b"abcdef");
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_apply_edit_shifts_idle_cursors() {
        let mut doc = Document::new("one two");
        let mut log = EditLog::new(100);
        let mut set = CursorSet::new();
        let idle = set.add(Position::new(0, 7));

        set.apply_edit(&mut doc, &mut log, |target| {
            (target.cursor().id == CursorId(0)).then(|| CursorEdit::insert(0, b"zero ".to_vec()))
        })
        .unwrap();

        assert_eq!(doc.to_bytes(), b"zero one two");
        assert_eq!(set.get(idle).unwrap().position, Position::new(0, 12));
    }

    #[test]
    fn test_horizontal_motion_by_grapheme() {
        let doc = Document::new("é\nx");
        let mut set = CursorSet::new();
        set.move_all(Motion::Right, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(0, 2)]);

        set.move_all(Motion::Right, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(1, 0)]);

        set.move_all(Motion::Left, false, &doc, &DefaultUnicode).unwrap();
        set.move_all(Motion::Left, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_vertical_motion_keeps_sticky_column() {
        let doc = Document::new("long line\nab\nanother long");
        let mut set = CursorSet::new();
        set.set_position(CursorId(0), Position::new(0, 7), false).unwrap();

        set.move_all(Motion::Down, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(1, 2)]);
        set.move_all(Motion::Down, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(2, 7)]);

        // No-op past the last line.
        set.move_all(Motion::Down, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(2, 7)]);
    }

    #[test]
    fn test_word_motion() {
        let doc = Document::new("hello world");
        let mut set = CursorSet::new();
        set.move_all(Motion::WordRight, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(0, 5)]);
        set.move_all(Motion::WordRight, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(0, 11)]);
        set.move_all(Motion::WordLeft, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(0, 6)]);
        set.move_all(Motion::WordLeft, false, &doc, &DefaultUnicode).unwrap();
        assert_eq!(positions(&set), vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_extend_creates_selection() {
        let doc = Document::new("abc");
        let mut set = CursorSet::new();
        set.move_all(Motion::LineEnd, true, &doc, &DefaultUnicode).unwrap();
        let selection = set.primary().selection().unwrap();
        assert_eq!(selection.start, Position::new(0, 0));
        assert_eq!(selection.end, Position::new(0, 3));
    }
}
