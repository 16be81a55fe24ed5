//! The engine facade.
//!
//! [`EditorEngine`] owns the document, cursors, edit log and overlays, and is the only way to
//! mutate them. Every successful mutation bumps [`EditorEngine::version`], records a
//! [`TextDelta`] and repositions folds and diagnostics; search results are recomputed on demand.

use crate::config::EngineConfig;
use crate::cursor::{Cursor, CursorEdit, CursorId, CursorSet, EditTarget, Motion};
use crate::delta::{TextDelta, TextDeltaEdit};
use crate::diagnostics::{DiagnosticEntry, DiagnosticMarker, DiagnosticOverlay, MarkerId};
use crate::document::Document;
use crate::error::{EngineError, Result};
use crate::folding::{FoldRegion, FoldTable, VisibleLines};
use crate::highlight::SyntaxHighlighter;
use crate::history::{EditLog, EditOp, HistoryOutcome};
use crate::position::Position;
use crate::search::{Matches, SearchEngine, SearchMatch, SearchOptions};
use crate::snapshot::{FoldMarker, ViewRow, ViewSnapshot};
use crate::unicode::{DefaultUnicode, UnicodeService};
use std::borrow::Cow;
use std::fmt;

/// In-memory text editing engine.
///
/// # Example
///
/// ```rust
/// use editor_engine::{EditorEngine, Position};
///
/// let mut engine = EditorEngine::from_bytes("hello\nworld");
/// engine.add_cursor(Position::new(1, 0)).unwrap();
/// engine.insert_text(b"> ").unwrap();
/// assert_eq!(engine.to_bytes(), b"> hello\n> world");
///
/// engine.undo().unwrap();
/// assert_eq!(engine.to_bytes(), b"hello\nworld");
/// ```
pub struct EditorEngine {
    document: Document,
    cursors: CursorSet,
    log: EditLog,
    folds: FoldTable,
    diagnostics: DiagnosticOverlay,
    search: SearchEngine,
    unicode: Box<dyn UnicodeService + Send + Sync>,
    config: EngineConfig,
    version: u64,
    last_delta: Option<TextDelta>,
}

impl fmt::Debug for EditorEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorEngine")
            .field("len", &self.document.len())
            .field("line_count", &self.document.line_count())
            .field("cursors", &self.cursors)
            .field("version", &self.version)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for EditorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorEngine {
    /// An empty document with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// An empty document with `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut document = Document::default();
        document.set_gc_threshold(config.gc_threshold);
        Self {
            document,
            cursors: CursorSet::new(),
            log: EditLog::new(config.max_undo_entries),
            folds: FoldTable::new(),
            diagnostics: DiagnosticOverlay::new(config.reanchor_policy),
            search: SearchEngine::new(),
            unicode: Box::new(DefaultUnicode),
            config,
            version: 0,
            last_delta: None,
        }
    }

    /// A document holding `bytes`, with the default configuration.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let mut engine = Self::new();
        engine.load_from_bytes(bytes);
        engine
    }

    /// Replace the segmentation service.
    pub fn with_unicode(mut self, unicode: impl UnicodeService + Send + Sync + 'static) -> Self {
        self.unicode = Box::new(unicode);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The segmentation service in use.
    pub fn unicode(&self) -> &dyn UnicodeService {
        self.unicode.as_ref()
    }

    // ---------------------------------------------------------------------
    // Buffer
    // ---------------------------------------------------------------------

    /// Replace the whole document. History, folds, diagnostics and extra cursors are dropped.
    pub fn load_from_bytes(&mut self, bytes: impl Into<Vec<u8>>) {
        let mut document = Document::new(bytes);
        document.set_gc_threshold(self.config.gc_threshold);
        self.document = document;
        self.cursors.reset(Position::default());
        self.log.clear();
        self.folds.clear();
        self.diagnostics.clear();
        self.search.invalidate();
        self.version += 1;
        self.last_delta = None;
        tracing::debug!(
            len = self.document.len(),
            lines = self.document.line_count(),
            "document loaded"
        );
    }

    /// The whole document.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.document.to_bytes()
    }

    /// Read-only access to the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Total byte length.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.document.line_count()
    }

    /// Line `line`, terminator included.
    pub fn get_line(&self, line: usize) -> Result<Cow<'_, [u8]>> {
        self.document.line(line)
    }

    /// Line `line` without its terminator.
    pub fn line_content(&self, line: usize) -> Result<Cow<'_, [u8]>> {
        self.document.line_content(line)
    }

    /// Bytes in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>> {
        self.document.slice(start, end)
    }

    /// Position of byte `offset`.
    pub fn offset_to_position(&self, offset: usize) -> Result<Position> {
        self.document.offset_to_position(offset)
    }

    /// Byte offset of `position`.
    pub fn position_to_offset(&self, position: Position) -> Result<usize> {
        self.document.position_to_offset(position)
    }

    /// Insert `bytes` at `offset`. Cursors after the insertion shift.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) -> Result<TextDelta> {
        let len = self.document.len();
        if offset > len {
            return Err(EngineError::InvalidOffset { offset, len });
        }
        self.replace(offset, 0, bytes)
    }

    /// Delete `len` bytes at `offset`.
    pub fn delete(&mut self, offset: usize, len: usize) -> Result<TextDelta> {
        self.replace(offset, len, &[])
    }

    /// Replace `len` bytes at `offset` with `bytes`, as one undoable step.
    pub fn replace(&mut self, offset: usize, len: usize, bytes: &[u8]) -> Result<TextDelta> {
        self.edit_ranges(vec![(offset, len)], bytes)
    }

    /// Apply raw replacements (descending, non-overlapping) as one group.
    fn edit_ranges(&mut self, ranges: Vec<(usize, usize)>, bytes: &[u8]) -> Result<TextDelta> {
        let before_len = self.document.len();
        let mut upper = before_len;
        for &(start, len) in &ranges {
            let end = start.saturating_add(len);
            if start > end || end > upper {
                return Err(EngineError::InvalidRange {
                    start,
                    end,
                    len: before_len,
                });
            }
            upper = start;
        }

        let offsets = self.cursors.offsets(&self.document)?;
        let primary = self.cursors.primary_id();
        let mut primary_offset = self.document.position_to_offset(self.cursors.primary().position)?;

        self.log.end_group();
        let group = self.log.begin_group();
        let mut edits = Vec::with_capacity(ranges.len());
        for (start, len) in ranges {
            if len == 0 && bytes.is_empty() {
                continue;
            }
            let edit = self.document.replace(start, len, bytes)?;
            let before = primary_offset;
            primary_offset = edit.map_offset(primary_offset);
            if let Some(op) = EditOp::from_edit(&edit) {
                self.log.record(op, primary, before, primary_offset);
            }
            edits.push(edit);
        }
        self.log.end_group();

        self.cursors.relocate(offsets, &edits, &self.document)?;
        let group = (!edits.is_empty()).then_some(group);
        Ok(self.commit(before_len, edits, group))
    }

    // ---------------------------------------------------------------------
    // Cursors
    // ---------------------------------------------------------------------

    /// All cursors in document order.
    pub fn cursors(&self) -> &[Cursor] {
        self.cursors.cursors()
    }

    /// The primary cursor.
    pub fn primary_cursor(&self) -> &Cursor {
        self.cursors.primary()
    }

    /// Cursor by id.
    pub fn cursor(&self, id: CursorId) -> Option<&Cursor> {
        self.cursors.get(id)
    }

    /// Add a caret at `position`. Returns the id holding that position after merging.
    pub fn add_cursor(&mut self, position: Position) -> Result<CursorId> {
        self.check_position(position)?;
        let id = self.cursors.add(position);
        tracing::trace!(?id, ?position, "cursor added");
        Ok(id)
    }

    /// Remove a cursor. The last cursor is kept; returns whether anything was removed.
    pub fn remove_cursor(&mut self, id: CursorId) -> Result<bool> {
        self.cursors.remove(id)
    }

    /// Keep only the primary cursor.
    pub fn clear_secondary_cursors(&mut self) {
        self.cursors.clear_secondary();
    }

    /// Drop every selection anchor, keeping the carets.
    pub fn clear_selections(&mut self) {
        self.cursors.clear_selections();
    }

    /// Move cursor `id` to `position`, optionally extending its selection.
    pub fn set_cursor(&mut self, id: CursorId, position: Position, extend: bool) -> Result<()> {
        self.check_position(position)?;
        self.cursors.set_position(id, position, extend)
    }

    /// Select `anchor..head` with cursor `id`.
    pub fn set_selection(&mut self, id: CursorId, anchor: Position, head: Position) -> Result<()> {
        self.check_position(anchor)?;
        self.check_position(head)?;
        self.cursors.set_selection(id, anchor, head)
    }

    /// Apply `motion` to every cursor.
    pub fn move_cursors(&mut self, motion: Motion, extend: bool) -> Result<()> {
        self.cursors
            .move_all(motion, extend, &self.document, self.unicode.as_ref())
    }

    /// Apply `motion` to one cursor.
    pub fn move_cursor(&mut self, id: CursorId, motion: Motion, extend: bool) -> Result<()> {
        self.cursors
            .move_one(id, motion, extend, &self.document, self.unicode.as_ref())
    }

    /// Positions given to cursors must exist and sit on a grapheme boundary.
    fn check_position(&self, position: Position) -> Result<()> {
        let valid = self
            .document
            .line_content(position.line)
            .is_ok_and(|content| {
                position.column <= content.len()
                    && self.unicode.is_grapheme_boundary(&content, position.column)
            });
        if !valid {
            return Err(EngineError::InvalidPosition {
                line: position.line,
                column: position.column,
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Multi-cursor editing
    // ---------------------------------------------------------------------

    /// Run `edit_fn` once per cursor and apply the edits it returns.
    ///
    /// Edits are applied in descending offset order, so every callback sees pre-edit offsets.
    /// With [`EngineConfig::group_multi_cursor_edits`] the whole operation undoes as one step.
    pub fn apply_edit<F>(&mut self, mut edit_fn: F) -> Result<TextDelta>
    where
        F: FnMut(&EditTarget<'_>) -> Option<CursorEdit>,
    {
        self.edit_at_cursors(|target, _| edit_fn(target))
    }

    /// Type `text` at every cursor, replacing selections.
    pub fn insert_text(&mut self, text: &[u8]) -> Result<TextDelta> {
        self.edit_at_cursors(|target, _| Some(target.type_text(text)))
    }

    /// Delete the selection, or the grapheme (or line break) before each caret.
    pub fn backspace(&mut self) -> Result<TextDelta> {
        self.edit_at_cursors(|target, unicode| {
            if let Some(selection) = target.selection() {
                return Some(CursorEdit::delete(selection));
            }
            let offset = target.offset();
            let Position { line, column } = target.cursor().position;
            if column == 0 {
                return (line > 0).then(|| CursorEdit::delete(offset - 1..offset));
            }
            let content = target.document().line_content(line).ok()?;
            let previous = unicode.previous_grapheme_boundary(&content, column);
            Some(CursorEdit::delete(offset - (column - previous)..offset))
        })
    }

    /// Delete the selection, or the grapheme (or line break) after each caret.
    pub fn delete_forward(&mut self) -> Result<TextDelta> {
        self.edit_at_cursors(|target, unicode| {
            if let Some(selection) = target.selection() {
                return Some(CursorEdit::delete(selection));
            }
            let offset = target.offset();
            let Position { line, column } = target.cursor().position;
            let content = target.document().line_content(line).ok()?;
            if column < content.len() {
                let next = unicode.next_grapheme_boundary(&content, column);
                return Some(CursorEdit::delete(offset..offset + (next - column)));
            }
            let has_terminator = line + 1 < target.document().line_count();
            has_terminator.then(|| CursorEdit::delete(offset..offset + 1))
        })
    }

    /// Shared path of every per-cursor edit: open the group, edit, close it, commit.
    fn edit_at_cursors<F>(&mut self, mut edit_fn: F) -> Result<TextDelta>
    where
        F: FnMut(&EditTarget<'_>, &dyn UnicodeService) -> Option<CursorEdit>,
    {
        let before_len = self.document.len();
        let unicode = self.unicode.as_ref();

        self.log.end_group();
        if self.config.group_multi_cursor_edits {
            self.log.begin_group();
        }
        let result = self
            .cursors
            .apply_edit(&mut self.document, &mut self.log, |target| {
                edit_fn(target, unicode)
            });
        let group = self.log.current_group();
        self.log.end_group();

        let edits = result?;
        let group = group.or_else(|| self.latest_group(&edits));
        Ok(self.commit(before_len, edits, group))
    }

    fn latest_group(&self, edits: &[TextDeltaEdit]) -> Option<u64> {
        if edits.is_empty() {
            return None;
        }
        let index = self.log.pointer().checked_sub(1)?;
        self.log.entries().get(index).map(|entry| entry.group)
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Revert the most recent edit group.
    pub fn undo(&mut self) -> Result<HistoryOutcome> {
        let before_len = self.document.len();
        let offsets = self.cursors.offsets(&self.document)?;
        let outcome = self.log.undo(&mut self.document)?;
        self.finish_history(before_len, offsets, &outcome)?;
        Ok(outcome)
    }

    /// Re-apply the most recently undone edit group.
    pub fn redo(&mut self) -> Result<HistoryOutcome> {
        let before_len = self.document.len();
        let offsets = self.cursors.offsets(&self.document)?;
        let outcome = self.log.redo(&mut self.document)?;
        self.finish_history(before_len, offsets, &outcome)?;
        Ok(outcome)
    }

    /// Cursors outside the replayed group follow its edits; the group's own cursors go back to
    /// where the log recorded them.
    fn finish_history(
        &mut self,
        before_len: usize,
        offsets: Vec<(usize, Option<usize>)>,
        outcome: &HistoryOutcome,
    ) -> Result<()> {
        let HistoryOutcome::Applied { cursors, edits } = outcome else {
            return Ok(());
        };
        self.cursors.relocate(offsets, edits, &self.document)?;
        self.cursors.restore(cursors, &self.document);
        self.commit(before_len, edits.clone(), None);
        Ok(())
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Whether the document is at the last save point.
    pub fn is_clean(&self) -> bool {
        self.log.is_clean()
    }

    /// Mark the current state as saved.
    pub fn mark_clean(&mut self) {
        self.log.mark_clean();
    }

    /// The edit log.
    pub fn edit_log(&self) -> &EditLog {
        &self.log
    }

    // ---------------------------------------------------------------------
    // Folding
    // ---------------------------------------------------------------------

    /// Add an expanded fold over `start_line..=end_line`.
    pub fn add_fold(&mut self, start_line: usize, end_line: usize) -> Result<()> {
        self.add_fold_region(FoldRegion::new(start_line, end_line))
    }

    /// Add a fold region as given (it may already be collapsed).
    pub fn add_fold_region(&mut self, region: FoldRegion) -> Result<()> {
        self.folds.add_fold(region, self.document.line_count())
    }

    /// Remove the fold starting at `start_line`.
    pub fn remove_fold(&mut self, start_line: usize) -> Option<FoldRegion> {
        self.folds.remove_fold(start_line)
    }

    /// Collapse or expand the fold starting at `start_line`. Returns the new collapsed state.
    pub fn toggle_fold(&mut self, start_line: usize) -> Result<bool> {
        self.folds.toggle(start_line)
    }

    /// Toggle the fold containing `line`, if any.
    pub fn toggle_fold_at(&mut self, line: usize) -> Option<bool> {
        self.folds.toggle_at(line)
    }

    /// Expand all folds
    pub fn expand_all_folds(&mut self) {
        self.folds.expand_all();
    }

    /// Collapse all folds
    pub fn collapse_all_folds(&mut self) {
        self.folds.collapse_all();
    }

    /// The fold table.
    pub fn folds(&self) -> &FoldTable {
        &self.folds
    }

    /// Lazily iterate the visible logical lines.
    pub fn visible_lines(&self) -> VisibleLines<'_> {
        self.folds.visible_lines(self.document.line_count())
    }

    /// Number of visible lines.
    pub fn visible_line_count(&self) -> usize {
        self.folds.visible_line_count(self.document.line_count())
    }

    /// Visual row of `line`, or `None` when folded away.
    pub fn logical_to_visual(&self, line: usize) -> Option<usize> {
        (line < self.document.line_count())
            .then(|| self.folds.logical_to_visual(line))
            .flatten()
    }

    /// Logical line at visual `row`.
    pub fn visual_to_logical(&self, row: usize) -> Option<usize> {
        self.folds
            .visual_to_logical(row)
            .filter(|line| *line < self.document.line_count())
    }

    // ---------------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------------

    /// Attach a diagnostic marker.
    pub fn add_diagnostic(&mut self, marker: DiagnosticMarker) -> Result<MarkerId> {
        self.document.position_to_offset(marker.position())?;
        Ok(self.diagnostics.add(marker))
    }

    /// Remove a diagnostic marker.
    pub fn remove_diagnostic(&mut self, id: MarkerId) -> Result<DiagnosticMarker> {
        self.diagnostics.remove(id)
    }

    /// Replace every diagnostic. Nothing changes if any marker is out of bounds.
    pub fn set_diagnostics(&mut self, markers: Vec<DiagnosticMarker>) -> Result<Vec<MarkerId>> {
        for marker in &markers {
            self.document.position_to_offset(marker.position())?;
        }
        Ok(self.diagnostics.replace_all(markers))
    }

    /// Remove every diagnostic.
    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    /// The diagnostic overlay.
    pub fn diagnostics(&self) -> &DiagnosticOverlay {
        &self.diagnostics
    }

    /// Diagnostics on `line`.
    pub fn diagnostics_for_line(&self, line: usize) -> &[DiagnosticEntry] {
        self.diagnostics.markers_for_line(line)
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// Set the search query and iterate its matches lazily.
    pub fn search(&mut self, pattern: &str, options: SearchOptions) -> Result<Matches<'_>> {
        self.search.set_query(pattern, options)?;
        Ok(self.search.matches(&self.document))
    }

    /// Matches of the active query.
    pub fn search_matches(&self) -> Matches<'_> {
        self.search.matches(&self.document)
    }

    /// Number of matches of the active query.
    pub fn match_count(&mut self) -> Result<usize> {
        self.search.match_count(&self.document)
    }

    /// Drop the active query.
    pub fn clear_search(&mut self) {
        self.search.clear_query();
    }

    /// Select the next match after the primary cursor, wrapping around.
    pub fn find_next(&mut self) -> Result<Option<SearchMatch>> {
        let from = self.cursors.primary().range().0;
        let found = self.search.next_match(&self.document, from)?;
        self.select_match(found)
    }

    /// Select the previous match before the primary cursor, wrapping around.
    pub fn find_previous(&mut self) -> Result<Option<SearchMatch>> {
        let from = self.cursors.primary().range().0;
        let found = self.search.previous_match(&self.document, from)?;
        self.select_match(found)
    }

    fn select_match(&mut self, found: Option<SearchMatch>) -> Result<Option<SearchMatch>> {
        if let Some(m) = found {
            let primary = self.cursors.primary_id();
            self.cursors
                .set_selection(primary, m.start_position(), m.end_position())?;
        }
        Ok(found)
    }

    /// The match last selected by [`EditorEngine::find_next`] / [`EditorEngine::find_previous`].
    pub fn current_match(&self) -> Option<SearchMatch> {
        self.search.current()
    }

    /// Replace every match of `pattern` with `replacement`, as one undoable step.
    ///
    /// The pattern becomes the active query. Returns the number of replacements.
    pub fn replace_all(
        &mut self,
        pattern: &str,
        options: SearchOptions,
        replacement: &[u8],
    ) -> Result<usize> {
        self.search.set_query(pattern, options)?;
        let mut ranges = Vec::new();
        for m in self.search.matches(&self.document) {
            let start = self.document.position_to_offset(m.start_position())?;
            ranges.push((start, m.len()));
        }
        if ranges.is_empty() {
            return Ok(0);
        }

        let count = ranges.len();
        ranges.reverse();
        self.edit_ranges(ranges, replacement)?;
        tracing::debug!(count, "replaced all matches");
        Ok(count)
    }

    // ---------------------------------------------------------------------
    // Change tracking
    // ---------------------------------------------------------------------

    /// Monotonic counter bumped by every document mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The delta produced by the most recent mutation.
    pub fn last_delta(&self) -> Option<&TextDelta> {
        self.last_delta.as_ref()
    }

    /// Take the delta produced by the most recent mutation.
    pub fn take_last_delta(&mut self) -> Option<TextDelta> {
        self.last_delta.take()
    }

    fn commit(
        &mut self,
        before_len: usize,
        edits: Vec<TextDeltaEdit>,
        group: Option<u64>,
    ) -> TextDelta {
        let delta = TextDelta {
            before_len,
            after_len: self.document.len(),
            edits,
            undo_group_id: group,
        };
        if delta.is_empty() {
            return delta;
        }

        for edit in &delta.edits {
            self.folds.apply_edit(edit);
            self.diagnostics.apply_edit(edit);
        }
        self.search.invalidate();
        self.version += 1;
        tracing::debug!(
            version = self.version,
            edits = delta.edits.len(),
            before_len,
            after_len = delta.after_len,
            "document changed"
        );
        self.last_delta = Some(delta.clone());
        delta
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// Snapshot `row_count` visible rows starting at visual row `first_row`.
    pub fn snapshot(
        &self,
        first_row: usize,
        row_count: usize,
        highlighter: Option<&dyn SyntaxHighlighter>,
    ) -> Result<ViewSnapshot> {
        let line_count = self.document.line_count();
        let mut rows = Vec::with_capacity(row_count.min(line_count));

        for (i, line) in self
            .folds
            .visible_lines_from(first_row, line_count)
            .take(row_count)
            .enumerate()
        {
            let text = self.document.line_content(line)?.into_owned();
            let fold = self
                .folds
                .region_at(line)
                .filter(|region| region.start_line == line)
                .map(|region| FoldMarker {
                    end_line: region.end_line,
                    is_collapsed: region.is_collapsed,
                    placeholder: region.placeholder.clone(),
                });
            let spans = highlighter
                .map(|h| h.highlight_line(&text))
                .unwrap_or_default();
            let diagnostics = self
                .diagnostics
                .markers_for_line(line)
                .iter()
                .map(|entry| entry.marker.clone())
                .collect();
            let carets = self
                .cursors
                .cursors()
                .iter()
                .filter(|c| c.position.line == line)
                .map(|c| c.position.column)
                .collect();

            rows.push(ViewRow {
                row: first_row + i,
                line,
                text,
                fold,
                spans,
                diagnostics,
                carets,
            });
        }

        Ok(ViewSnapshot {
            version: self.version,
            first_row,
            total_rows: self.folds.visible_line_count(line_count),
            rows,
        })
    }
}
