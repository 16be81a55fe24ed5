//! Message-style command interface.
//!
//! Front-ends that drive the engine by messages (key bindings, scripting, remote protocols) can
//! build a [`Command`] and hand it to [`EditorEngine::execute`]. Every command maps onto one
//! method of [`EditorEngine`]; the result is returned as a [`CommandResult`].
//!
//! # Example
//!
//! ```rust
//! use editor_engine::{Command, CommandResult, EditCommand, EditorEngine};
//!
//! let mut engine = EditorEngine::from_bytes("Hello\nWorld\n");
//! engine
//!     .execute(Command::Edit(EditCommand::InsertText { text: b"X".to_vec() }))
//!     .unwrap();
//! assert_eq!(engine.to_bytes(), b"XHello\nWorld\n");
//!
//! let result = engine.execute(Command::Edit(EditCommand::Undo)).unwrap();
//! assert!(matches!(result, CommandResult::History(outcome) if outcome.is_applied()));
//! ```

use crate::cursor::{CursorId, Motion};
use crate::delta::TextDelta;
use crate::diagnostics::{DiagnosticMarker, MarkerId};
use crate::editor::EditorEngine;
use crate::error::Result;
use crate::folding::FoldRegion;
use crate::history::HistoryOutcome;
use crate::position::Position;
use crate::search::{SearchMatch, SearchOptions};

/// Text editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert bytes at a byte offset
    Insert {
        /// Byte offset to insert at.
        offset: usize,
        /// Bytes to insert.
        text: Vec<u8>,
    },
    /// Delete a byte range
    Delete {
        /// Byte offset of the deletion start.
        start: usize,
        /// Length of the deletion in bytes.
        length: usize,
    },
    /// Replace a byte range
    Replace {
        /// Byte offset of the replacement start.
        start: usize,
        /// Length of the replaced range in bytes.
        length: usize,
        /// Replacement bytes.
        text: Vec<u8>,
    },
    /// Typing/paste: apply to every caret and selection
    InsertText {
        /// Bytes to insert at each caret or over each selection.
        text: Vec<u8>,
    },
    /// Delete selection(s) if any, otherwise the grapheme before each caret.
    Backspace,
    /// Delete selection(s) if any, otherwise the grapheme after each caret.
    DeleteForward,
    /// Undo the last edit group
    Undo,
    /// Redo the last undone edit group
    Redo,
    /// Replace every occurrence of `query` with `replacement`, as one undoable step.
    ReplaceAll {
        /// Search query.
        query: String,
        /// Replacement bytes.
        replacement: Vec<u8>,
        /// Search options (case sensitivity, whole-word, regex).
        options: SearchOptions,
    },
}

/// Cursor & selection commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Move the primary cursor to a position
    MoveTo {
        /// Target position.
        position: Position,
        /// Keep or create the selection anchor.
        extend: bool,
    },
    /// Apply a motion to every cursor
    Move {
        /// The motion.
        motion: Motion,
        /// Keep or create the selection anchor.
        extend: bool,
    },
    /// Select a range with the primary cursor
    SetSelection {
        /// Fixed end.
        anchor: Position,
        /// Moving end.
        head: Position,
    },
    /// Add a caret
    Add {
        /// Caret position.
        position: Position,
    },
    /// Remove a cursor
    Remove {
        /// Cursor to remove.
        id: CursorId,
    },
    /// Drop every selection, keeping the carets
    ClearSelections,
    /// Keep only the primary cursor
    ClearSecondary,
}

/// Folding commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldCommand {
    /// Add a fold region (expanded)
    Add {
        /// Start logical line (inclusive).
        start_line: usize,
        /// End logical line (inclusive).
        end_line: usize,
    },
    /// Remove the fold region starting at `start_line`
    Remove {
        /// Start logical line of the region.
        start_line: usize,
    },
    /// Collapse or expand the region starting at `start_line`
    Toggle {
        /// Start logical line of the region.
        start_line: usize,
    },
    /// Expand every region
    ExpandAll,
    /// Collapse every region
    CollapseAll,
}

/// Diagnostic overlay commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticCommand {
    /// Attach a marker
    Add(DiagnosticMarker),
    /// Remove a marker
    Remove(MarkerId),
    /// Replace every marker
    ReplaceAll(Vec<DiagnosticMarker>),
    /// Remove every marker
    Clear,
}

/// Search commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// Select the next occurrence of `query` after the primary cursor.
    FindNext {
        /// Search query.
        query: String,
        /// Search options (case sensitivity, whole-word, regex).
        options: SearchOptions,
    },
    /// Select the previous occurrence of `query` before the primary cursor.
    FindPrev {
        /// Search query.
        query: String,
        /// Search options (case sensitivity, whole-word, regex).
        options: SearchOptions,
    },
    /// Count the occurrences of `query`.
    Count {
        /// Search query.
        query: String,
        /// Search options (case sensitivity, whole-word, regex).
        options: SearchOptions,
    },
    /// Drop the active query
    Clear,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Cursor command
    Cursor(CursorCommand),
    /// Folding command
    Fold(FoldCommand),
    /// Diagnostic command
    Diagnostic(DiagnosticCommand),
    /// Search command
    Search(SearchCommand),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Success, no return value
    Success,
    /// The document changed (possibly by nothing)
    Delta(TextDelta),
    /// Undo/redo outcome
    History(HistoryOutcome),
    /// The cursor holding the requested position
    Cursor(CursorId),
    /// Whether a cursor was removed
    CursorRemoved(bool),
    /// New collapsed state of a toggled fold
    FoldToggled {
        /// `true` when the region is now collapsed.
        collapsed: bool,
    },
    /// The removed fold region, if one started on the line
    FoldRemoved(Option<FoldRegion>),
    /// Id of an added marker
    Marker(MarkerId),
    /// A removed marker
    MarkerRemoved(DiagnosticMarker),
    /// Ids of replaced markers
    Markers(Vec<MarkerId>),
    /// A search match, now selected by the primary cursor
    SearchMatch(SearchMatch),
    /// No match found
    SearchNotFound,
    /// Number of matches
    Count(usize),
    /// Number of occurrences replaced
    Replaced {
        /// Number of occurrences replaced.
        replaced: usize,
    },
}

impl EditorEngine {
    /// Execute one command.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult> {
        tracing::trace!(?command, "execute");
        match command {
            Command::Edit(command) => self.execute_edit(command),
            Command::Cursor(command) => self.execute_cursor(command),
            Command::Fold(command) => self.execute_fold(command),
            Command::Diagnostic(command) => self.execute_diagnostic(command),
            Command::Search(command) => self.execute_search(command),
        }
    }

    /// Execute commands in order, stopping at the first error.
    ///
    /// Commands executed before the failing one stay applied.
    pub fn execute_batch(&mut self, commands: Vec<Command>) -> Result<Vec<CommandResult>> {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            results.push(self.execute(command)?);
        }
        Ok(results)
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<CommandResult> {
        let delta = match command {
            EditCommand::Insert { offset, text } => self.insert(offset, &text)?,
            EditCommand::Delete { start, length } => self.delete(start, length)?,
            EditCommand::Replace {
                start,
                length,
                text,
            } => self.replace(start, length, &text)?,
            EditCommand::InsertText { text } => self.insert_text(&text)?,
            EditCommand::Backspace => self.backspace()?,
            EditCommand::DeleteForward => self.delete_forward()?,
            EditCommand::Undo => return Ok(CommandResult::History(self.undo()?)),
            EditCommand::Redo => return Ok(CommandResult::History(self.redo()?)),
            EditCommand::ReplaceAll {
                query,
                replacement,
                options,
            } => {
                let replaced = self.replace_all(&query, options, &replacement)?;
                return Ok(CommandResult::Replaced { replaced });
            }
        };
        Ok(CommandResult::Delta(delta))
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> Result<CommandResult> {
        let primary = self.primary_cursor().id;
        match command {
            CursorCommand::MoveTo { position, extend } => {
                self.set_cursor(primary, position, extend)?;
            }
            CursorCommand::Move { motion, extend } => self.move_cursors(motion, extend)?,
            CursorCommand::SetSelection { anchor, head } => {
                self.set_selection(primary, anchor, head)?;
            }
            CursorCommand::Add { position } => {
                return Ok(CommandResult::Cursor(self.add_cursor(position)?));
            }
            CursorCommand::Remove { id } => {
                return Ok(CommandResult::CursorRemoved(self.remove_cursor(id)?));
            }
            CursorCommand::ClearSelections => self.clear_selections(),
            CursorCommand::ClearSecondary => self.clear_secondary_cursors(),
        }
        Ok(CommandResult::Success)
    }

    fn execute_fold(&mut self, command: FoldCommand) -> Result<CommandResult> {
        match command {
            FoldCommand::Add {
                start_line,
                end_line,
            } => self.add_fold(start_line, end_line)?,
            FoldCommand::Remove { start_line } => {
                return Ok(CommandResult::FoldRemoved(self.remove_fold(start_line)));
            }
            FoldCommand::Toggle { start_line } => {
                let collapsed = self.toggle_fold(start_line)?;
                return Ok(CommandResult::FoldToggled { collapsed });
            }
            FoldCommand::ExpandAll => self.expand_all_folds(),
            FoldCommand::CollapseAll => self.collapse_all_folds(),
        }
        Ok(CommandResult::Success)
    }

    fn execute_diagnostic(&mut self, command: DiagnosticCommand) -> Result<CommandResult> {
        let result = match command {
            DiagnosticCommand::Add(marker) => CommandResult::Marker(self.add_diagnostic(marker)?),
            DiagnosticCommand::Remove(id) => {
                CommandResult::MarkerRemoved(self.remove_diagnostic(id)?)
            }
            DiagnosticCommand::ReplaceAll(markers) => {
                CommandResult::Markers(self.set_diagnostics(markers)?)
            }
            DiagnosticCommand::Clear => {
                self.clear_diagnostics();
                CommandResult::Success
            }
        };
        Ok(result)
    }

    fn execute_search(&mut self, command: SearchCommand) -> Result<CommandResult> {
        let found = match command {
            SearchCommand::FindNext { query, options } => {
                self.search(&query, options)?;
                self.find_next()?
            }
            SearchCommand::FindPrev { query, options } => {
                self.search(&query, options)?;
                self.find_previous()?
            }
            SearchCommand::Count { query, options } => {
                self.search(&query, options)?;
                return Ok(CommandResult::Count(self.match_count()?));
            }
            SearchCommand::Clear => {
                self.clear_search();
                return Ok(CommandResult::Success);
            }
        };
        Ok(found.map_or(CommandResult::SearchNotFound, CommandResult::SearchMatch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_execute_edit_returns_delta() {
        let mut engine = EditorEngine::from_bytes("abc");
        let result = engine
            .execute(Command::Edit(EditCommand::Insert {
                offset: 1,
                text: b"X".to_vec(),
            }))
            .unwrap();

        let CommandResult::Delta(delta) = result else {
            panic!("expected a delta, got {result:?}");
        };
        assert_eq!(delta.before_len, 3);
        assert_eq!(delta.after_len, 4);
        assert_eq!(engine.to_bytes(), b"aXbc");
    }

    #[test]
    fn test_execute_batch_stops_at_first_error() {
        let mut engine = EditorEngine::from_bytes("abc");
        let result = engine.execute_batch(vec![
            Command::Edit(EditCommand::Insert {
                offset: 0,
                text: b"1".to_vec(),
            }),
            Command::Edit(EditCommand::Delete {
                start: 10,
                length: 1,
            }),
            Command::Edit(EditCommand::Insert {
                offset: 0,
                text: b"2".to_vec(),
            }),
        ]);

        assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
        assert_eq!(engine.to_bytes(), b"1abc");
    }

    #[test]
    fn test_find_next_selects_match() {
        let mut engine = EditorEngine::from_bytes("foo bar foo");
        let result = engine
            .execute(Command::Search(SearchCommand::FindNext {
                query: "foo".to_string(),
                options: SearchOptions::default(),
            }))
            .unwrap();

        // The caret sits on the first match, so the next one is picked.
        assert_eq!(
            result,
            CommandResult::SearchMatch(SearchMatch {
                line: 0,
                start: 8,
                end: 11
            })
        );
        assert_eq!(
            engine.primary_cursor().range(),
            (Position::new(0, 8), Position::new(0, 11))
        );
    }

    #[test]
    fn test_fold_commands() {
        let mut engine = EditorEngine::from_bytes("a\nb\nc\nd");
        engine
            .execute(Command::Fold(FoldCommand::Add {
                start_line: 0,
                end_line: 2,
            }))
            .unwrap();
        let result = engine
            .execute(Command::Fold(FoldCommand::Toggle { start_line: 0 }))
            .unwrap();
        assert_eq!(result, CommandResult::FoldToggled { collapsed: true });
        assert_eq!(engine.visible_lines().collect::<Vec<_>>(), vec![0, 3]);
    }
}
