#![warn(missing_docs)]
//! Editor Engine - in-memory text editing engine
//!
//! # Overview
//!
//! `editor-engine` is the mutable core of a code editor widget: a byte buffer, a multi-cursor
//! selection model, a reversible edit history and position-anchored overlays (fold regions and
//! diagnostic markers). It does not render anything; a front-end polls read-only accessors or
//! takes a [`ViewSnapshot`] once per frame.
//!
//! # Core Features
//!
//! - **Piece Table Storage**: pieces kept in a byte-weighted balanced tree, O(log n) edits
//! - **Incremental Line Index**: line lengths in the same tree, patched per edit, never rescanned
//! - **Multi-Cursor Editing**: coordinated edits applied in descending order, cursors merged
//! - **Undo/Redo**: grouped, bounded edit log that also restores cursors
//! - **Folding & Diagnostics**: overlays repositioned by every edit
//! - **Search**: lazy, cached regex/plain search over raw bytes
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditorEngine + Command Interface           │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Snapshot (ViewSnapshot)                    │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  Folds / Diagnostics / Search               │  ← Overlays
//! ├─────────────────────────────────────────────┤
//! │  CursorSet + EditLog                        │  ← Editing
//! ├─────────────────────────────────────────────┤
//! │  Document (PieceTable + PositionIndex)      │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_engine::{EditorEngine, Motion, Position};
//!
//! let mut engine = EditorEngine::from_bytes("Hello\nWorld\n");
//! assert_eq!(engine.line_count(), 3);
//! assert_eq!(&*engine.get_line(0).unwrap(), b"Hello\n");
//!
//! engine.add_cursor(Position::new(1, 0)).unwrap();
//! engine.insert_text(b"- ").unwrap();
//! assert_eq!(engine.to_bytes(), b"- Hello\n- World\n");
//!
//! engine.move_cursors(Motion::LineEnd, false).unwrap();
//! engine.undo().unwrap();
//! assert_eq!(engine.to_bytes(), b"Hello\nWorld\n");
//! ```
//!
//! # Module Description
//!
//! - [`storage`] - Piece Table byte storage
//! - [`line_index`] - incremental line index
//! - [`document`] - buffer plus index
//! - [`cursor`] - cursors, motions and coordinated edits
//! - [`history`] - undo/redo edit log
//! - [`folding`] - fold regions
//! - [`diagnostics`] - diagnostic markers
//! - [`search`] - text search
//! - [`unicode`] - grapheme and word segmentation service
//! - [`snapshot`] - render snapshots
//! - [`commands`] - message-style command interface
//!
//! # Coordinates
//!
//! All offsets and columns are byte counts. Lines are split on `\n` only; a buffer ending in
//! `\n` has a trailing empty line. Positions handed to the engine must sit on grapheme
//! boundaries as reported by the active [`UnicodeService`].

pub mod commands;
pub mod config;
pub mod cursor;
pub mod delta;
pub mod diagnostics;
pub mod document;
pub mod editor;
pub mod error;
pub mod folding;
pub mod highlight;
pub mod history;
pub mod line_index;
pub mod position;
pub mod search;
pub mod snapshot;
pub mod storage;
mod tree;
pub mod unicode;

pub use commands::{
    Command, CommandResult, CursorCommand, DiagnosticCommand, EditCommand, FoldCommand,
    SearchCommand,
};
pub use config::EngineConfig;
pub use cursor::{Cursor, CursorEdit, CursorId, CursorSet, EditTarget, Motion};
pub use delta::{TextDelta, TextDeltaEdit};
pub use diagnostics::{
    DiagnosticCounts, DiagnosticEntry, DiagnosticMarker, DiagnosticOverlay, DiagnosticSeverity,
    MarkerId, ReanchorPolicy,
};
pub use document::Document;
pub use editor::EditorEngine;
pub use error::{EngineError, Result};
pub use folding::{FoldRegion, FoldTable, VisibleLines};
pub use highlight::{StyleId, StyleSpan, SyntaxHighlighter};
pub use history::{EditLog, EditOp, HistoryOutcome, LogEntry, RestoredCursor};
pub use line_index::{EditSpan, PositionIndex};
pub use position::{Position, Selection, SelectionDirection};
pub use search::{Matches, SearchEngine, SearchMatch, SearchOptions};
pub use snapshot::{FoldMarker, ViewRow, ViewSnapshot};
pub use storage::PieceTable;
pub use unicode::{DefaultUnicode, UnicodeService};
