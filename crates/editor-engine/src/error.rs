//! Engine error type.

use crate::cursor::CursorId;
use crate::diagnostics::MarkerId;
use thiserror::Error;

/// Errors returned by engine operations.
///
/// Every failing operation leaves the engine exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A byte offset lies past the end of the buffer.
    #[error("offset {offset} is out of bounds (buffer length {len})")]
    InvalidOffset {
        /// Offending offset.
        offset: usize,
        /// Buffer length at the time of the call.
        len: usize,
    },
    /// A byte range is reversed or extends past the end of the buffer.
    #[error("range {start}..{end} is invalid (buffer length {len})")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
        /// Buffer length at the time of the call.
        len: usize,
    },
    /// A line index is not smaller than the line count.
    #[error("line {line} is out of bounds (line count {line_count})")]
    LineOutOfBounds {
        /// Offending line.
        line: usize,
        /// Line count at the time of the call.
        line_count: usize,
    },
    /// A column lies past the end of its line.
    #[error("column {column} is out of bounds for line {line} (length {len})")]
    ColumnOutOfBounds {
        /// Line of the position.
        line: usize,
        /// Offending column.
        column: usize,
        /// Line length, excluding the terminator.
        len: usize,
    },
    /// A column does not fall on a grapheme boundary.
    #[error("position {line}:{column} is not on a grapheme boundary")]
    InvalidPosition {
        /// Line of the position.
        line: usize,
        /// Column of the position.
        column: usize,
    },
    /// A fold was requested with `start_line > end_line`.
    #[error("fold range {start_line}..={end_line} is reversed")]
    InvalidLineRange {
        /// First line.
        start_line: usize,
        /// Last line.
        end_line: usize,
    },
    /// A fold would overlap an existing fold.
    #[error("fold {start_line}..={end_line} overlaps existing fold {existing_start}..={existing_end}")]
    OverlappingRegion {
        /// First line of the rejected fold.
        start_line: usize,
        /// Last line of the rejected fold.
        end_line: usize,
        /// First line of the fold already present.
        existing_start: usize,
        /// Last line of the fold already present.
        existing_end: usize,
    },
    /// No fold region starts at the given line.
    #[error("no fold starts at line {line}")]
    UnknownFold {
        /// Requested start line.
        line: usize,
    },
    /// The search pattern failed to compile.
    #[error("invalid search pattern: {0}")]
    InvalidRegex(String),
    /// The cursor id is not part of the cursor set.
    #[error("unknown cursor {0:?}")]
    UnknownCursor(CursorId),
    /// The marker id is not part of the diagnostic overlay.
    #[error("unknown diagnostic marker {0:?}")]
    UnknownMarker(MarkerId),
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InvalidOffset { offset: 9, len: 4 };
        assert_eq!(err.to_string(), "offset 9 is out of bounds (buffer length 4)");

        let err = EngineError::OverlappingRegion {
            start_line: 2,
            end_line: 6,
            existing_start: 5,
            existing_end: 8,
        };
        assert_eq!(
            err.to_string(),
            "fold 2..=6 overlaps existing fold 5..=8"
        );
    }
}
