//! Logical coordinates.

use std::cmp::Ordering;

/// Logical position (line and column).
///
/// Columns count bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based byte column within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, column): (usize, usize)) -> Self {
        Self::new(line, column)
    }
}

/// Selection range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// Selection start position
    pub start: Position,
    /// Selection end position
    pub end: Position,
    /// Selection direction
    pub direction: SelectionDirection,
}

impl Selection {
    /// Build a selection from an anchor and a head, in either order.
    pub fn from_anchor(anchor: Position, head: Position) -> Self {
        if head < anchor {
            Self {
                start: head,
                end: anchor,
                direction: SelectionDirection::Backward,
            }
        } else {
            Self {
                start: anchor,
                end: head,
                direction: SelectionDirection::Forward,
            }
        }
    }

    /// Whether the selection covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Selection direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionDirection {
    /// Forward selection (from start to end)
    Forward,
    /// Backward selection (from end to start)
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_order_is_line_major() {
        assert!(Position::new(0, 10) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::from((4, 2)), Position::new(4, 2));
    }

    #[test]
    fn test_selection_from_anchor_orders_endpoints() {
        let sel = Selection::from_anchor(Position::new(3, 1), Position::new(1, 5));
        assert_eq!(sel.start, Position::new(1, 5));
        assert_eq!(sel.end, Position::new(3, 1));
        assert_eq!(sel.direction, SelectionDirection::Backward);
        assert!(!sel.is_empty());
    }
}
