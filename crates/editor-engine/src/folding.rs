//! Code folding.
//!
//! Fold regions are inclusive line ranges, kept sorted and pairwise disjoint. A folded region
//! hides every line after its start line; the start line stays visible and carries the
//! placeholder. Regions follow edits through [`FoldTable::apply_edit`].

use crate::delta::{LineFate, TextDeltaEdit};
use crate::error::{EngineError, Result};

/// Fold region
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoldRegion {
    /// Start line number
    pub start_line: usize,
    /// End line number (inclusive)
    pub end_line: usize,
    /// Whether folded
    pub is_collapsed: bool,
    /// Placeholder text shown when folded (e.g., "[...]")
    pub placeholder: String,
}

impl FoldRegion {
    /// Create an expanded region.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            is_collapsed: false,
            placeholder: String::from("[...]"),
        }
    }

    /// Builder-style placeholder override.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Check if line is within the region
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Number of lines hidden while collapsed.
    pub fn hidden_lines(&self) -> usize {
        if self.is_collapsed {
            self.end_line - self.start_line
        } else {
            0
        }
    }

    fn overlaps(&self, start_line: usize, end_line: usize) -> bool {
        self.start_line <= end_line && start_line <= self.end_line
    }
}

/// Sorted, disjoint set of fold regions.
#[derive(Debug, Clone, Default)]
pub struct FoldTable {
    regions: Vec<FoldRegion>,
}

impl FoldTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// All regions, sorted by start line.
    pub fn regions(&self) -> &[FoldRegion] {
        &self.regions
    }

    /// Whether the table holds no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Add an expanded region over `start_line..=end_line`.
    pub fn add_fold(&mut self, region: FoldRegion, line_count: usize) -> Result<()> {
        let FoldRegion {
            start_line,
            end_line,
            ..
        } = region;
        if start_line > end_line {
            return Err(EngineError::InvalidLineRange {
                start_line,
                end_line,
            });
        }
        if end_line >= line_count {
            return Err(EngineError::LineOutOfBounds {
                line: end_line,
                line_count,
            });
        }

        let pos = self.regions.partition_point(|r| r.start_line < start_line);
        let neighbours = pos.checked_sub(1).into_iter().chain([pos]);
        for index in neighbours {
            if let Some(existing) = self.regions.get(index)
                && existing.overlaps(start_line, end_line)
            {
                return Err(EngineError::OverlappingRegion {
                    start_line,
                    end_line,
                    existing_start: existing.start_line,
                    existing_end: existing.end_line,
                });
            }
        }

        self.regions.insert(pos, region);
        Ok(())
    }

    /// Remove the region starting at `start_line`.
    pub fn remove_fold(&mut self, start_line: usize) -> Option<FoldRegion> {
        let index = self.index_of(start_line)?;
        Some(self.regions.remove(index))
    }

    /// Flip the region starting at `start_line`. Returns the new collapsed state.
    pub fn toggle(&mut self, start_line: usize) -> Result<bool> {
        let index = self
            .index_of(start_line)
            .ok_or(EngineError::UnknownFold { line: start_line })?;
        let region = &mut self.regions[index];
        region.is_collapsed = !region.is_collapsed;
        Ok(region.is_collapsed)
    }

    /// Flip the region containing `line`, if any.
    pub fn toggle_at(&mut self, line: usize) -> Option<bool> {
        let start_line = self.region_at(line)?.start_line;
        self.toggle(start_line).ok()
    }

    /// Region containing `line`.
    pub fn region_at(&self, line: usize) -> Option<&FoldRegion> {
        let pos = self.regions.partition_point(|r| r.start_line <= line);
        let region = self.regions.get(pos.checked_sub(1)?)?;
        region.contains_line(line).then_some(region)
    }

    /// Expand all folds
    pub fn expand_all(&mut self) {
        for region in &mut self.regions {
            region.is_collapsed = false;
        }
    }

    /// Collapse all folds
    pub fn collapse_all(&mut self) {
        for region in &mut self.regions {
            region.is_collapsed = true;
        }
    }

    /// Drop every region.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Whether `line` is hidden by a collapsed region.
    pub fn is_line_hidden(&self, line: usize) -> bool {
        self.region_at(line)
            .is_some_and(|r| r.is_collapsed && line > r.start_line)
    }

    /// Lazily iterate the visible lines of a document with `line_count` lines.
    pub fn visible_lines(&self, line_count: usize) -> VisibleLines<'_> {
        VisibleLines {
            regions: &self.regions,
            next_region: 0,
            next_line: 0,
            line_count,
        }
    }

    /// Lazily iterate visible lines starting at visual row `row`.
    pub fn visible_lines_from(&self, row: usize, line_count: usize) -> VisibleLines<'_> {
        let start = self.visual_to_logical(row).unwrap_or(line_count);
        VisibleLines {
            regions: &self.regions,
            next_region: self.regions.partition_point(|r| r.end_line < start),
            next_line: start,
            line_count,
        }
    }

    /// Number of visible lines.
    pub fn visible_line_count(&self, line_count: usize) -> usize {
        let hidden: usize = self
            .regions
            .iter()
            .filter(|r| r.end_line < line_count)
            .map(FoldRegion::hidden_lines)
            .sum();
        line_count - hidden
    }

    /// Visual row of logical `line`, or `None` if it is hidden.
    pub fn logical_to_visual(&self, line: usize) -> Option<usize> {
        let mut hidden = 0;
        for region in &self.regions {
            if region.start_line >= line {
                break;
            }
            if region.is_collapsed {
                if line <= region.end_line {
                    return None;
                }
                hidden += region.hidden_lines();
            }
        }
        Some(line - hidden)
    }

    /// Logical line shown at visual `row`. Unbounded: callers check against the line count.
    pub fn visual_to_logical(&self, row: usize) -> Option<usize> {
        let mut logical = row;
        for region in &self.regions {
            if region.start_line >= logical {
                break;
            }
            logical = logical.checked_add(region.hidden_lines())?;
        }
        Some(logical)
    }

    /// Reposition regions after `edit`. Returns the regions that were dropped.
    pub fn apply_edit(&mut self, edit: &TextDeltaEdit) -> Vec<FoldRegion> {
        let mut dropped = Vec::new();
        let new_end = edit.new_end;

        self.regions.retain_mut(|region| {
            let start = match edit.line_fate(region.start_line) {
                LineFate::Kept(line) | LineFate::Moved(line) => line,
                LineFate::Deleted => new_end.line + usize::from(new_end.column > 0),
            };
            let end = match edit.line_fate(region.end_line) {
                LineFate::Kept(line) | LineFate::Moved(line) => Some(line),
                LineFate::Deleted if new_end.column == 0 => new_end.line.checked_sub(1),
                LineFate::Deleted => Some(new_end.line),
            };

            match end {
                Some(end) if start <= end => {
                    region.start_line = start;
                    region.end_line = end;
                    true
                }
                _ => {
                    dropped.push(region.clone());
                    false
                }
            }
        });

        self.regions.sort_by_key(|r| r.start_line);
        self.clip_overlaps(&mut dropped);

        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "fold regions removed by edit");
        }
        dropped
    }

    /// A join can pull one region's end onto the next region's start. Later regions give up
    /// the shared lines; a region left with none is dropped.
    fn clip_overlaps(&mut self, dropped: &mut Vec<FoldRegion>) {
        let mut previous_end: Option<usize> = None;
        self.regions.retain_mut(|region| {
            if let Some(end) = previous_end
                && region.start_line <= end
            {
                if region.end_line <= end {
                    dropped.push(region.clone());
                    return false;
                }
                region.start_line = end + 1;
            }
            previous_end = Some(region.end_line);
            true
        });
    }

    fn index_of(&self, start_line: usize) -> Option<usize> {
        self.regions
            .binary_search_by_key(&start_line, |r| r.start_line)
            .ok()
    }
}

/// Iterator over visible logical lines. Restartable via `Clone`.
#[derive(Debug, Clone)]
pub struct VisibleLines<'a> {
    regions: &'a [FoldRegion],
    next_region: usize,
    next_line: usize,
    line_count: usize,
}

impl Iterator for VisibleLines<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let line = self.next_line;
        if line >= self.line_count {
            return None;
        }

        while self
            .regions
            .get(self.next_region)
            .is_some_and(|r| r.end_line < line)
        {
            self.next_region += 1;
        }

        self.next_line = match self.regions.get(self.next_region) {
            Some(region) if region.is_collapsed && region.start_line == line => {
                region.end_line + 1
            }
            _ => line + 1,
        };
        Some(line)
    }
}
