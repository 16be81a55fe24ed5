//! Engine configuration.

use crate::diagnostics::ReanchorPolicy;
use crate::storage::PieceTable;

/// Tunables for an [`crate::EditorEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum number of edit log entries kept. Older entries are dropped first.
    pub max_undo_entries: usize,
    /// If `true`, the per-cursor edits of one multi-cursor operation undo as a single step.
    pub group_multi_cursor_edits: bool,
    /// Number of buffer mutations between add-buffer compactions.
    pub gc_threshold: usize,
    /// What happens to diagnostics whose line is split or joined by an edit.
    pub reanchor_policy: ReanchorPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo_entries: 1000,
            group_multi_cursor_edits: true,
            gc_threshold: PieceTable::DEFAULT_GC_THRESHOLD,
            reanchor_policy: ReanchorPolicy::LineStart,
        }
    }
}

impl EngineConfig {
    /// Set [`EngineConfig::max_undo_entries`].
    pub fn with_max_undo_entries(mut self, max: usize) -> Self {
        self.max_undo_entries = max;
        self
    }

    /// Set [`EngineConfig::group_multi_cursor_edits`].
    pub fn with_grouped_multi_cursor_edits(mut self, grouped: bool) -> Self {
        self.group_multi_cursor_edits = grouped;
        self
    }

    /// Set [`EngineConfig::gc_threshold`].
    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }

    /// Set [`EngineConfig::reanchor_policy`].
    pub fn with_reanchor_policy(mut self, policy: ReanchorPolicy) -> Self {
        self.reanchor_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = EngineConfig::default()
            .with_max_undo_entries(5)
            .with_reanchor_policy(ReanchorPolicy::Remove);
        assert_eq!(config.max_undo_entries, 5);
        assert_eq!(config.reanchor_policy, ReanchorPolicy::Remove);
        assert!(config.group_multi_cursor_edits);
        assert_eq!(config.gc_threshold, 1000);
    }
}
