use editor_engine::{EditorEngine, EngineError, FoldRegion, Position};
use pretty_assertions::assert_eq;

fn numbered(lines: usize) -> EditorEngine {
    let text: Vec<String> = (0..lines).map(|i| format!("line {i}")).collect();
    EditorEngine::from_bytes(text.join("\n"))
}

fn spans(engine: &EditorEngine) -> Vec<(usize, usize, bool)> {
    engine
        .folds()
        .regions()
        .iter()
        .map(|r| (r.start_line, r.end_line, r.is_collapsed))
        .collect()
}

#[test]
fn test_toggling_never_changes_content() {
    let mut engine = numbered(12);
    let before = engine.to_bytes();
    engine.add_fold(1, 3).unwrap();
    engine.add_fold(5, 9).unwrap();

    for start in [1, 5, 1, 5, 5] {
        engine.toggle_fold(start).unwrap();
        assert_eq!(engine.to_bytes(), before);
    }
    engine.collapse_all_folds();
    engine.expand_all_folds();
    assert_eq!(engine.to_bytes(), before);
}

#[test]
fn test_overlapping_fold_is_rejected() {
    let mut engine = numbered(10);
    engine.add_fold(2, 5).unwrap();

    assert_eq!(
        engine.add_fold(5, 7),
        Err(EngineError::OverlappingRegion {
            start_line: 5,
            end_line: 7,
            existing_start: 2,
            existing_end: 5
        })
    );
    assert!(matches!(
        engine.add_fold(0, 9),
        Err(EngineError::OverlappingRegion { .. })
    ));
    assert_eq!(
        engine.add_fold(4, 3),
        Err(EngineError::InvalidLineRange {
            start_line: 4,
            end_line: 3
        })
    );
    assert_eq!(
        engine.add_fold(8, 10),
        Err(EngineError::LineOutOfBounds {
            line: 10,
            line_count: 10
        })
    );
    assert_eq!(spans(&engine), vec![(2, 5, false)]);

    // Adjacent regions are fine.
    engine.add_fold(6, 7).unwrap();
    assert_eq!(spans(&engine), vec![(2, 5, false), (6, 7, false)]);
}

#[test]
fn test_visual_mapping_with_collapsed_regions() {
    let mut engine = numbered(10);
    engine.add_fold(1, 3).unwrap();
    engine.add_fold(5, 8).unwrap();
    engine.collapse_all_folds();

    assert_eq!(engine.visible_lines().collect::<Vec<_>>(), vec![0, 1, 4, 5, 9]);
    assert_eq!(engine.visible_line_count(), 5);

    assert_eq!(engine.logical_to_visual(0), Some(0));
    assert_eq!(engine.logical_to_visual(2), None);
    assert_eq!(engine.logical_to_visual(4), Some(2));
    assert_eq!(engine.logical_to_visual(9), Some(4));
    assert_eq!(engine.logical_to_visual(10), None);

    assert_eq!(engine.visual_to_logical(3), Some(5));
    assert_eq!(engine.visual_to_logical(4), Some(9));
    assert_eq!(engine.visual_to_logical(5), None);
}

#[test]
fn test_toggle_at_body_line() {
    let mut engine = numbered(6);
    engine.add_fold(1, 4).unwrap();
    assert_eq!(engine.toggle_fold_at(3), Some(true));
    assert_eq!(engine.toggle_fold_at(0), None);
    assert_eq!(
        engine.toggle_fold(2),
        Err(EngineError::UnknownFold { line: 2 })
    );
}

#[test]
fn test_insert_above_shifts_fold() {
    let mut engine = numbered(10);
    engine.add_fold(4, 6).unwrap();
    engine.toggle_fold(4).unwrap();

    let offset = engine.document().line_range(1).unwrap().start;
    engine.insert(offset, b"new\nnew\n").unwrap();
    assert_eq!(spans(&engine), vec![(6, 8, true)]);
}

#[test]
fn test_edit_below_leaves_fold_alone() {
    let mut engine = numbered(10);
    engine.add_fold(1, 2).unwrap();

    let offset = engine.document().line_range(8).unwrap().start;
    engine.insert(offset, b"a\nb\n").unwrap();
    assert_eq!(spans(&engine), vec![(1, 2, false)]);
}

#[test]
fn test_insert_inside_grows_fold() {
    let mut engine = numbered(10);
    engine.add_fold(2, 5).unwrap();

    let offset = engine.document().line_range(3).unwrap().start + 2;
    engine.insert(offset, b"\n\n").unwrap();
    assert_eq!(spans(&engine), vec![(2, 7, false)]);
}

#[test]
fn test_deleting_fold_lines_removes_region() {
    let mut engine = numbered(10);
    engine.add_fold(3, 5).unwrap();
    engine.add_fold(7, 8).unwrap();

    // Delete lines 3..=5 entirely, terminators included.
    let start = engine.document().line_range(3).unwrap().start;
    let end = engine.document().line_range(5).unwrap().end;
    engine.delete(start, end - start).unwrap();

    assert_eq!(spans(&engine), vec![(4, 5, false)]);
    assert_eq!(engine.line_count(), 7);
}

#[test]
fn test_deleting_across_fold_start_trims_region() {
    let mut engine = numbered(10);
    engine.add_fold(4, 7).unwrap();

    // Remove from the middle of line 2 to the middle of line 5.
    let start = engine.document().line_range(2).unwrap().start + 2;
    let end = engine.document().line_range(5).unwrap().start + 2;
    engine.delete(start, end - start).unwrap();

    // Lines 4 and 5 lost their starts; what remains of the region is old lines 6..=7.
    assert_eq!(spans(&engine), vec![(3, 4, false)]);
}

#[test]
fn test_custom_placeholder_in_snapshot() {
    let mut engine = numbered(5);
    engine
        .add_fold_region(FoldRegion::new(1, 3).with_placeholder("{ … }"))
        .unwrap();
    engine.toggle_fold(1).unwrap();

    let snapshot = engine.snapshot(0, 10, None).unwrap();
    let marker = snapshot.rows[1].fold.as_ref().unwrap();
    assert_eq!(marker.placeholder, "{ … }");
    assert_eq!(marker.end_line, 3);
    assert_eq!(snapshot.rows.len(), 3);
}

#[test]
fn test_snapshot_window_starts_at_visual_row() {
    let mut engine = numbered(10);
    engine.add_fold(2, 6).unwrap();
    engine.toggle_fold(2).unwrap();

    let snapshot = engine.snapshot(2, 3, None).unwrap();
    let lines: Vec<usize> = snapshot.rows.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![2, 7, 8]);
    assert_eq!(snapshot.rows[1].row, 3);
    assert_eq!(snapshot.rows[1].text, b"line 7");
    assert_eq!(snapshot.total_rows, 6);
}

#[test]
fn test_join_keeps_adjacent_folds_disjoint() {
    let mut engine = EditorEngine::from_bytes("0\n1\n2\n3\n4\n5\n6\n7");
    engine.add_fold(2, 3).unwrap();
    engine.add_fold(4, 6).unwrap();
    engine.collapse_all_folds();

    let primary = engine.primary_cursor().id;
    engine.set_cursor(primary, Position::new(4, 0), false).unwrap();
    engine.backspace().unwrap();

    assert_eq!(engine.to_bytes(), b"0\n1\n2\n34\n5\n6\n7");
    assert_eq!(spans(&engine), vec![(2, 3, true), (4, 5, true)]);

    let visible: Vec<usize> = engine.visible_lines().collect();
    assert_eq!(visible, vec![0, 1, 2, 4, 6]);
    assert_eq!(engine.visible_line_count(), visible.len());
}
