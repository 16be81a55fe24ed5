use editor_engine::{
    CursorEdit, CursorId, EditorEngine, EngineConfig, EngineError, Motion, Position,
};
use pretty_assertions::assert_eq;

fn positions(engine: &EditorEngine) -> Vec<Position> {
    engine.cursors().iter().map(|c| c.position).collect()
}

#[test]
fn test_simultaneous_insert_matches_sequential_descending_inserts() {
    let text = "alpha\nbeta\ngamma\ndelta";
    let carets = [(0, 2), (1, 0), (2, 5), (3, 1)];

    let mut engine = EditorEngine::from_bytes(text);
    let primary = engine.primary_cursor().id;
    engine
        .set_cursor(primary, Position::new(carets[0].0, carets[0].1), false)
        .unwrap();
    for &(line, column) in &carets[1..] {
        engine.add_cursor(Position::new(line, column)).unwrap();
    }
    engine.insert_text(b"<>").unwrap();

    let mut sequential = EditorEngine::from_bytes(text);
    let mut offsets: Vec<usize> = carets
        .iter()
        .map(|&(line, column)| {
            sequential
                .position_to_offset(Position::new(line, column))
                .unwrap()
        })
        .collect();
    offsets.sort_unstable_by(|a, b| b.cmp(a));
    for offset in offsets {
        sequential.insert(offset, b"<>").unwrap();
    }

    assert_eq!(engine.to_bytes(), sequential.to_bytes());
    let expected: Vec<Position> = carets
        .iter()
        .map(|&(line, column)| Position::new(line, column + 2))
        .collect();
    assert_eq!(positions(&engine), expected);
}

#[test]
fn test_cursors_on_same_line_advance_independently() {
    let mut engine = EditorEngine::from_bytes("a b c");
    engine.add_cursor(Position::new(0, 2)).unwrap();
    engine.add_cursor(Position::new(0, 4)).unwrap();

    engine.insert_text(b"__").unwrap();
    assert_eq!(engine.to_bytes(), b"__a __b __c");
    assert_eq!(
        positions(&engine),
        vec![Position::new(0, 2), Position::new(0, 6), Position::new(0, 10)]
    );
}

#[test]
fn test_adding_duplicate_cursor_merges() {
    let mut engine = EditorEngine::from_bytes("abc");
    let first = engine.add_cursor(Position::new(0, 2)).unwrap();
    let again = engine.add_cursor(Position::new(0, 2)).unwrap();
    assert_eq!(first, again);
    assert_eq!(engine.cursors().len(), 2);
}

#[test]
fn test_motion_collapses_cursors_that_meet() {
    let mut engine = EditorEngine::from_bytes("ab\ncd");
    engine.add_cursor(Position::new(0, 1)).unwrap();
    engine.add_cursor(Position::new(1, 1)).unwrap();

    engine.move_cursors(Motion::LineStart, false).unwrap();
    assert_eq!(
        positions(&engine),
        vec![Position::new(0, 0), Position::new(1, 0)]
    );
    // The primary cursor has the lowest id and survives the merge.
    assert_eq!(engine.primary_cursor().id, CursorId(0));

    engine.move_cursors(Motion::DocumentStart, false).unwrap();
    assert_eq!(engine.cursors().len(), 1);
}

#[test]
fn test_backspace_at_multiple_cursors() {
    let mut engine = EditorEngine::from_bytes("ab\ncd\nef");
    engine.move_cursors(Motion::LineEnd, false).unwrap();
    engine.add_cursor(Position::new(1, 2)).unwrap();
    engine.add_cursor(Position::new(2, 0)).unwrap();

    engine.backspace().unwrap();
    assert_eq!(engine.to_bytes(), b"a\ncef");
    assert_eq!(
        positions(&engine),
        vec![Position::new(0, 1), Position::new(1, 1)]
    );
}

#[test]
fn test_delete_forward_joins_lines_at_line_end() {
    let mut engine = EditorEngine::from_bytes("ab\ncd");
    engine.move_cursors(Motion::LineEnd, false).unwrap();
    engine.delete_forward().unwrap();
    assert_eq!(engine.to_bytes(), b"abcd");

    // Nothing after the end of the document.
    engine.move_cursors(Motion::DocumentEnd, false).unwrap();
    let delta = engine.delete_forward().unwrap();
    assert!(delta.is_empty());
}

#[test]
fn test_typing_replaces_every_selection() {
    let mut engine = EditorEngine::from_bytes("foo = foo + foo");
    let primary = engine.primary_cursor().id;
    engine
        .set_selection(primary, Position::new(0, 0), Position::new(0, 3))
        .unwrap();
    let second = engine.add_cursor(Position::new(0, 6)).unwrap();
    engine
        .set_selection(second, Position::new(0, 6), Position::new(0, 9))
        .unwrap();

    engine.insert_text(b"bar").unwrap();
    assert_eq!(engine.to_bytes(), b"bar = bar + foo");
    assert!(engine.cursors().iter().all(|c| !c.has_selection()));
}

#[test]
fn test_apply_edit_with_custom_callback() {
    let mut engine = EditorEngine::from_bytes("x\ny\nz");
    engine.add_cursor(Position::new(1, 0)).unwrap();
    engine.add_cursor(Position::new(2, 0)).unwrap();

    // Wrap each line in brackets, leaving the caret inside.
    let delta = engine
        .apply_edit(|target| {
            let line = target.cursor().position.line;
            let range = target.document().line_range(line).ok()?;
            let content = target.document().line_content(line).ok()?;
            let mut text = b"[".to_vec();
            text.extend_from_slice(&content);
            text.push(b']');
            let end = range.start + content.len();
            Some(CursorEdit {
                range: range.start..end,
                text,
                cursor_after: 1,
            })
        })
        .unwrap();

    assert_eq!(engine.to_bytes(), b"[x]\n[y]\n[z]");
    assert_eq!(delta.edits.len(), 3);
    assert_eq!(
        positions(&engine),
        vec![Position::new(0, 1), Position::new(1, 1), Position::new(2, 1)]
    );
}

#[test]
fn test_overlapping_callback_ranges_are_rejected() {
    let mut engine = EditorEngine::from_bytes("abcdef");
    engine.add_cursor(Position::new(0, 3)).unwrap();
    let version = engine.version();

    let result = engine.apply_edit(|_| Some(CursorEdit::delete(0..4)));
    assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
    assert_eq!(engine.to_bytes(), b"abcdef");
    assert_eq!(engine.version(), version);
    assert!(!engine.can_undo());
}

#[test]
fn test_remove_cursor_keeps_last_one() {
    let mut engine = EditorEngine::from_bytes("abc");
    let second = engine.add_cursor(Position::new(0, 3)).unwrap();
    assert_eq!(engine.remove_cursor(second), Ok(true));
    assert_eq!(engine.remove_cursor(CursorId(0)), Ok(false));
    assert_eq!(
        engine.remove_cursor(second),
        Err(EngineError::UnknownCursor(second))
    );
}

#[test]
fn test_raw_insert_shifts_cursors_on_later_lines() {
    let mut engine = EditorEngine::from_bytes("one\ntwo\nthree");
    engine.add_cursor(Position::new(2, 2)).unwrap();

    engine.insert(0, b"zero\n").unwrap();
    assert_eq!(
        positions(&engine),
        vec![Position::new(1, 0), Position::new(3, 2)]
    );
}

#[test]
fn test_ungrouped_undo_carries_other_cursors_along() {
    let config = EngineConfig::default().with_grouped_multi_cursor_edits(false);
    let mut engine = EditorEngine::with_config(config);
    engine.load_from_bytes("ab");
    let second = engine.add_cursor(Position::new(0, 1)).unwrap();

    engine.insert_text(b"X").unwrap();
    assert_eq!(engine.to_bytes(), b"XaXb");

    // Reverts only the first cursor's insert; the second caret keeps its place after its X.
    engine.undo().unwrap();
    assert_eq!(engine.to_bytes(), b"aXb");
    assert_eq!(engine.cursor(CursorId(0)).unwrap().position, Position::new(0, 0));
    assert_eq!(engine.cursor(second).unwrap().position, Position::new(0, 2));

    engine.redo().unwrap();
    assert_eq!(engine.to_bytes(), b"XaXb");
    assert_eq!(
        positions(&engine),
        vec![Position::new(0, 1), Position::new(0, 3)]
    );
}
