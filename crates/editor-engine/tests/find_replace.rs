use editor_engine::{EditorEngine, EngineError, Position, SearchMatch, SearchOptions};
use pretty_assertions::assert_eq;

fn m(line: usize, start: usize, end: usize) -> SearchMatch {
    SearchMatch { line, start, end }
}

fn options(case_sensitive: bool, whole_word: bool, regex: bool) -> SearchOptions {
    SearchOptions {
        case_sensitive,
        whole_word,
        regex,
    }
}

#[test]
fn test_matches_iterate_in_document_order() {
    let mut engine = EditorEngine::from_bytes("foo bar\nbar foo foo\n");
    let found: Vec<SearchMatch> = engine
        .search("foo", SearchOptions::default())
        .unwrap()
        .collect();
    assert_eq!(found, vec![m(0, 0, 3), m(1, 4, 7), m(1, 8, 11)]);
    assert_eq!(engine.match_count().unwrap(), 3);
}

#[test]
fn test_case_insensitive_and_whole_word() {
    let mut engine = EditorEngine::from_bytes("Foo food FOO _foo");
    let found: Vec<SearchMatch> = engine
        .search("foo", options(false, true, false))
        .unwrap()
        .collect();
    assert_eq!(found, vec![m(0, 0, 3), m(0, 9, 12)]);
}

#[test]
fn test_plain_query_is_not_a_regex() {
    let mut engine = EditorEngine::from_bytes("a.c abc a.c");
    let found: Vec<SearchMatch> = engine
        .search("a.c", SearchOptions::default())
        .unwrap()
        .collect();
    assert_eq!(found, vec![m(0, 0, 3), m(0, 8, 11)]);

    let found: Vec<SearchMatch> = engine
        .search("a.c", options(true, false, true))
        .unwrap()
        .collect();
    assert_eq!(found.len(), 3);
}

#[test]
fn test_invalid_regex_is_reported() {
    let mut engine = EditorEngine::from_bytes("text");
    assert!(matches!(
        engine.search("(unclosed", options(true, false, true)),
        Err(EngineError::InvalidRegex(_))
    ));
}

#[test]
fn test_find_next_and_previous_wrap() {
    let mut engine = EditorEngine::from_bytes("x one\ntwo one\none");
    engine.search("one", SearchOptions::default()).unwrap();

    assert_eq!(engine.find_next().unwrap(), Some(m(0, 2, 5)));
    assert_eq!(engine.find_next().unwrap(), Some(m(1, 4, 7)));
    assert_eq!(engine.find_next().unwrap(), Some(m(2, 0, 3)));
    assert_eq!(engine.find_next().unwrap(), Some(m(0, 2, 5)));
    assert_eq!(
        engine.primary_cursor().range(),
        (Position::new(0, 2), Position::new(0, 5))
    );

    assert_eq!(engine.find_previous().unwrap(), Some(m(2, 0, 3)));
    assert_eq!(engine.current_match(), Some(m(2, 0, 3)));
}

#[test]
fn test_single_match_wraps_to_itself() {
    let mut engine = EditorEngine::from_bytes("only needle here");
    engine.search("needle", SearchOptions::default()).unwrap();
    assert_eq!(engine.find_next().unwrap(), Some(m(0, 5, 11)));
    assert_eq!(engine.find_next().unwrap(), Some(m(0, 5, 11)));
    assert_eq!(engine.find_previous().unwrap(), Some(m(0, 5, 11)));
}

#[test]
fn test_no_match_and_no_query() {
    let mut engine = EditorEngine::from_bytes("abc");
    assert_eq!(engine.find_next().unwrap(), None);

    engine.search("zzz", SearchOptions::default()).unwrap();
    assert_eq!(engine.find_next().unwrap(), None);
    assert_eq!(engine.match_count().unwrap(), 0);
}

#[test]
fn test_results_follow_edits() {
    let mut engine = EditorEngine::from_bytes("cat\ndog");
    engine.search("dog", SearchOptions::default()).unwrap();
    assert_eq!(engine.match_count().unwrap(), 1);

    engine.insert(0, b"dog ").unwrap();
    let found: Vec<SearchMatch> = engine.search_matches().collect();
    assert_eq!(found, vec![m(0, 0, 3), m(1, 0, 3)]);
    assert_eq!(engine.current_match(), None);
}

#[test]
fn test_replace_all_is_one_undo_step() {
    let mut engine = EditorEngine::from_bytes("let a = a + a;\nprint(a)");
    let primary = engine.primary_cursor().id;
    engine
        .set_cursor(primary, Position::new(1, 8), false)
        .unwrap();

    let replaced = engine
        .replace_all("a", options(true, true, false), b"value")
        .unwrap();
    assert_eq!(replaced, 4);
    assert_eq!(
        engine.to_bytes(),
        b"let value = value + value;\nprint(value)"
    );
    assert_eq!(engine.primary_cursor().position, Position::new(1, 12));

    engine.undo().unwrap();
    assert_eq!(engine.to_bytes(), b"let a = a + a;\nprint(a)");
    assert!(!engine.can_undo());
}

#[test]
fn test_replace_all_without_matches_changes_nothing() {
    let mut engine = EditorEngine::from_bytes("abc");
    let version = engine.version();
    assert_eq!(
        engine
            .replace_all("x", SearchOptions::default(), b"y")
            .unwrap(),
        0
    );
    assert_eq!(engine.version(), version);
    assert!(!engine.can_undo());
}

#[test]
fn test_search_over_invalid_utf8() {
    let mut engine = EditorEngine::from_bytes(&b"\xffab\xfe\nab"[..]);
    let found: Vec<SearchMatch> = engine
        .search("ab", SearchOptions::default())
        .unwrap()
        .collect();
    assert_eq!(found, vec![m(0, 1, 3), m(1, 0, 2)]);
}
