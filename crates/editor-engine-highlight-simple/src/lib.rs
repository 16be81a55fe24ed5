//! `editor-engine-highlight-simple` - Simple (regex-based) highlight hook for `editor-engine`.
//!
//! This crate is intended for lightweight formats (JSON/INI/etc.) where full parsing is
//! unnecessary. A [`RegexHighlighter`] implements [`SyntaxHighlighter`], so it can be handed to
//! [`editor_engine::EditorEngine::snapshot`] directly.

use editor_engine::{StyleId, StyleSpan, SyntaxHighlighter};
use regex::bytes::Regex;

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    style_id: StyleId,
    capture_group: Option<usize>,
}

impl RegexRule {
    pub fn new(pattern: &str, style_id: StyleId) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            style_id,
            capture_group: None,
        })
    }

    /// Highlight only a capture group of each match.
    ///
    /// Example (INI key):
    /// - pattern: `^\\s*([^=\\s]+)\\s*=`
    /// - capture_group: `1` (the key)
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    pub fn style_id(&self) -> StyleId {
        self.style_id
    }

    fn spans(&self, line: &[u8], out: &mut Vec<StyleSpan>) {
        let ranges: Vec<(usize, usize)> = match self.capture_group {
            Some(group) => self
                .regex
                .captures_iter(line)
                .filter_map(|caps| caps.get(group))
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => self
                .regex
                .find_iter(line)
                .map(|m| (m.start(), m.end()))
                .collect(),
        };
        out.extend(
            ranges
                .into_iter()
                .filter(|(start, end)| start < end)
                .map(|(start, end)| StyleSpan::new(start, end, self.style_id)),
        );
    }
}

/// A simple regex-based syntax highlighter.
///
/// Designed for simple formats (JSON/INI/etc.). It is *not* intended to be a full parser.
/// Rules run independently, so spans from different rules may overlap; they are returned
/// sorted by start column.
#[derive(Debug, Clone)]
pub struct RegexHighlighter {
    rules: Vec<RegexRule>,
}

impl RegexHighlighter {
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// A small default JSON grammar (strings, numbers, booleans, null).
    pub fn json_default(styles: SimpleJsonStyles) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // JSON string (single-line, handles escapes)
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, styles.string)?,
            // JSON number
            RegexRule::new(
                r#"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?"#,
                styles.number,
            )?,
            // JSON boolean / null
            RegexRule::new(r#"\b(?:true|false)\b"#, styles.boolean)?,
            RegexRule::new(r#"\bnull\b"#, styles.null)?,
        ]))
    }

    /// A small default INI grammar (section, key, comment).
    pub fn ini_default(styles: SimpleIniStyles) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // Section header: [section]
            RegexRule::new(r#"^\s*\[([^\]]+)\]\s*$"#, styles.section)?.with_capture_group(1),
            // Key: key = value
            RegexRule::new(r#"^\s*([^=\s]+)\s*="#, styles.key)?.with_capture_group(1),
            // Comment: ;... or #...
            RegexRule::new(r#"^\s*[;#].*$"#, styles.comment)?,
        ]))
    }
}

impl SyntaxHighlighter for RegexHighlighter {
    fn highlight_line(&self, line: &[u8]) -> Vec<StyleSpan> {
        let mut spans = Vec::new();
        for rule in &self.rules {
            rule.spans(line, &mut spans);
        }
        spans.sort_by_key(|span| (span.start, span.end));
        spans
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimpleJsonStyles {
    pub string: StyleId,
    pub number: StyleId,
    pub boolean: StyleId,
    pub null: StyleId,
}

impl Default for SimpleJsonStyles {
    fn default() -> Self {
        Self {
            string: SIMPLE_STYLE_STRING,
            number: SIMPLE_STYLE_NUMBER,
            boolean: SIMPLE_STYLE_BOOLEAN,
            null: SIMPLE_STYLE_NULL,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimpleIniStyles {
    pub section: StyleId,
    pub key: StyleId,
    pub comment: StyleId,
}

impl Default for SimpleIniStyles {
    fn default() -> Self {
        Self {
            section: SIMPLE_STYLE_SECTION,
            key: SIMPLE_STYLE_KEY,
            comment: SIMPLE_STYLE_COMMENT,
        }
    }
}

/// Default `StyleId` constants for `RegexHighlighter`-based grammars.
///
/// These are only identifiers. The UI/theme layer is expected to map them to actual colors.
pub const SIMPLE_STYLE_STRING: StyleId = 0x0200_0001;
pub const SIMPLE_STYLE_NUMBER: StyleId = 0x0200_0002;
pub const SIMPLE_STYLE_BOOLEAN: StyleId = 0x0200_0003;
pub const SIMPLE_STYLE_NULL: StyleId = 0x0200_0004;
pub const SIMPLE_STYLE_SECTION: StyleId = 0x0200_0010;
pub const SIMPLE_STYLE_KEY: StyleId = 0x0200_0011;
pub const SIMPLE_STYLE_COMMENT: StyleId = 0x0200_0012;

#[cfg(test)]
mod tests {
    use super::*;
    use editor_engine::EditorEngine;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_regex_highlighter_json_strings() {
        let line = r#"{ "key": "值", "n": 12, "ok": true, "x": null }"#;
        let highlighter = RegexHighlighter::json_default(SimpleJsonStyles::default()).unwrap();
        let spans = highlighter.highlight_line(line.as_bytes());

        // Byte columns: the CJK value spans 5 bytes including its quotes.
        assert!(spans.contains(&StyleSpan::new(2, 7, SIMPLE_STYLE_STRING)));
        assert!(spans.contains(&StyleSpan::new(9, 14, SIMPLE_STYLE_STRING)));
        assert!(spans.iter().any(|s| s.style == SIMPLE_STYLE_NUMBER));
        assert!(spans.iter().any(|s| s.style == SIMPLE_STYLE_BOOLEAN));
        assert!(spans.iter().any(|s| s.style == SIMPLE_STYLE_NULL));
        assert!(spans.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn test_regex_highlighter_ini_capture_groups() {
        let highlighter = RegexHighlighter::ini_default(SimpleIniStyles::default()).unwrap();
        assert_eq!(
            highlighter.highlight_line(b"[core]"),
            vec![StyleSpan::new(1, 5, SIMPLE_STYLE_SECTION)]
        );
        assert_eq!(
            highlighter.highlight_line(b"name = editor"),
            vec![StyleSpan::new(0, 4, SIMPLE_STYLE_KEY)]
        );
        assert_eq!(
            highlighter.highlight_line(b";comment"),
            vec![StyleSpan::new(0, 8, SIMPLE_STYLE_COMMENT)]
        );
    }

    #[test]
    fn test_spans_attached_to_snapshot_rows() {
        let mut engine = EditorEngine::from_bytes("[core]\n;skip\nkey = 1\nx = 2");
        engine.add_fold(1, 2).unwrap();
        engine.toggle_fold(1).unwrap();

        let highlighter = RegexHighlighter::ini_default(SimpleIniStyles::default()).unwrap();
        let snapshot = engine.snapshot(0, 10, Some(&highlighter)).unwrap();

        let styles: Vec<Vec<StyleId>> = snapshot
            .rows
            .iter()
            .map(|row| row.spans.iter().map(|s| s.style).collect())
            .collect();
        assert_eq!(
            styles,
            vec![
                vec![SIMPLE_STYLE_SECTION],
                vec![SIMPLE_STYLE_COMMENT],
                vec![SIMPLE_STYLE_KEY],
            ]
        );
    }
}
