//! Grapheme, width and word-boundary queries.
//!
//! The engine never interprets bytes itself. Cursor motion and word navigation ask a
//! [`UnicodeService`], and [`DefaultUnicode`] answers using `unicode-segmentation` and
//! `unicode-width`. Bytes that are not valid UTF-8 are treated as one-byte graphemes of width 1.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text segmentation queries over raw line bytes.
pub trait UnicodeService {
    /// Display width of one grapheme.
    fn grapheme_width(&self, grapheme: &[u8]) -> usize;

    /// Whether `offset` lies on a word boundary in `line`.
    fn is_word_boundary(&self, line: &[u8], offset: usize) -> bool;

    /// The nearest grapheme boundary strictly before `offset` (or 0).
    fn previous_grapheme_boundary(&self, line: &[u8], offset: usize) -> usize;

    /// The nearest grapheme boundary strictly after `offset` (or `line.len()`).
    fn next_grapheme_boundary(&self, line: &[u8], offset: usize) -> usize;

    /// Whether `offset` lies on a grapheme boundary in `line`.
    fn is_grapheme_boundary(&self, line: &[u8], offset: usize) -> bool {
        if offset == 0 || offset >= line.len() {
            return offset <= line.len();
        }
        let previous = self.previous_grapheme_boundary(line, offset);
        self.next_grapheme_boundary(line, previous) == offset
    }

    /// Whether a grapheme is whitespace.
    fn is_whitespace(&self, grapheme: &[u8]) -> bool {
        std::str::from_utf8(grapheme)
            .is_ok_and(|s| !s.is_empty() && s.chars().all(char::is_whitespace))
    }

    /// Display width of a whole line.
    fn line_width(&self, line: &[u8]) -> usize {
        let mut width = 0;
        let mut offset = 0;
        while offset < line.len() {
            let next = self.next_grapheme_boundary(line, offset);
            width += self.grapheme_width(&line[offset..next]);
            offset = next;
        }
        width
    }
}

/// [`UnicodeService`] backed by the Unicode segmentation and width tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUnicode;

impl UnicodeService for DefaultUnicode {
    fn grapheme_width(&self, grapheme: &[u8]) -> usize {
        segments(grapheme, Segmentation::Graphemes)
            .map(|(_, g)| std::str::from_utf8(g).map_or(1, UnicodeWidthStr::width))
            .sum()
    }

    fn is_word_boundary(&self, line: &[u8], offset: usize) -> bool {
        if offset == 0 || offset >= line.len() {
            return true;
        }
        let restart = word_restart(line, offset);
        segments(&line[restart..], Segmentation::Words)
            .map(|(start, _)| restart + start)
            .take_while(|start| *start <= offset)
            .any(|start| start == offset)
    }

    fn previous_grapheme_boundary(&self, line: &[u8], offset: usize) -> usize {
        let offset = offset.min(line.len());
        if offset == 0 {
            return 0;
        }
        let restart = grapheme_restart(line, offset - 1);
        segments(&line[restart..], Segmentation::Graphemes)
            .map(|(start, _)| restart + start)
            .take_while(|start| *start < offset)
            .last()
            .unwrap_or(restart)
    }

    fn next_grapheme_boundary(&self, line: &[u8], offset: usize) -> usize {
        if offset >= line.len() {
            return line.len();
        }
        let restart = grapheme_restart(line, offset);
        segments(&line[restart..], Segmentation::Graphemes)
            .map(|(start, g)| restart + start + g.len())
            .find(|end| *end > offset)
            .unwrap_or(line.len())
    }
}

/// Latest offset `<= at` where grapheme segmentation can start over.
///
/// Two adjacent ASCII bytes other than CR LF always have a grapheme boundary between them, and
/// no rule looks back across it.
fn grapheme_restart(line: &[u8], at: usize) -> usize {
    (1..=at.min(line.len().saturating_sub(1)))
        .rev()
        .find(|&i| {
            let (before, after) = (line[i - 1], line[i]);
            before.is_ascii() && after.is_ascii() && !(before == b'\r' && after == b'\n')
        })
        .unwrap_or(0)
}

/// Latest offset `<= at` where word segmentation can start over: an ASCII byte right after a
/// space, which is not a space itself.
fn word_restart(line: &[u8], at: usize) -> usize {
    (1..=at.min(line.len().saturating_sub(1)))
        .rev()
        .find(|&i| line[i - 1] == b' ' && line[i].is_ascii() && line[i] != b' ')
        .unwrap_or(0)
}

#[derive(Clone, Copy)]
enum Segmentation {
    Graphemes,
    Words,
}

/// Split `line` into `(offset, bytes)` segments. Each invalid byte is its own segment.
fn segments(line: &[u8], kind: Segmentation) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    let mut base = 0;
    line.utf8_chunks().flat_map(move |chunk| {
        let valid = chunk.valid();
        let invalid = chunk.invalid();
        let valid_start = base;
        let invalid_start = base + valid.len();
        base = invalid_start + invalid.len();

        let valid_segments: Box<dyn Iterator<Item = (usize, &str)> + '_> = match kind {
            Segmentation::Graphemes => Box::new(valid.grapheme_indices(true)),
            Segmentation::Words => Box::new(valid.split_word_bound_indices()),
        };
        valid_segments
            .map(move |(i, s)| (valid_start + i, s.as_bytes()))
            .chain(
                invalid
                    .iter()
                    .enumerate()
                    .map(move |(i, b)| (invalid_start + i, std::slice::from_ref(b))),
            )
    })
}
