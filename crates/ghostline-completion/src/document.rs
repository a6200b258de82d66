//! Editor-agnostic document access
//!
//! The completion core never talks to a host editor's document model
//! directly. Hosts implement [`Document`] at the boundary, mapping their
//! own coordinate API onto the plain [`Position`]/[`Range`] value types.
//! All columns and offsets are in UTF-16 code units, and lines are
//! joined by a single `\n` (one unit) for offset purposes.

use crate::types::{Position, Range};

/// The identifier-like fragment immediately before a position, plus the
/// column where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAtPosition {
    pub word: String,
    pub start_column: u32,
}

/// Read access to the host editor's document. Bound `Send + Sync` so
/// completion futures borrowing a document can cross task boundaries.
pub trait Document: Send + Sync {
    /// Number of lines in the document
    fn line_count(&self) -> u32;

    /// The content of a 1-based line, without its trailing newline
    fn line(&self, line: u32) -> Option<&str>;

    /// UTF-16 offset of `position` from the start of the document.
    /// Positions past the end of a line or the document clamp to it.
    fn offset_at(&self, position: Position) -> usize {
        let mut offset = 0;
        let last = self.line_count();
        for n in 1..=last {
            let Some(text) = self.line(n) else { break };
            if n == position.line {
                let column_units = position.column.saturating_sub(1) as usize;
                return offset + column_units.min(utf16_len(text));
            }
            // +1 for the joining newline
            offset += utf16_len(text) + 1;
        }
        offset.saturating_sub(1)
    }

    /// The text the document contains between `range.start` and `range.end`
    fn text_in_range(&self, range: &Range) -> String {
        let (start, end) = (range.start, range.end);
        if start.line == end.line {
            let Some(text) = self.line(start.line) else {
                return String::new();
            };
            return utf16_substring(
                text,
                start.column.saturating_sub(1) as usize,
                end.column.saturating_sub(1) as usize,
            );
        }

        let mut parts = Vec::new();
        if let Some(text) = self.line(start.line) {
            let (_, tail) = split_at_utf16(text, start.column.saturating_sub(1) as usize);
            parts.push(tail);
        }
        for n in (start.line + 1)..end.line {
            parts.push(self.line(n).unwrap_or_default().to_string());
        }
        if let Some(text) = self.line(end.line) {
            let (head, _) = split_at_utf16(text, end.column.saturating_sub(1) as usize);
            parts.push(head);
        }
        parts.join("\n")
    }

    /// The identifier prefix still being typed at `position` and its
    /// start column. Word characters are alphanumerics and `_`.
    fn word_until_position(&self, position: Position) -> WordAtPosition {
        let Some(text) = self.line(position.line) else {
            return WordAtPosition {
                word: String::new(),
                start_column: position.column,
            };
        };
        let (before, _) = split_at_utf16(text, position.column.saturating_sub(1) as usize);
        let word: String = before
            .chars()
            .rev()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        WordAtPosition {
            start_column: position.column - utf16_len(&word) as u32,
            word,
        }
    }
}

/// A `Vec<String>`-backed document, used by tests and simple hosts
#[derive(Debug, Clone, Default)]
pub struct LinesDocument {
    lines: Vec<String>,
}

impl LinesDocument {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split `text` on `\n` into lines
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace the whole content, as an editor buffer would on edit
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }
}

impl Document for LinesDocument {
    fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    fn line(&self, line: u32) -> Option<&str> {
        let index = line.checked_sub(1)? as usize;
        self.lines.get(index).map(String::as_str)
    }
}

/// Length of `text` in UTF-16 code units
pub(crate) fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Split `text` at `units` UTF-16 code units. A split point beyond the
/// end puts everything in the first half; a split point inside a
/// surrogate pair keeps the whole character in the first half.
pub(crate) fn split_at_utf16(text: &str, units: usize) -> (String, String) {
    let mut seen = 0;
    for (byte_index, c) in text.char_indices() {
        if seen >= units {
            return (text[..byte_index].to_string(), text[byte_index..].to_string());
        }
        seen += c.len_utf16();
    }
    (text.to_string(), String::new())
}

/// The UTF-16 unit range `[start, end)` of `text`
pub(crate) fn utf16_substring(text: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    let (_, tail) = split_at_utf16(text, start);
    let (head, _) = split_at_utf16(&tail, end - start);
    head
}

/// The first `units` UTF-16 code units of `text`
pub(crate) fn head_utf16(text: &str, units: usize) -> String {
    split_at_utf16(text, units).0
}

/// Everything after the first `units` UTF-16 code units of `text`
pub(crate) fn skip_utf16(text: &str, units: usize) -> String {
    split_at_utf16(text, units).1
}

/// The last `units` UTF-16 code units of `text`
pub(crate) fn tail_utf16(text: &str, units: usize) -> String {
    let len = utf16_len(text);
    if len <= units {
        return text.to_string();
    }
    split_at_utf16(text, len - units).1
}
