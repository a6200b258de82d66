//! Prompt window extraction
//!
//! Turns raw cursor-relative document text into a bounded request
//! payload: everything before the cursor, right-truncated to the last
//! `before_cursor` units, and everything after it, left-truncated to
//! the first `after_cursor` units. This is a pure function; the only
//! session-specific input is the caller-supplied virtual path.

use lazy_static::lazy_static;
use uuid::Uuid;

use crate::document::{split_at_utf16, tail_utf16, utf16_len};
use crate::types::{Position, PromptFragment, PromptPayload, TextLimits};

lazy_static! {
    static ref SESSION_ID: Uuid = Uuid::new_v4();
}

/// The session-scoped virtual identifier tagged onto every payload
pub fn session_path() -> String {
    format!("{}/query.yql", *SESSION_ID)
}

/// Build the bounded prompt payload for `cursor` over `lines`.
///
/// Returns `None` when the cursor line is outside the document, the
/// document is empty, both window halves are empty, or the last line is
/// empty while after-cursor text exists (there is no valid position to
/// anchor the after fragment to); an out-of-range cursor is an expected
/// input, not an error.
pub fn build_prompt(
    lines: &[String],
    cursor: Position,
    limits: &TextLimits,
    session_path: &str,
) -> Option<PromptPayload> {
    let line_index = (cursor.line as usize).checked_sub(1)?;
    let current_line = lines.get(line_index)?;

    let (before_in_line, after_in_line) =
        split_at_utf16(current_line, cursor.column.saturating_sub(1) as usize);

    let mut before_text = lines[..line_index].join("\n");
    if line_index > 0 {
        before_text.push('\n');
    }
    before_text.push_str(&before_in_line);

    let mut after_text = after_in_line;
    for line in &lines[line_index + 1..] {
        after_text.push('\n');
        after_text.push_str(line);
    }

    let mut fragments = Vec::with_capacity(2);
    if !before_text.is_empty() {
        fragments.push(PromptFragment {
            text: tail_utf16(&before_text, limits.before_cursor),
            start: Position::new(1, 1),
            end: cursor,
        });
    }
    if !after_text.is_empty() {
        // an empty last line would anchor the after fragment at column
        // zero, which is not a valid position
        let last_line = lines.last().filter(|line| !line.is_empty())?;
        fragments.push(PromptFragment {
            text: split_at_utf16(&after_text, limits.after_cursor).0,
            start: cursor,
            end: Position::new(lines.len() as u32, utf16_len(last_line) as u32),
        });
    }

    if fragments.is_empty() {
        return None;
    }

    Some(PromptPayload {
        path: session_path.to_string(),
        fragments,
        cursor,
    })
}
