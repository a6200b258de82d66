//! Core value types shared across the completion pipeline
//!
//! Positions are 1-based and columns count UTF-16 code units before the
//! character, matching the coordinate space editors report over the wire.
//! The serde renames on the prompt types reproduce the backend wire format
//! exactly, so a payload serializes to the shape the suggestion service
//! expects without an extra mapping layer.

use serde::{Deserialize, Serialize};

/// A 1-based document position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number, starting at 1
    #[serde(rename = "Ln")]
    pub line: u32,
    /// Column in UTF-16 code units before the character, starting at 1
    #[serde(rename = "Col")]
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A document span with `start <= end` in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Maximum characters retained on each side of the cursor when building
/// a prompt window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLimits {
    pub before_cursor: usize,
    pub after_cursor: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            before_cursor: 8_000,
            after_cursor: 1_000,
        }
    }
}

/// A contiguous slice of the document, truncated to fit a text limit and
/// tagged with its original document coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFragment {
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Start")]
    pub start: Position,
    #[serde(rename = "End")]
    pub end: Position,
}

/// The bounded request payload sent to the suggestion backend: up to two
/// fragments (before-cursor, after-cursor) plus the cursor itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Fragments")]
    pub fragments: Vec<PromptFragment>,
    #[serde(rename = "Cursor")]
    pub cursor: Position,
}

/// A single raw suggestion as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSuggestion {
    #[serde(rename = "Text", default)]
    pub text: String,
}

/// The backend response for one request. Both fields default so that a
/// malformed response with a missing suggestion array or request id
/// deserializes to "zero suggestions" instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSuggestions {
    #[serde(rename = "Suggests", default)]
    pub suggestions: Vec<RawSuggestion>,
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
}

/// Arguments carried by the accept command attached to every completion
/// item, echoed back by the editor when the user accepts a suggestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptCommandArgs {
    pub request_id: String,
    /// The pristine suggestion text, without the locally-typed prefix
    pub suggestion_text: String,
    /// UTF-16 length of the already-typed word prepended to `insert_text`
    pub prev_word_length: usize,
}

/// An inline completion enriched with the pristine backend text and the
/// accept command needed for lifecycle tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    /// Text inserted on accept: the typed word plus the pristine suggestion
    pub insert_text: String,
    /// Constant so the editor keeps the backend's rank order
    pub sort_text: String,
    /// The raw suggestion text as returned by the backend
    pub pristine: String,
    /// Replacement span in the document, from word start to the cursor
    pub range: Option<Range>,
    pub command: AcceptCommandArgs,
}

/// The suggestions produced by one backend request, tracked as a single
/// lifecycle unit. Item order is the backend's rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionBatch {
    pub items: Vec<CompletionItem>,
    pub request_id: String,
    /// How many times an item of this batch was shown; only ever increases
    pub shown_count: u32,
    /// Monotonic false -> true; reset only by replacing or clearing the batch
    pub was_accepted: bool,
}

impl SuggestionBatch {
    pub fn new(items: Vec<CompletionItem>, request_id: String) -> Self {
        Self {
            items,
            request_id,
            shown_count: 0,
            was_accepted: false,
        }
    }
}

/// The outcome every caller of one coalesced request cycle receives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionsBundle {
    pub suggestions: Vec<CompletionItem>,
    pub request_id: String,
}

/// Why a suggestion batch was explicitly discarded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardReason {
    #[default]
    OnCancel,
}
