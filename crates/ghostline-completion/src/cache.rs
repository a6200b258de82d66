//! Suggestion cache and prefix-match engine
//!
//! Stores the single most recent suggestion batch and answers whether a
//! cached suggestion is still valid at a new cursor position, so that
//! continued correct typing can be satisfied locally without another
//! backend round trip. The match invalidates the moment the user
//! diverges from the suggested text or moves before its start.

use crate::document::{head_utf16, skip_utf16, utf16_len, Document};
use crate::types::{CompletionItem, Position, Range, SuggestionBatch};

/// Owner of the current [`SuggestionBatch`] and its lifecycle counters.
/// Single-writer: only the completion service mutates it.
#[derive(Debug, Default)]
pub struct SuggestionCache {
    current: Option<SuggestionBatch>,
    /// Pristine text of the most recently shown suggestion
    active: Option<String>,
}

impl SuggestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current batch unconditionally
    pub fn set_batch(&mut self, batch: SuggestionBatch) {
        self.current = Some(batch);
    }

    pub fn batch(&self) -> Option<&SuggestionBatch> {
        self.current.as_ref()
    }

    /// Remove and return the current batch, clearing the active marker
    pub fn take_batch(&mut self) -> Option<SuggestionBatch> {
        self.active = None;
        self.current.take()
    }

    /// Pristine text of the most recently shown suggestion, if any
    pub fn active_suggestion(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Discard the current batch and the active marker
    pub fn clear(&mut self) {
        self.current = None;
        self.active = None;
    }

    /// Record that the item with this pristine text was shown once more.
    /// No-op when no batch is cached or no item matches.
    pub fn increment_shown_count(&mut self, pristine_text: &str) {
        if let Some(batch) = &mut self.current {
            if batch.items.iter().any(|item| item.pristine == pristine_text) {
                batch.shown_count += 1;
                self.active = Some(pristine_text.to_string());
            }
        }
    }

    /// Mark the batch accepted iff an item with this pristine text exists
    pub fn mark_accepted(&mut self, pristine_text: &str) {
        if let Some(batch) = &mut self.current {
            if batch.items.iter().any(|item| item.pristine == pristine_text) {
                batch.was_accepted = true;
            }
        }
    }

    /// Completions from the current batch that are still valid at
    /// `cursor`: the text the user typed since the suggestion's start
    /// must be a case-insensitive prefix of the offered insert text.
    /// Surviving items are re-anchored to span from the original start
    /// to the cursor. Items that fail any check are dropped silently.
    pub fn cached_completions(
        &self,
        document: &dyn Document,
        cursor: Position,
    ) -> Vec<CompletionItem> {
        let Some(batch) = &self.current else {
            return Vec::new();
        };

        let mut completions = Vec::new();
        for item in &batch.items {
            let Some(range) = &item.range else {
                continue;
            };
            if cursor.line < range.start.line || cursor.column < range.start.column {
                continue;
            }

            let start_offset = document.offset_at(range.start);
            let end_offset = start_offset + utf16_len(&item.insert_text);
            let cursor_offset = document.offset_at(cursor);
            if cursor_offset > end_offset {
                // cursor moved past the end of what was offered
                continue;
            }
            let Some(typed_units) = cursor_offset.checked_sub(start_offset) else {
                continue;
            };

            let new_range = Range::new(range.start, cursor);
            let live_text = document.text_in_range(&new_range);
            let expected_text = head_utf16(&item.insert_text, typed_units);

            if live_text.to_lowercase() == expected_text.to_lowercase() {
                completions.push(CompletionItem {
                    label: item.label.clone(),
                    insert_text: format!(
                        "{live_text}{}",
                        skip_utf16(&item.insert_text, typed_units)
                    ),
                    sort_text: item.sort_text.clone(),
                    pristine: item.pristine.clone(),
                    range: Some(new_range),
                    command: item.command.clone(),
                });
            }
        }

        if !completions.is_empty() {
            tracing::debug!(
                request_id = %batch.request_id,
                count = completions.len(),
                "serving completions from cache"
            );
        }
        completions
    }
}
