//! Completion lifecycle coordination
//!
//! [`CompletionService`] is the single writer over the suggestion cache
//! and the glue between the host editor's callbacks and the telemetry
//! events. Every batch moves through a strict lifecycle: fetched, shown
//! zero or more times, then exactly one of accepted, declined, or
//! ignored. Each terminal transition emits exactly one event.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::SuggestionCache;
use crate::config::{CompletionConfig, CompletionConfigOverrides};
use crate::document::{utf16_substring, Document};
use crate::error::CompletionResult;
use crate::events::{AcceptEvent, DeclineEvent, GhostEventEmitter, IgnoreEvent};
use crate::provider::{SuggestionFetcher, SuggestionProvider};
use crate::types::{CompletionItem, DiscardReason, Position, SuggestionBatch};

/// The host editor operations the service needs to drive back
pub trait EditorSurface {
    /// Hide any currently rendered ghost text
    fn hide_ghost_text(&self);
}

/// Orchestrates prompt building, request coalescing, caching, and
/// lifecycle event emission for inline completions
pub struct CompletionService {
    config: CompletionConfig,
    cache: Mutex<SuggestionCache>,
    provider: SuggestionProvider,
    events: Arc<GhostEventEmitter>,
}

impl CompletionService {
    /// Create a service over a suggestion backend, with user overrides
    /// deep-merged over the default configuration
    pub fn new(
        fetcher: Arc<dyn SuggestionFetcher>,
        overrides: Option<CompletionConfigOverrides>,
    ) -> CompletionResult<Self> {
        let config = CompletionConfig::resolve(overrides)?;
        let events = Arc::new(GhostEventEmitter::new());
        let provider = SuggestionProvider::new(fetcher, Arc::clone(&events), &config);
        Ok(Self {
            config,
            cache: Mutex::new(SuggestionCache::new()),
            provider,
            events,
        })
    }

    /// The lifecycle event channel, for telemetry subscribers
    pub fn events(&self) -> &Arc<GhostEventEmitter> {
        &self.events
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// The editor's completion request: serve from cache when the batch
    /// still matches the typed text, otherwise finalize the previous
    /// batch and go through the debounced provider.
    pub async fn provide_inline_completions(
        &self,
        document: &dyn Document,
        cursor: Position,
    ) -> Vec<CompletionItem> {
        if self.config.suggestion_cache.enabled {
            let cached = self.cache.lock().cached_completions(document, cursor);
            if !cached.is_empty() {
                return cached;
            }
        }

        self.dismiss_previous();

        let bundle = self.provider.request(document, cursor).await;
        if !bundle.suggestions.is_empty() {
            self.cache.lock().set_batch(SuggestionBatch::new(
                bundle.suggestions.clone(),
                bundle.request_id,
            ));
        }
        bundle.suggestions
    }

    /// The editor reported that `item` was rendered as ghost text
    pub fn handle_item_did_show(&self, item: &CompletionItem) {
        if !self.config.suggestion_cache.enabled {
            return;
        }
        self.cache.lock().increment_shown_count(&item.pristine);
    }

    /// The editor reported a word/line-wise partial accept of `item`,
    /// consuming the first `accepted_letters` units of its insert text
    pub fn handle_partial_accept(&self, item: &CompletionItem, accepted_letters: usize) {
        let command = &item.command;
        if command.request_id.is_empty() || command.suggestion_text.is_empty() {
            return;
        }

        let accepted_text =
            utf16_substring(&item.insert_text, command.prev_word_length, accepted_letters);
        if accepted_text.is_empty() {
            return;
        }

        self.cache.lock().mark_accepted(&command.suggestion_text);
        self.events.emit_accept(&AcceptEvent {
            request_id: command.request_id.clone(),
            accepted_text,
        });
    }

    /// The accept command fired: the full suggestion went into the document
    pub fn handle_accept(&self, request_id: &str, suggestion_text: &str) {
        self.cache.lock().clear();
        self.events.emit_accept(&AcceptEvent {
            request_id: request_id.to_string(),
            accepted_text: suggestion_text.to_string(),
        });
    }

    /// Explicit discard (Escape, cancel command). Emits one decline for
    /// the current batch, clears the cache, and hides the ghost text.
    /// A second call with an already-cleared cache only hides.
    pub fn command_discard(&self, reason: DiscardReason, editor: &dyn EditorSurface) {
        let (batch, active) = self.take_current();
        if let Some(batch) = batch {
            if !batch.request_id.is_empty() && !batch.items.is_empty() {
                self.events.emit_decline(&DeclineEvent {
                    request_id: batch.request_id.clone(),
                    suggestion_text: active_text(&batch, active),
                    reason,
                    hit_count: batch.shown_count,
                    all_suggestions: pristine_texts(&batch),
                });
            }
        }
        editor.hide_ghost_text();
    }

    /// Whether a batch with at least one suggestion is currently cached
    pub fn has_active_suggestions(&self) -> bool {
        self.cache
            .lock()
            .batch()
            .is_some_and(|batch| !batch.items.is_empty())
    }

    pub fn empty_cache(&self) {
        self.cache.lock().clear();
    }

    /// Finalize the batch a new request supersedes: a batch the user saw
    /// and did not accept is reported as ignored; one that was never
    /// shown is dropped silently.
    fn dismiss_previous(&self) {
        let (batch, active) = self.take_current();
        let Some(batch) = batch else { return };
        if batch.request_id.is_empty()
            || batch.items.is_empty()
            || batch.shown_count == 0
            || batch.was_accepted
        {
            return;
        }
        self.events.emit_ignore(&IgnoreEvent {
            request_id: batch.request_id.clone(),
            suggestion_text: active_text(&batch, active),
            all_suggestions: pristine_texts(&batch),
        });
    }

    fn take_current(&self) -> (Option<SuggestionBatch>, Option<String>) {
        let mut cache = self.cache.lock();
        let active = cache.active_suggestion().map(str::to_string);
        (cache.take_batch(), active)
    }
}

fn active_text(batch: &SuggestionBatch, active: Option<String>) -> String {
    active.unwrap_or_else(|| {
        batch
            .items
            .first()
            .map(|item| item.pristine.clone())
            .unwrap_or_default()
    })
}

fn pristine_texts(batch: &SuggestionBatch) -> Vec<String> {
    batch.items.iter().map(|item| item.pristine.clone()).collect()
}
