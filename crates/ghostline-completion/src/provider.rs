//! Debounced single-flight suggestion provider
//!
//! Wraps a [`SuggestionFetcher`] with trailing-debounce and
//! single-flight semantics. The coalescer is an explicit state machine,
//! `Idle -> TimerPending -> Fetching -> Idle`, with one owned
//! shared-result slot per cycle:
//!
//! - every call in `TimerPending` cancels the running timer, replaces
//!   the document snapshot, and joins the cycle's shared outcome;
//! - a call in `Fetching` joins the in-flight outcome, so at most one
//!   backend call is dispatched per instance at any time;
//! - after the outcome resolves the state returns to `Idle` and the
//!   next call opens an independent cycle.
//!
//! Backend failures never reach the callers: they resolve to an empty
//! bundle and are reported once through the error event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::config::CompletionConfig;
use crate::document::{utf16_len, Document, WordAtPosition};
use crate::events::GhostEventEmitter;
use crate::prompt::{build_prompt, session_path};
use crate::types::{
    AcceptCommandArgs, CompletionItem, Position, PromptPayload, Range, SuggestionsBundle,
    TextLimits,
};

/// The suggestion backend. Implementations turn a prompt payload into
/// raw suggestion texts plus a request id.
#[async_trait]
pub trait SuggestionFetcher: Send + Sync {
    async fn fetch(
        &self,
        files: &[PromptPayload],
    ) -> crate::error::CompletionResult<crate::types::RawSuggestions>;
}

/// Everything the fire step needs, captured at call time. The snapshot
/// of the last call before the timer fires is the one that is sent.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub lines: Vec<String>,
    pub cursor: Position,
    pub word: WordAtPosition,
}

impl DocumentSnapshot {
    pub fn capture(document: &dyn Document, cursor: Position) -> Self {
        let lines = (1..=document.line_count())
            .map(|n| document.line(n).unwrap_or_default().to_string())
            .collect();
        Self {
            lines,
            cursor,
            word: document.word_until_position(cursor),
        }
    }
}

type SharedBundle = Shared<BoxFuture<'static, SuggestionsBundle>>;

enum Phase {
    Idle,
    TimerPending {
        snapshot: Box<DocumentSnapshot>,
        generation: u64,
        tx: oneshot::Sender<SuggestionsBundle>,
        shared: SharedBundle,
    },
    Fetching {
        shared: SharedBundle,
    },
}

struct ProviderInner {
    fetcher: Arc<dyn SuggestionFetcher>,
    events: Arc<GhostEventEmitter>,
    debounce: Duration,
    limits: TextLimits,
    phase: Mutex<Phase>,
    generation: AtomicU64,
}

/// Debounce + single-flight coalescer in front of the backend
pub struct SuggestionProvider {
    inner: Arc<ProviderInner>,
}

impl SuggestionProvider {
    pub fn new(
        fetcher: Arc<dyn SuggestionFetcher>,
        events: Arc<GhostEventEmitter>,
        config: &CompletionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                fetcher,
                events,
                debounce: Duration::from_millis(config.debounce_time),
                limits: config.text_limits,
                phase: Mutex::new(Phase::Idle),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Request suggestions for the document state at `cursor`. Rapid
    /// repeated calls coalesce into one backend call; every caller of a
    /// cycle receives a structurally equal bundle.
    pub async fn request(&self, document: &dyn Document, cursor: Position) -> SuggestionsBundle {
        let snapshot = DocumentSnapshot::capture(document, cursor);
        let shared = self.join_cycle(snapshot);
        shared.await
    }

    fn join_cycle(&self, new_snapshot: DocumentSnapshot) -> SharedBundle {
        let inner = &self.inner;
        let mut phase = inner.phase.lock();
        match &mut *phase {
            Phase::Fetching { shared } => shared.clone(),
            Phase::TimerPending {
                snapshot,
                generation,
                shared,
                ..
            } => {
                // restart the trailing timer; the superseded one sees a
                // stale generation and never fires
                *snapshot = Box::new(new_snapshot);
                let next = inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
                *generation = next;
                spawn_timer(Arc::clone(inner), next);
                shared.clone()
            }
            Phase::Idle => {
                let (tx, rx) = oneshot::channel::<SuggestionsBundle>();
                let shared: SharedBundle = rx
                    .map(|result| result.unwrap_or_default())
                    .boxed()
                    .shared();
                let next = inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
                *phase = Phase::TimerPending {
                    snapshot: Box::new(new_snapshot),
                    generation: next,
                    tx,
                    shared: shared.clone(),
                };
                spawn_timer(Arc::clone(inner), next);
                shared
            }
        }
    }
}

fn spawn_timer(inner: Arc<ProviderInner>, generation: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(inner.debounce).await;
        fire(inner, generation).await;
    });
}

/// The debounce window survived uninterrupted: dispatch the fetch and
/// resolve every waiter of the cycle.
async fn fire(inner: Arc<ProviderInner>, generation: u64) {
    let (snapshot, tx) = {
        let mut phase = inner.phase.lock();
        match std::mem::replace(&mut *phase, Phase::Idle) {
            Phase::TimerPending {
                snapshot,
                generation: current,
                tx,
                shared,
            } if current == generation => {
                *phase = Phase::Fetching { shared };
                (snapshot, tx)
            }
            other => {
                // stale timer, a newer call restarted the window
                *phase = other;
                return;
            }
        }
    };

    let bundle = fetch_bundle(&inner, *snapshot).await;
    *inner.phase.lock() = Phase::Idle;
    // waiters may have gone away; resolution is best-effort
    let _ = tx.send(bundle);
}

async fn fetch_bundle(inner: &ProviderInner, snapshot: DocumentSnapshot) -> SuggestionsBundle {
    let Some(payload) = build_prompt(
        &snapshot.lines,
        snapshot.cursor,
        &inner.limits,
        &session_path(),
    ) else {
        return SuggestionsBundle::default();
    };

    tracing::debug!(
        line = snapshot.cursor.line,
        column = snapshot.cursor.column,
        "dispatching suggestion request"
    );

    let raw = match inner.fetcher.fetch(std::slice::from_ref(&payload)).await {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(%error, "suggestion fetch failed");
            inner.events.emit_error(&error);
            return SuggestionsBundle::default();
        }
    };

    let word = &snapshot.word;
    let request_id = raw.request_id;
    let suggestions = raw
        .suggestions
        .into_iter()
        .map(|raw_suggestion| {
            let pristine = raw_suggestion.text;
            let label = format!("{}{}", word.word, pristine);
            CompletionItem {
                insert_text: label.clone(),
                label,
                sort_text: "a".to_string(),
                range: Some(Range::new(
                    Position::new(snapshot.cursor.line, word.start_column),
                    snapshot.cursor,
                )),
                command: AcceptCommandArgs {
                    request_id: request_id.clone(),
                    suggestion_text: pristine.clone(),
                    prev_word_length: utf16_len(&word.word),
                },
                pristine,
            }
        })
        .collect();

    SuggestionsBundle {
        suggestions,
        request_id,
    }
}
