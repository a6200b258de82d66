//! Suggestion batch lifecycle: show, accept, partial accept, decline,
//! and implicit ignore, each with exactly one event per terminal state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ghostline_completion::{
    AcceptEvent, CompletionConfigOverrides, CompletionResult, CompletionService, DeclineEvent,
    DiscardReason, EditorSurface, IgnoreEvent, LinesDocument, Position, PromptPayload,
    RawSuggestion, RawSuggestions, SuggestionCacheOverrides, SuggestionFetcher,
};
use parking_lot::Mutex;

struct StaticFetcher {
    calls: AtomicUsize,
    texts: Vec<String>,
}

impl StaticFetcher {
    fn new(texts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            texts: texts.iter().map(|t| t.to_string()).collect(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionFetcher for StaticFetcher {
    async fn fetch(&self, _files: &[PromptPayload]) -> CompletionResult<RawSuggestions> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RawSuggestions {
            suggestions: self
                .texts
                .iter()
                .map(|text| RawSuggestion { text: text.clone() })
                .collect(),
            request_id: format!("req-{call}"),
        })
    }
}

#[derive(Default)]
struct RecordingSurface {
    hides: AtomicUsize,
}

impl EditorSurface for RecordingSurface {
    fn hide_ghost_text(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct EventLog {
    accepts: Mutex<Vec<AcceptEvent>>,
    declines: Mutex<Vec<DeclineEvent>>,
    ignores: Mutex<Vec<IgnoreEvent>>,
}

impl EventLog {
    fn attach(self: &Arc<Self>, service: &CompletionService) {
        let log = Arc::clone(self);
        service
            .events()
            .on_accept(move |event| log.accepts.lock().push(event.clone()));
        let log = Arc::clone(self);
        service
            .events()
            .on_decline(move |event| log.declines.lock().push(event.clone()));
        let log = Arc::clone(self);
        service
            .events()
            .on_ignore(move |event| log.ignores.lock().push(event.clone()));
    }
}

fn service_with(fetcher: Arc<dyn SuggestionFetcher>) -> (CompletionService, Arc<EventLog>) {
    let service = CompletionService::new(fetcher, None).unwrap();
    let log = Arc::new(EventLog::default());
    log.attach(&service);
    (service, log)
}

fn sel_document() -> LinesDocument {
    LinesDocument::from_text("sel")
}

#[tokio::test(start_paused = true)]
async fn test_fetch_installs_batch_and_serves_items() {
    let fetcher = StaticFetcher::new(&["ection", "ector"]);
    let (service, _log) = service_with(fetcher.clone());
    let document = sel_document();

    let items = service
        .provide_inline_completions(&document, Position::new(1, 4))
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].insert_text, "selection");
    assert_eq!(items[1].insert_text, "selector");
    assert!(service.has_active_suggestions());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_continued_typing_hits_cache_without_new_fetch() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, _log) = service_with(fetcher.clone());

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    assert_eq!(items.len(), 1);

    // the user types the next suggested character
    let typed = LinesDocument::from_text("sele");
    let items = service
        .provide_inline_completions(&typed, Position::new(1, 5))
        .await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].insert_text, "selection");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_diverging_typing_misses_cache_and_refetches() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, _log) = service_with(fetcher.clone());

    service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;

    let diverged = LinesDocument::from_text("sela");
    service
        .provide_inline_completions(&diverged, Position::new(1, 5))
        .await;

    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_shown_batch_emits_one_ignore() {
    let fetcher = StaticFetcher::new(&["ection", "ector"]);
    let (service, log) = service_with(fetcher);

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    service.handle_item_did_show(&items[1]);

    let diverged = LinesDocument::from_text("sela");
    service
        .provide_inline_completions(&diverged, Position::new(1, 5))
        .await;

    let ignores = log.ignores.lock();
    assert_eq!(ignores.len(), 1);
    assert_eq!(ignores[0].request_id, "req-1");
    // the active suggestion is the one most recently shown
    assert_eq!(ignores[0].suggestion_text, "ector");
    assert_eq!(ignores[0].all_suggestions, vec!["ection", "ector"]);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_unshown_batch_is_dropped_silently() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, log) = service_with(fetcher);

    service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;

    let diverged = LinesDocument::from_text("sela");
    service
        .provide_inline_completions(&diverged, Position::new(1, 5))
        .await;

    assert!(log.ignores.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_accepted_batch_is_not_reported_ignored() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, log) = service_with(fetcher);

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    service.handle_item_did_show(&items[0]);
    service.handle_partial_accept(&items[0], 6);

    let diverged = LinesDocument::from_text("sela");
    service
        .provide_inline_completions(&diverged, Position::new(1, 5))
        .await;

    assert!(log.ignores.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_partial_accept_emits_accepted_slice() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, log) = service_with(fetcher);

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    // insert text "selection", typed word "sel": accepting 6 units
    // consumes "ect" beyond the already-typed prefix
    service.handle_partial_accept(&items[0], 6);

    let accepts = log.accepts.lock();
    assert_eq!(accepts.len(), 1);
    assert_eq!(accepts[0].request_id, "req-1");
    assert_eq!(accepts[0].accepted_text, "ect");
}

#[tokio::test(start_paused = true)]
async fn test_partial_accept_within_typed_prefix_is_noop() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, log) = service_with(fetcher);

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    service.handle_partial_accept(&items[0], 2);

    assert!(log.accepts.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_full_accept_clears_cache_and_emits_accept() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, log) = service_with(fetcher);

    service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    service.handle_accept("req-1", "ection");

    assert!(!service.has_active_suggestions());
    let accepts = log.accepts.lock();
    assert_eq!(accepts.len(), 1);
    assert_eq!(accepts[0].accepted_text, "ection");
}

#[tokio::test(start_paused = true)]
async fn test_discard_emits_decline_exactly_once() {
    let fetcher = StaticFetcher::new(&["ection", "ector"]);
    let (service, log) = service_with(fetcher);
    let surface = RecordingSurface::default();

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    service.handle_item_did_show(&items[0]);
    service.handle_item_did_show(&items[0]);

    service.command_discard(DiscardReason::OnCancel, &surface);
    // cache is already empty, so this is a no-op apart from hiding
    service.command_discard(DiscardReason::OnCancel, &surface);

    let declines = log.declines.lock();
    assert_eq!(declines.len(), 1);
    assert_eq!(declines[0].request_id, "req-1");
    assert_eq!(declines[0].suggestion_text, "ection");
    assert_eq!(declines[0].reason, DiscardReason::OnCancel);
    assert_eq!(declines[0].hit_count, 2);
    assert_eq!(declines[0].all_suggestions, vec!["ection", "ector"]);
    assert_eq!(surface.hides.load(Ordering::SeqCst), 2);
    assert!(!service.has_active_suggestions());
}

#[tokio::test(start_paused = true)]
async fn test_discard_with_empty_cache_emits_nothing() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let (service, log) = service_with(fetcher);
    let surface = RecordingSurface::default();

    service.command_discard(DiscardReason::OnCancel, &surface);

    assert!(log.declines.lock().is_empty());
    assert_eq!(surface.hides.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_cache_skips_shown_tracking() {
    let fetcher = StaticFetcher::new(&["ection"]);
    let overrides = CompletionConfigOverrides {
        suggestion_cache: Some(SuggestionCacheOverrides {
            enabled: Some(false),
        }),
        ..Default::default()
    };
    let service = CompletionService::new(fetcher.clone(), Some(overrides)).unwrap();
    let log = Arc::new(EventLog::default());
    log.attach(&service);
    let surface = RecordingSurface::default();

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;
    service.handle_item_did_show(&items[0]);

    service.command_discard(DiscardReason::OnCancel, &surface);
    let declines = log.declines.lock();
    assert_eq!(declines.len(), 1);
    // the show was not recorded while the cache is disabled
    assert_eq!(declines[0].hit_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_backend_result_leaves_no_batch() {
    let fetcher = StaticFetcher::new(&[]);
    let (service, log) = service_with(fetcher);

    let items = service
        .provide_inline_completions(&sel_document(), Position::new(1, 4))
        .await;

    assert!(items.is_empty());
    assert!(!service.has_active_suggestions());
    assert!(log.ignores.lock().is_empty());
}
