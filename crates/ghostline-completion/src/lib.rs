//! Ghostline Completion Core
//!
//! Inline ("ghost text") code-completion support for a host editor:
//! prompt windowing, debounced request coalescing, suggestion caching,
//! and lifecycle telemetry events.
//!
//! # Architecture
//!
//! The pipeline has four tightly coupled parts:
//!
//! 1. **Prompt window** ([`prompt`]): turns document lines and a cursor
//!    into a bounded request payload (before/after fragments).
//! 2. **Request coalescer** ([`provider`]): wraps a
//!    [`SuggestionFetcher`] backend with trailing debounce and
//!    single-flight semantics, so rapid keystrokes cost one backend
//!    call and every caller of a cycle sees the same outcome.
//! 3. **Suggestion cache** ([`cache`]): keeps the most recent batch and
//!    serves continued correct typing locally, invalidating the moment
//!    the user diverges from the offered text.
//! 4. **Lifecycle coordination** ([`service`]): routes every cache
//!    mutation through a strict show/accept/decline/ignore lifecycle
//!    and emits exactly one telemetry event per terminal transition on
//!    the typed [`GhostEventEmitter`] channel.
//!
//! The host editor stays behind two small seams: the [`Document`] trait
//! for reading the buffer (1-based positions, UTF-16 columns) and the
//! [`EditorSurface`] trait for hiding rendered ghost text. The backend
//! stays behind [`SuggestionFetcher`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ghostline_completion::{CompletionService, LinesDocument, Position};
//!
//! let service = CompletionService::new(Arc::new(MyBackend), None)?;
//! service.events().on_accept(|event| {
//!     println!("accepted {} for {}", event.accepted_text, event.request_id);
//! });
//!
//! let document = LinesDocument::from_text("SELECT * FR");
//! let items = service
//!     .provide_inline_completions(&document, Position::new(1, 12))
//!     .await;
//! ```
//!
//! # Failure model
//!
//! Nothing here is fatal. Malformed documents or cursors produce no
//! payload; backend failures resolve to zero suggestions plus one error
//! event; a panicking event listener is isolated and logged. The worst
//! case of any failure is "no suggestion shown this cycle".

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod prompt;
pub mod provider;
pub mod service;
pub mod types;

// Re-export public types and traits
pub use cache::SuggestionCache;
pub use config::{
    CompletionConfig, CompletionConfigOverrides, ConfigFormat, ConfigLoader,
    SuggestionCacheConfig, SuggestionCacheOverrides, TextLimitsOverrides,
};
pub use document::{Document, LinesDocument, WordAtPosition};
pub use error::{CompletionError, CompletionResult};
pub use events::{AcceptEvent, DeclineEvent, GhostEventEmitter, IgnoreEvent};
pub use prompt::{build_prompt, session_path};
pub use provider::{DocumentSnapshot, SuggestionFetcher, SuggestionProvider};
pub use service::{CompletionService, EditorSurface};
pub use types::{
    AcceptCommandArgs, CompletionItem, DiscardReason, Position, PromptFragment, PromptPayload,
    Range, RawSuggestion, RawSuggestions, SuggestionBatch, SuggestionsBundle, TextLimits,
};
