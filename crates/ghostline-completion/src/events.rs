//! Typed lifecycle event channel
//!
//! A fixed, closed set of events consumed by telemetry collaborators:
//! accept, decline, ignore, and error. This is deliberately not a
//! general-purpose event bus; each event has one payload shape and one
//! listener list. A panicking listener is caught and logged so it can
//! neither stop the remaining listeners nor crash the emitting call.

use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::RwLock;

use crate::error::CompletionError;
use crate::types::DiscardReason;

/// Emitted when the user accepts suggestion text, fully or partially
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptEvent {
    pub request_id: String,
    /// The text actually taken over into the document
    pub accepted_text: String,
}

/// Emitted exactly once when a batch is explicitly discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclineEvent {
    pub request_id: String,
    /// The active suggestion: the one most recently shown, falling back
    /// to the first item of the batch
    pub suggestion_text: String,
    pub reason: DiscardReason,
    /// How many times the batch was shown before the discard
    pub hit_count: u32,
    /// Pristine texts of every suggestion in the batch
    pub all_suggestions: Vec<String>,
}

/// Emitted when a shown batch is superseded without an explicit discard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreEvent {
    pub request_id: String,
    pub suggestion_text: String,
    pub all_suggestions: Vec<String>,
}

type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Publish/subscribe channel for the completion lifecycle events
#[derive(Default)]
pub struct GhostEventEmitter {
    accept: RwLock<Vec<Listener<AcceptEvent>>>,
    decline: RwLock<Vec<Listener<DeclineEvent>>>,
    ignore: RwLock<Vec<Listener<IgnoreEvent>>>,
    error: RwLock<Vec<Listener<CompletionError>>>,
}

impl GhostEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_accept(&self, listener: impl Fn(&AcceptEvent) + Send + Sync + 'static) {
        self.accept.write().push(Box::new(listener));
    }

    pub fn on_decline(&self, listener: impl Fn(&DeclineEvent) + Send + Sync + 'static) {
        self.decline.write().push(Box::new(listener));
    }

    pub fn on_ignore(&self, listener: impl Fn(&IgnoreEvent) + Send + Sync + 'static) {
        self.ignore.write().push(Box::new(listener));
    }

    pub fn on_error(&self, listener: impl Fn(&CompletionError) + Send + Sync + 'static) {
        self.error.write().push(Box::new(listener));
    }

    pub fn emit_accept(&self, event: &AcceptEvent) {
        Self::dispatch("completion:accept", &self.accept, event);
    }

    pub fn emit_decline(&self, event: &DeclineEvent) {
        Self::dispatch("completion:decline", &self.decline, event);
    }

    pub fn emit_ignore(&self, event: &IgnoreEvent) {
        Self::dispatch("completion:ignore", &self.ignore, event);
    }

    pub fn emit_error(&self, error: &CompletionError) {
        Self::dispatch("completion:error", &self.error, error);
    }

    fn dispatch<T>(name: &str, listeners: &RwLock<Vec<Listener<T>>>, event: &T) {
        for listener in listeners.read().iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::error!(event = name, "completion event listener panicked");
            }
        }
    }
}

impl std::fmt::Debug for GhostEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhostEventEmitter")
            .field("accept_listeners", &self.accept.read().len())
            .field("decline_listeners", &self.decline.read().len())
            .field("ignore_listeners", &self.ignore.read().len())
            .field("error_listeners", &self.error.read().len())
            .finish()
    }
}
