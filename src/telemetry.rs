use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// A diagnostic emitted by the extractor or the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A function definition was visited.
    FunctionFound { name: String, line: usize },
    /// The source slice of a definition was stored (or replaced an earlier one).
    SnippetExtracted { name: String, bytes: usize },
    /// A direct-name call was attributed to `caller`.
    CallFound { caller: String, callee: String },
    /// A member call (`object.attribute()`) was seen and left out of the graph.
    AttributeCallSkipped {
        caller: String,
        object: String,
        attribute: String,
    },
    /// Extraction finished.
    Extracted { functions: usize, calls: usize },
    /// Extraction failed and an empty dataset was returned instead.
    ExtractionFailed { kind: &'static str, reason: String },
    /// A presentation graph failed validation.
    ValidationFailed { reason: String },
}

/// Observability channel injected into the builder and the validator.
pub trait EventSink {
    fn record(&self, event: &Event);
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn record(&self, event: &Event) {
        (**self).record(event)
    }
}

/// Forwards events to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &Event) {
        match event {
            Event::FunctionFound { name, line } => {
                tracing::debug!(function = %name, line, "found function definition")
            }
            Event::SnippetExtracted { name, bytes } => {
                tracing::trace!(function = %name, bytes, "extracted source")
            }
            Event::CallFound { caller, callee } => {
                tracing::trace!(caller = %caller, callee = %callee, "found call")
            }
            Event::AttributeCallSkipped {
                caller,
                object,
                attribute,
            } => {
                tracing::trace!(caller = %caller, "skipped member call {object}.{attribute}()")
            }
            Event::Extracted { functions, calls } => {
                tracing::info!(functions, calls, "extracted call graph")
            }
            Event::ExtractionFailed { kind, reason } => {
                tracing::error!(kind, "error parsing code: {reason}")
            }
            Event::ValidationFailed { reason } => {
                tracing::error!("graph validation failed: {reason}")
            }
        }
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &Event) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &Event) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(event.clone());
    }
}

/// Install the global `tracing` subscriber for the CLI.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace). Logs go to stderr so stdout
/// stays clean for JSON consumers.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("code_flow={default_level}")));

    // A second install (e.g. from tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
