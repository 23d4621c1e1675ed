//! Events and handlers for plan generation.
//!
//! The provider and pipeline report what they decided through
//! [`PlanEvent`] values. Fallbacks carry a [`PlanWarning`]; this is the
//! caller-visible warning channel, since generation itself never fails.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`WarningCollector`] | Surface warnings to a UI after the run |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ── Warnings ───────────────────────────────────────────────────────

/// Why the provider fell back to the canned plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanWarning {
    /// None of the prioritized models is listed as available.
    ModelsUnavailable,
    /// A list or generate call failed or timed out.
    TechnicalDifficulty,
}

impl PlanWarning {
    /// User-facing message.
    pub fn message(self) -> &'static str {
        match self {
            Self::ModelsUnavailable => {
                "Gemini models are currently unavailable. Showing generic wellness plan."
            }
            Self::TechnicalDifficulty => {
                "We're experiencing technical difficulties. Showing generic wellness plan."
            }
        }
    }
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted while generating and parsing a plan.
#[derive(Debug)]
pub enum PlanEvent<'a> {
    /// The service reported its available models.
    ModelsListed { count: usize },
    /// A backend was chosen from the priority list.
    BackendSelected { model: &'a str },
    /// The backend returned text.
    Generated { model: &'a str, chars: usize },
    /// The canned plan is being returned instead of generated text.
    Fallback {
        warning: PlanWarning,
        /// Underlying cause, for logs. Never shown to the user.
        detail: &'a str,
    },
    /// Plan text was parsed into reminders.
    Parsed { reminders: usize, timed: usize },
}

impl PlanEvent<'_> {
    /// The warning carried by a `Fallback` event.
    pub fn warning(&self) -> Option<PlanWarning> {
        match self {
            PlanEvent::Fallback { warning, .. } => Some(*warning),
            _ => None,
        }
    }
}

/// Observer for [`PlanEvent`]s.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &PlanEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// Logs every event through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &PlanEvent<'_>) {
        match event {
            PlanEvent::ModelsListed { count } => debug!("{count} model(s) available"),
            PlanEvent::BackendSelected { model } => info!("Using backend {model}"),
            PlanEvent::Generated { model, chars } => {
                info!("Generated plan with {model} ({chars} chars)")
            }
            PlanEvent::Fallback { warning, detail } => {
                warn!("Falling back to canned plan: {warning:?} ({detail})")
            }
            PlanEvent::Parsed { reminders, timed } => {
                debug!("Parsed {reminders} reminder(s), {timed} with a clock time")
            }
        }
    }
}

/// Records fallback warnings so a UI can display them after the run.
#[derive(Default)]
pub struct WarningCollector {
    warnings: Mutex<Vec<PlanWarning>>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings recorded so far, in emission order.
    pub fn warnings(&self) -> Vec<PlanWarning> {
        self.warnings
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    /// Remove and return the recorded warnings.
    pub fn take(&self) -> Vec<PlanWarning> {
        self.warnings
            .lock()
            .map(|mut w| std::mem::take(&mut *w))
            .unwrap_or_default()
    }
}

impl EventHandler for WarningCollector {
    fn on_event(&self, event: &PlanEvent<'_>) {
        if let Some(warning) = event.warning()
            && let Ok(mut w) = self.warnings.lock()
        {
            w.push(warning);
        }
    }
}

/// An event handler backed by a closure.
pub struct FnEventHandler<F>(F)
where
    F: Fn(&PlanEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&PlanEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&PlanEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &PlanEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to every inner handler, in registration order.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with(WarningCollector::new());
/// ```
pub struct CompositeEventHandler<'a> {
    handlers: Vec<Box<dyn EventHandler + 'a>>,
}

impl<'a> CompositeEventHandler<'a> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'a) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Conditionally add a handler, keeping the builder chain intact.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'a) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler<'_> {
    fn on_event(&self, event: &PlanEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

impl<T: EventHandler + ?Sized> EventHandler for &T {
    fn on_event(&self, event: &PlanEvent<'_>) {
        (**self).on_event(event)
    }
}
