//! The plan-generation pipeline.
//!
//! - [`prompt`]: [`build_prompt`] and the [`Profile`] it reads.
//! - [`provider`]: [`PlanProvider`], the backend fallback chain, and
//!   [`CANNED_PLAN`].
//! - [`parser`]: [`parse_reminders`] and [`ReminderRecord`].
//! - [`pipeline`]: [`PlanPipeline`] composing the three into a [`PlanResult`].
//! - [`events`]: [`PlanEvent`], [`PlanWarning`], and event handlers.

pub mod events;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod provider;

pub use events::{
    CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler, PlanEvent,
    PlanWarning, WarningCollector,
};
pub use parser::{ReminderRecord, parse_clock_time, parse_reminders};
pub use pipeline::{PlanPipeline, PlanResult};
pub use prompt::{Profile, build_prompt};
pub use provider::{
    CANNED_PLAN, DEFAULT_CALL_TIMEOUT, ModelListPolicy, PlanProvider, PlanProviderConfig,
};
