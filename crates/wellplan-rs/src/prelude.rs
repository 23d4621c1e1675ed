//! Convenience re-exports for common `wellplan-rs` types.
//!
//! ```ignore
//! use wellplan_rs::prelude::*;
//! ```
//!
//! Covers the client, the plan pipeline, event handlers, the wizard, and
//! configuration. Wire-level types (safety settings, generation config) are
//! left out; import those from the crate root when needed.

// ── Client ──────────────────────────────────────────────────────────
pub use crate::GeminiClient;
pub use crate::api::{GenerationService, ServiceError};

// ── Plan pipeline ───────────────────────────────────────────────────
pub use crate::plan::{
    CANNED_PLAN, ModelListPolicy, PlanPipeline, PlanProvider, PlanProviderConfig, PlanResult,
    Profile, ReminderRecord, build_prompt, parse_reminders,
};

// ── Events ──────────────────────────────────────────────────────────
pub use crate::plan::{
    CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler, PlanEvent,
    PlanWarning, WarningCollector,
};

// ── Wizard ──────────────────────────────────────────────────────────
pub use crate::wizard::{
    COMMON_SYMPTOMS, ProfileForm, SessionState, Step, SymptomSet, WizardAction, WizardView,
    render, transition,
};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::{AppConfig, ConfigError};
