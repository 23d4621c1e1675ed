//! Prompt → provider → parser composition.

use serde::{Deserialize, Serialize};

use crate::plan::events::{EventHandler, NoopHandler, PlanEvent};
use crate::plan::parser::{ReminderRecord, parse_reminders};
use crate::plan::prompt::{Profile, build_prompt};
use crate::plan::provider::PlanProvider;

/// Raw plan text and the reminders parsed from it.
///
/// Produced once per "generate" action; the wizard keeps it for the rest of
/// the session and only mutates reminder completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub raw_text: String,
    pub reminders: Vec<ReminderRecord>,
}

impl PlanResult {
    /// Parse `raw_text` into a result.
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let reminders = parse_reminders(&raw_text);
        Self {
            raw_text,
            reminders,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.reminders.iter().filter(|r| r.completed).count()
    }
}

/// Runs one plan generation end to end.
///
/// ```ignore
/// let result = PlanPipeline::new(&provider)
///     .with_event_handler(&LoggingHandler)
///     .run(&symptoms, &profile)
///     .await;
/// ```
pub struct PlanPipeline<'a> {
    provider: &'a PlanProvider,
    events: &'a dyn EventHandler,
}

impl<'a> PlanPipeline<'a> {
    pub fn new(provider: &'a PlanProvider) -> Self {
        Self {
            provider,
            events: &NoopHandler,
        }
    }

    pub fn with_event_handler(mut self, events: &'a dyn EventHandler) -> Self {
        self.events = events;
        self
    }

    /// Build the prompt, generate (never fails), and parse.
    ///
    /// The pipeline does not memoize; callers that must not regenerate check
    /// for an existing result first.
    pub async fn run(&self, symptoms: &[String], profile: &Profile) -> PlanResult {
        let prompt = build_prompt(symptoms, profile);
        let raw_text = self.provider.generate(&prompt, self.events).await;
        let result = PlanResult::from_text(raw_text);

        let timed = result
            .reminders
            .iter()
            .filter(|r| r.clock_time.is_some())
            .count();
        self.events.on_event(&PlanEvent::Parsed {
            reminders: result.reminders.len(),
            timed,
        });
        result
    }
}
