//! Per-user wizard state.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::plan::{PlanResult, Profile, ReminderRecord};

/// Symptoms offered on the selection step, in display order.
pub const COMMON_SYMPTOMS: [&str; 15] = [
    "Fever",
    "Headache",
    "Cough",
    "Sore throat",
    "Fatigue",
    "Muscle pain",
    "Nausea",
    "Dizziness",
    "Insomnia",
    "Loss of appetite",
    "Diarrhea",
    "Constipation",
    "Heartburn",
    "Back pain",
    "Joint pain",
];

pub const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];

pub const AGE_RANGE: RangeInclusive<u32> = 1..=120;
pub const DEFAULT_AGE: u32 = 25;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=200.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 100.0..=250.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;

// ── Step ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Profile,
    Symptoms,
    Plan,
}

impl Step {
    /// 1-based position shown in the progress indicator.
    pub fn number(self) -> u8 {
        match self {
            Step::Profile => 1,
            Step::Symptoms => 2,
            Step::Plan => 3,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Profile => "profile",
            Step::Symptoms => "symptoms",
            Step::Plan => "plan",
        })
    }
}

// ── SymptomSet ─────────────────────────────────────────────────────

/// Insertion-ordered set of symptom strings, unique by exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomSet(Vec<String>);

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `symptom` unless it is blank or already present. Returns whether
    /// it was added.
    pub fn insert(&mut self, symptom: impl Into<String>) -> bool {
        let symptom = symptom.into();
        if symptom.trim().is_empty() || self.contains(&symptom) {
            return false;
        }
        self.0.push(symptom);
        true
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.0.iter().any(|s| s == symptom)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SymptomSet::new();
        for symptom in iter {
            set.insert(symptom);
        }
        set
    }
}

// ── SessionState ───────────────────────────────────────────────────

/// Everything one user's wizard remembers between requests.
///
/// Owned by a single session; the web layer keys these by session id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub step: Step,
    pub profile: Profile,
    pub symptoms: SymptomSet,
    pub plan: Option<PlanResult>,
    /// Warnings to show on the next render.
    pub warnings: Vec<String>,
    /// Bumped by every reset and every accepted generate request. A plan
    /// produced for an older generation is never attached.
    #[serde(default)]
    pub generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to step 1 with nothing collected.
    pub fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    /// Enter the plan step for a new generate request.
    pub fn begin_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.step = Step::Plan;
        self.plan = None;
        self.generation
    }

    /// On the plan step with no plan attached yet.
    pub fn needs_plan(&self) -> bool {
        self.step == Step::Plan && self.plan.is_none()
    }

    /// Attach a generated plan unless one is already present.
    pub fn attach_plan(&mut self, result: PlanResult) -> bool {
        if self.plan.is_some() {
            return false;
        }
        self.plan = Some(result);
        true
    }

    /// Attach a plan produced for `generation`, only if the session is
    /// still waiting on that same request.
    pub fn attach_plan_for(&mut self, generation: u64, result: PlanResult) -> bool {
        self.generation == generation && self.needs_plan() && self.attach_plan(result)
    }

    /// Flip completion of reminder `index`, returning the new value.
    pub fn toggle_reminder(&mut self, index: usize) -> Option<bool> {
        let reminder: &mut ReminderRecord = self.plan.as_mut()?.reminders.get_mut(index)?;
        reminder.completed = !reminder.completed;
        Some(reminder.completed)
    }
}
