//! Pure state transitions for the three-step wizard.
//!
//! [`transition`] never performs I/O. After a successful
//! [`WizardAction::Generate`] the caller checks
//! [`SessionState::needs_plan`] and runs the pipeline itself.

use serde::{Deserialize, Serialize};

use crate::plan::Profile;
use crate::wizard::session::{
    AGE_RANGE, COMMON_SYMPTOMS, DEFAULT_AGE, DEFAULT_HEIGHT_CM, DEFAULT_WEIGHT_KG, GENDER_OPTIONS,
    HEIGHT_RANGE_CM, SessionState, Step, SymptomSet, WEIGHT_RANGE_KG,
};

/// Values submitted from the profile form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: DEFAULT_AGE,
            gender: GENDER_OPTIONS[0].to_string(),
            weight_kg: DEFAULT_WEIGHT_KG,
            height_cm: DEFAULT_HEIGHT_CM,
        }
    }
}

impl ProfileForm {
    /// Prefill from a stored profile, using form defaults for missing fields.
    pub fn from_profile(profile: &Profile) -> Self {
        let defaults = Self::default();
        Self {
            name: profile.name.clone(),
            age: profile.age.unwrap_or(defaults.age),
            gender: profile.gender.clone().unwrap_or(defaults.gender),
            weight_kg: profile.weight_kg.unwrap_or(defaults.weight_kg),
            height_cm: profile.height_cm.unwrap_or(defaults.height_cm),
        }
    }

    /// Check the form and convert it into a [`Profile`].
    ///
    /// Returns the first failing check as a user-facing message.
    pub fn validate(&self) -> Result<Profile, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please enter your name".into());
        }
        if !AGE_RANGE.contains(&self.age) {
            return Err(format!(
                "Age must be between {} and {}",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            ));
        }
        if !GENDER_OPTIONS.contains(&self.gender.as_str()) {
            return Err(format!(
                "Gender must be one of: {}",
                GENDER_OPTIONS.join(", ")
            ));
        }
        if !WEIGHT_RANGE_KG.contains(&self.weight_kg) {
            return Err(format!(
                "Weight must be between {} and {} kg",
                WEIGHT_RANGE_KG.start(),
                WEIGHT_RANGE_KG.end()
            ));
        }
        if !HEIGHT_RANGE_CM.contains(&self.height_cm) {
            return Err(format!(
                "Height must be between {} and {} cm",
                HEIGHT_RANGE_CM.start(),
                HEIGHT_RANGE_CM.end()
            ));
        }
        Ok(Profile {
            name: name.to_string(),
            age: Some(self.age),
            gender: Some(self.gender.clone()),
            weight_kg: Some(self.weight_kg),
            height_cm: Some(self.height_cm),
        })
    }
}

/// A user action against the wizard.
///
/// Serialized with a `type` tag, e.g. `{"type":"toggle_reminder","index":2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction {
    SubmitProfile(ProfileForm),
    UpdateSymptoms {
        #[serde(default)]
        selected: Vec<String>,
        #[serde(default)]
        custom: String,
    },
    Back,
    Generate,
    ToggleReminder {
        index: usize,
    },
    Restart,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::SubmitProfile(_) => "submit_profile",
            WizardAction::UpdateSymptoms { .. } => "update_symptoms",
            WizardAction::Back => "back",
            WizardAction::Generate => "generate",
            WizardAction::ToggleReminder { .. } => "toggle_reminder",
            WizardAction::Restart => "restart",
        }
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    /// Validation or step-mismatch message, also queued in
    /// `state.warnings` for the next render.
    pub warning: Option<String>,
}

impl Transition {
    pub fn is_rejected(&self) -> bool {
        self.warning.is_some()
    }
}

/// Apply `action` to `state`.
///
/// Warnings left from the previous render are dropped first. A rejected
/// action leaves every other field unchanged.
pub fn transition(mut state: SessionState, action: WizardAction) -> Transition {
    state.warnings.clear();

    let outcome = match (state.step, action) {
        (_, WizardAction::Restart) => {
            state.reset();
            Ok(())
        }
        (Step::Profile, WizardAction::SubmitProfile(form)) => form.validate().map(|profile| {
            state.profile = profile;
            state.step = Step::Symptoms;
        }),
        (Step::Symptoms, WizardAction::UpdateSymptoms { selected, custom }) => {
            state.symptoms = select_symptoms(selected, &custom);
            Ok(())
        }
        (Step::Symptoms, WizardAction::Back) => {
            state.step = Step::Profile;
            Ok(())
        }
        (Step::Symptoms, WizardAction::Generate) => {
            if state.symptoms.is_empty() {
                Err("Please select at least one symptom".to_string())
            } else {
                state.begin_generation();
                Ok(())
            }
        }
        (Step::Plan, WizardAction::ToggleReminder { index }) => {
            if state.plan.is_none() {
                Err("Your plan is still being generated".to_string())
            } else {
                state
                    .toggle_reminder(index)
                    .map(|_| ())
                    .ok_or_else(|| format!("No reminder at position {index}"))
            }
        }
        (step, action) => Err(format!(
            "Action '{}' is not available on the {step} step",
            action.name()
        )),
    };

    let warning = outcome.err();
    if let Some(w) = &warning {
        state.warnings.push(w.clone());
    }
    Transition { state, warning }
}

/// Keep listed selections that are common symptoms, then the custom entry.
fn select_symptoms(selected: Vec<String>, custom: &str) -> SymptomSet {
    let mut set: SymptomSet = selected
        .into_iter()
        .filter(|s| COMMON_SYMPTOMS.contains(&s.as_str()))
        .collect();
    set.insert(custom.trim());
    set
}
