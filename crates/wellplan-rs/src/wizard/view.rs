//! Pure rendering of [`SessionState`] into a serializable view model.

use serde::Serialize;

use crate::wizard::session::{
    AGE_RANGE, COMMON_SYMPTOMS, GENDER_OPTIONS, HEIGHT_RANGE_CM, SessionState, Step,
    WEIGHT_RANGE_KG,
};
use crate::wizard::transition::ProfileForm;

pub const APP_TITLE: &str = "Crazy Health Buddy";

pub const DISCLAIMER: &str = "This plan is general wellness advice, not medical advice. \
Consult a doctor about persistent or severe symptoms.";

/// Everything a front end needs to draw the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    pub step: Step,
    pub step_number: u8,
    pub title: &'static str,
    pub warnings: Vec<String>,
    pub body: ViewBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewBody {
    Profile(ProfileView),
    Symptoms(SymptomsView),
    Plan(PlanView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub form: ProfileForm,
    pub gender_options: &'static [&'static str],
    pub age: Bounds<u32>,
    pub weight_kg: Bounds<f64>,
    pub height_cm: Bounds<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomsView {
    pub options: &'static [&'static str],
    /// Current selection, common and custom, in insertion order.
    pub selected: Vec<String>,
    /// Entries of `selected` that are not common symptoms.
    pub custom: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderView {
    pub index: usize,
    pub label: String,
    pub activity: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub treatment_description: String,
    /// No plan attached yet; the front end shows a spinner.
    pub pending: bool,
    pub reminders: Vec<ReminderView>,
    pub completed: usize,
    pub disclaimer: &'static str,
}

/// Step subtitle as shown above the form.
pub fn step_title(step: Step) -> &'static str {
    match step {
        Step::Profile => "Tell Me About Yourself",
        Step::Symptoms => "Select Your Symptoms",
        Step::Plan => "Treatment Description",
    }
}

/// The one-line summary shown above the reminders.
pub fn treatment_description(symptoms: &[String]) -> String {
    format!(
        "Based on your symptoms: {}, here is a brief treatment plan.",
        symptoms.join(", ")
    )
}

pub fn render(state: &SessionState) -> WizardView {
    let body = match state.step {
        Step::Profile => ViewBody::Profile(ProfileView {
            form: ProfileForm::from_profile(&state.profile),
            gender_options: &GENDER_OPTIONS,
            age: Bounds {
                min: *AGE_RANGE.start(),
                max: *AGE_RANGE.end(),
            },
            weight_kg: Bounds {
                min: *WEIGHT_RANGE_KG.start(),
                max: *WEIGHT_RANGE_KG.end(),
            },
            height_cm: Bounds {
                min: *HEIGHT_RANGE_CM.start(),
                max: *HEIGHT_RANGE_CM.end(),
            },
        }),
        Step::Symptoms => ViewBody::Symptoms(SymptomsView {
            options: &COMMON_SYMPTOMS,
            selected: state.symptoms.as_slice().to_vec(),
            custom: state
                .symptoms
                .iter()
                .filter(|s| !COMMON_SYMPTOMS.contains(s))
                .map(str::to_string)
                .collect(),
        }),
        Step::Plan => {
            let reminders: Vec<ReminderView> = state
                .plan
                .iter()
                .flat_map(|p| p.reminders.iter())
                .enumerate()
                .map(|(index, r)| ReminderView {
                    index,
                    label: r.time_label(),
                    activity: r.activity.clone(),
                    completed: r.completed,
                })
                .collect();
            ViewBody::Plan(PlanView {
                treatment_description: treatment_description(state.symptoms.as_slice()),
                pending: state.plan.is_none(),
                completed: reminders.iter().filter(|r| r.completed).count(),
                reminders,
                disclaimer: DISCLAIMER,
            })
        }
    };

    WizardView {
        step: state.step,
        step_number: state.step.number(),
        title: step_title(state.step),
        warnings: state.warnings.clone(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanResult, Profile};

    #[test]
    fn profile_view_uses_defaults() {
        let view = render(&SessionState::new());
        assert_eq!(view.step_number, 1);
        assert_eq!(view.title, "Tell Me About Yourself");
        let ViewBody::Profile(p) = view.body else {
            panic!("expected profile view");
        };
        assert_eq!(p.form, ProfileForm::default());
        assert_eq!(p.form.age, 25);
        assert_eq!(p.age, Bounds { min: 1, max: 120 });
        assert_eq!(p.gender_options, ["Male", "Female", "Other"]);
    }

    #[test]
    fn profile_view_prefills_stored_values() {
        let state = SessionState {
            profile: Profile {
                name: "Ana".into(),
                age: Some(41),
                gender: Some("Female".into()),
                weight_kg: Some(60.0),
                height_cm: Some(165.0),
            },
            ..Default::default()
        };
        let ViewBody::Profile(p) = render(&state).body else {
            panic!("expected profile view");
        };
        assert_eq!(p.form.name, "Ana");
        assert_eq!(p.form.age, 41);
        assert_eq!(p.form.gender, "Female");
    }

    #[test]
    fn symptoms_view_splits_custom_entries() {
        let mut state = SessionState {
            step: Step::Symptoms,
            ..Default::default()
        };
        state.symptoms.insert("Fever");
        state.symptoms.insert("Earache");
        let ViewBody::Symptoms(s) = render(&state).body else {
            panic!("expected symptoms view");
        };
        assert_eq!(s.options.len(), 15);
        assert_eq!(s.selected, ["Fever", "Earache"]);
        assert_eq!(s.custom, ["Earache"]);
    }

    #[test]
    fn plan_view_pending_then_filled() {
        let mut state = SessionState {
            step: Step::Plan,
            ..Default::default()
        };
        state.symptoms.insert("Fever");
        state.symptoms.insert("Cough");

        let ViewBody::Plan(p) = render(&state).body else {
            panic!("expected plan view");
        };
        assert!(p.pending);
        assert!(p.reminders.is_empty());
        assert_eq!(
            p.treatment_description,
            "Based on your symptoms: Fever, Cough, here is a brief treatment plan."
        );

        state.attach_plan(PlanResult::from_text(
            "General advice only.\n07:00 Water: One glass\n",
        ));
        state.toggle_reminder(1);
        let ViewBody::Plan(p) = render(&state).body else {
            panic!("expected plan view");
        };
        assert!(!p.pending);
        assert_eq!(p.completed, 1);
        assert_eq!(p.reminders[0].label, "--:--");
        assert_eq!(p.reminders[0].activity, "General advice only.");
        assert_eq!(p.reminders[1].label, "07:00");
        assert!(p.reminders[1].completed);
        assert_eq!(p.disclaimer, DISCLAIMER);
    }

    #[test]
    fn warnings_are_carried() {
        let state = SessionState {
            warnings: vec!["Please enter your name".into()],
            ..Default::default()
        };
        assert_eq!(render(&state).warnings, ["Please enter your name"]);
    }

    #[test]
    fn view_serializes_with_body_tag() {
        let json = serde_json::to_value(render(&SessionState::new())).unwrap();
        assert_eq!(json["step"], "profile");
        assert_eq!(json["body"]["profile"]["form"]["height_cm"], 170.0);
    }
}
