//! The three-step wizard: profile → symptoms → plan.
//!
//! State lives in an explicit [`SessionState`]; [`transition`] and
//! [`render`] are pure, so any front end (web, tests) drives the same logic.

pub mod session;
pub mod transition;
pub mod view;

pub use session::{
    AGE_RANGE, COMMON_SYMPTOMS, DEFAULT_AGE, DEFAULT_HEIGHT_CM, DEFAULT_WEIGHT_KG, GENDER_OPTIONS,
    HEIGHT_RANGE_CM, SessionState, Step, SymptomSet, WEIGHT_RANGE_KG,
};
pub use transition::{ProfileForm, Transition, WizardAction, transition};
pub use view::{
    APP_TITLE, DISCLAIMER, PlanView, ProfileView, ReminderView, SymptomsView, ViewBody,
    WizardView, render, step_title, treatment_description,
};
