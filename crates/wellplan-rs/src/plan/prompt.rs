//! Prompt construction from a symptom list and a user profile.

use serde::{Deserialize, Serialize};

/// Basic demographics collected on the first wizard step.
///
/// Missing values render as `"unknown"` in the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
}

const UNKNOWN: &str = "unknown";

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

/// Build the instruction sent to the generation service.
///
/// `symptoms` should be non-empty; the builder does not check.
pub fn build_prompt(symptoms: &[String], profile: &Profile) -> String {
    let symptoms = symptoms.join(", ");
    let age = or_unknown(profile.age);
    let gender = or_unknown(profile.gender.as_deref().filter(|g| !g.trim().is_empty()));
    // f64 Display prints whole numbers without a fraction ("70", not "70.0").
    let weight = or_unknown(profile.weight_kg);
    let height = or_unknown(profile.height_cm);

    format!(
        "\
IMPORTANT: You are a wellness assistant giving general wellness advice only.
Begin your answer with a one-line disclaimer stating that this is general wellness
advice, not medical advice, and that the user should consult a doctor.

User reports these symptoms: {symptoms}.
Profile: {age} years, {gender}, {weight} kg, {height} cm.

Provide a 1-day wellness plan with a specific time for every item, one item per
line, in exactly this format:

HH:MM <Category>: <Details>

For example:
08:00 Water: Drink 250ml of water
08:30 Food: Eat oatmeal with berries
09:00 Activity: Light stretching for 10 minutes

Cover all of:
1. Hydration schedule (specific times and amounts)
2. Food suggestions (what to eat and when)
3. Activity recommendations (with specific times)
4. General wellness tips

Apart from the disclaimer, return only the schedule items, one per line, using
24-hour times."
    )
}
