//! Backend selection for plan generation.
//!
//! The service reports which model identifiers are currently available;
//! [`choose_backend`] picks the highest-priority one that is listed. Selection
//! is kept separate from the network call so it can be tested on plain sets.

use std::collections::HashSet;

use crate::{ALTERNATE_MODELS, PRIMARY_MODEL};

/// Strip the `models/` resource prefix from a model name.
pub fn normalize_model_name(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

/// A model identifier and its priority (lower is preferred).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEntry {
    pub model: String,
    pub priority: u32,
}

/// Ordered list of backends to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPriority {
    entries: Vec<BackendEntry>,
}

impl BackendPriority {
    /// Build from `(identifier, priority)` pairs. Entries are kept sorted by
    /// priority; ties keep their given order.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut entries: Vec<BackendEntry> = pairs
            .into_iter()
            .map(|(model, priority)| BackendEntry {
                model: model.into(),
                priority,
            })
            .collect();
        entries.sort_by_key(|e| e.priority);
        Self { entries }
    }

    pub fn entries(&self) -> &[BackendEntry] {
        &self.entries
    }

    /// First listed backend in priority order.
    pub fn choose(&self, available: &HashSet<String>) -> Option<&str> {
        choose_backend(available, &self.entries)
    }
}

impl Default for BackendPriority {
    /// `gemini-pro`, then `gemini-1.0-pro`, then `gemini-1.5-pro`.
    fn default() -> Self {
        let models = std::iter::once(PRIMARY_MODEL).chain(ALTERNATE_MODELS);
        Self::new(models.zip(0u32..))
    }
}

/// Pick the available backend with the lowest priority value.
///
/// `available` may hold bare identifiers or `models/`-prefixed names. Returns
/// `None` when no entry of `priority` is available.
pub fn choose_backend<'a>(
    available: &HashSet<String>,
    priority: &'a [BackendEntry],
) -> Option<&'a str> {
    let listed: HashSet<&str> = available
        .iter()
        .map(|name| normalize_model_name(name))
        .collect();
    priority
        .iter()
        .filter(|e| listed.contains(e.model.as_str()))
        .min_by_key(|e| e.priority)
        .map(|e| e.model.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_order() {
        let priority = BackendPriority::default();
        let models: Vec<&str> = priority.entries().iter().map(|e| e.model.as_str()).collect();
        assert_eq!(models, ["gemini-pro", "gemini-1.0-pro", "gemini-1.5-pro"]);
    }

    #[test]
    fn primary_wins_when_listed() {
        let priority = BackendPriority::default();
        let available = set(&["models/gemini-1.5-pro", "models/gemini-pro"]);
        assert_eq!(priority.choose(&available), Some("gemini-pro"));
    }

    #[test]
    fn falls_through_to_alternates() {
        let priority = BackendPriority::default();
        assert_eq!(
            priority.choose(&set(&["models/gemini-1.0-pro", "models/gemini-1.5-pro"])),
            Some("gemini-1.0-pro")
        );
        assert_eq!(
            priority.choose(&set(&["models/gemini-1.5-pro"])),
            Some("gemini-1.5-pro")
        );
    }

    #[test]
    fn none_when_nothing_matches() {
        let priority = BackendPriority::default();
        assert_eq!(priority.choose(&set(&["models/text-bison-001"])), None);
        assert_eq!(priority.choose(&HashSet::new()), None);
    }

    #[test]
    fn bare_identifiers_accepted() {
        let priority = BackendPriority::default();
        assert_eq!(
            priority.choose(&set(&["gemini-1.5-pro"])),
            Some("gemini-1.5-pro")
        );
    }

    #[test]
    fn explicit_priorities_reorder() {
        let priority = BackendPriority::new([("b", 2), ("a", 1), ("c", 3)]);
        assert_eq!(priority.choose(&set(&["c", "b"])), Some("b"));
    }

    #[test]
    fn normalize_strips_only_prefix() {
        assert_eq!(normalize_model_name("models/gemini-pro"), "gemini-pro");
        assert_eq!(normalize_model_name("gemini-pro"), "gemini-pro");
    }
}
