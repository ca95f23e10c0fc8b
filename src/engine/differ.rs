//! Decides whether a fresh observation is a reportable transition.

use crate::models::{ChangeRule, ObservedState};

/// The outcome of comparing a target's stored and fresh state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing was stored for the target; the fresh state is the baseline.
    FirstSeen,
    /// No configured rule matched.
    NoChange,
    /// At least one configured rule matched.
    Changed {
        /// The matched rules, in configuration order, without duplicates.
        matched: Vec<ChangeRule>,
    },
}

/// Compares `current` against `previous` under `rules`.
pub fn diff(
    previous: Option<&ObservedState>,
    current: &ObservedState,
    rules: &[ChangeRule],
) -> Decision {
    let Some(previous) = previous else {
        return Decision::FirstSeen;
    };

    let mut matched: Vec<ChangeRule> = Vec::new();
    for rule in rules {
        if !matched.contains(rule) && rule.matches(previous, current) {
            matched.push(*rule);
        }
    }

    if matched.is_empty() { Decision::NoChange } else { Decision::Changed { matched } }
}
