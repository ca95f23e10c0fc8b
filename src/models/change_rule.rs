//! Per-target rules deciding which state differences count as a transition.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::observed_state::ObservedState;

/// A comparison predicate between two consecutive observations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRule {
    /// The product went from unavailable to available.
    BecameAvailable,
    /// The product went from available to unavailable.
    BecameUnavailable,
    /// Availability flipped in either direction.
    AvailabilityChanged,
    /// The extracted price differs, including a price appearing or
    /// disappearing.
    PriceChanged,
    /// Both observations carry a price and the new one is lower.
    PriceDropped,
    /// Any compared attribute differs.
    AnyChange,
}

impl ChangeRule {
    /// Returns `true` when going from `previous` to `current` satisfies this
    /// rule.
    pub fn matches(&self, previous: &ObservedState, current: &ObservedState) -> bool {
        match self {
            ChangeRule::BecameAvailable => !previous.available && current.available,
            ChangeRule::BecameUnavailable => previous.available && !current.available,
            ChangeRule::AvailabilityChanged => previous.available != current.available,
            ChangeRule::PriceChanged => previous.price != current.price,
            ChangeRule::PriceDropped => match (previous.price, current.price) {
                (Some(old), Some(new)) => new < old,
                _ => false,
            },
            ChangeRule::AnyChange => !previous.same_observation(current),
        }
    }

    /// The configuration name of the rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeRule::BecameAvailable => "became_available",
            ChangeRule::BecameUnavailable => "became_unavailable",
            ChangeRule::AvailabilityChanged => "availability_changed",
            ChangeRule::PriceChanged => "price_changed",
            ChangeRule::PriceDropped => "price_dropped",
            ChangeRule::AnyChange => "any_change",
        }
    }
}

impl fmt::Display for ChangeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules applied when a target does not configure `notify_on`.
pub fn default_notify_on() -> Vec<ChangeRule> {
    vec![ChangeRule::BecameAvailable]
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn state(available: bool, price: Option<i64>) -> ObservedState {
        ObservedState {
            available,
            price: price.map(|p| Decimal::new(p, 2)),
            ..Default::default()
        }
    }

    #[test]
    fn test_became_available_only_fires_on_restock() {
        let rule = ChangeRule::BecameAvailable;
        assert!(rule.matches(&state(false, None), &state(true, None)));
        assert!(!rule.matches(&state(true, None), &state(false, None)));
        assert!(!rule.matches(&state(true, None), &state(true, None)));
        assert!(!rule.matches(&state(false, None), &state(false, None)));
    }

    #[test]
    fn test_availability_changed_fires_both_ways() {
        let rule = ChangeRule::AvailabilityChanged;
        assert!(rule.matches(&state(false, None), &state(true, None)));
        assert!(rule.matches(&state(true, None), &state(false, None)));
        assert!(!rule.matches(&state(true, None), &state(true, Some(100))));
    }

    #[test]
    fn test_price_dropped_requires_both_prices() {
        let rule = ChangeRule::PriceDropped;
        assert!(rule.matches(&state(true, Some(1999)), &state(true, Some(1499))));
        assert!(!rule.matches(&state(true, Some(1499)), &state(true, Some(1999))));
        assert!(!rule.matches(&state(true, None), &state(true, Some(1499))));
        assert!(!rule.matches(&state(true, Some(1999)), &state(true, None)));
    }

    #[test]
    fn test_price_changed_counts_appearing_price() {
        let rule = ChangeRule::PriceChanged;
        assert!(rule.matches(&state(true, None), &state(true, Some(1499))));
        assert!(!rule.matches(&state(true, Some(1499)), &state(false, Some(1499))));
    }

    #[test]
    fn test_any_change_ignores_descriptive_fields() {
        let previous = state(true, Some(1000));
        let mut current = previous.clone();
        current.status = "Found: buy".to_string();
        current.observed_at = chrono::Utc::now();

        assert!(!ChangeRule::AnyChange.matches(&previous, &current));
        assert!(ChangeRule::AnyChange.matches(&previous, &state(true, Some(1001))));
    }

    #[test]
    fn test_rules_deserialize_from_snake_case() {
        let rules: Vec<ChangeRule> =
            serde_json::from_str(r#"["became_available", "price_dropped"]"#).unwrap();
        assert_eq!(rules, vec![ChangeRule::BecameAvailable, ChangeRule::PriceDropped]);
        assert_eq!(ChangeRule::PriceDropped.to_string(), "price_dropped");
    }
}
