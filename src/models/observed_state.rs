//! What a single fetch saw on a product page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A snapshot of the extracted attributes of one target at one point in time.
///
/// Only `available` and `price` take part in change detection; `status` and
/// `observed_at` describe the observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservedState {
    /// Whether an availability keyword was found on the page.
    #[serde(default)]
    pub available: bool,

    /// The extracted price, when the target declares a price selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// Human readable summary of what was found.
    #[serde(default)]
    pub status: String,

    /// When this state was observed.
    #[serde(default)]
    pub observed_at: DateTime<Utc>,
}

impl ObservedState {
    /// Creates a state observed now.
    pub fn new(available: bool, price: Option<Decimal>, status: impl Into<String>) -> Self {
        Self { available, price, status: status.into(), observed_at: Utc::now() }
    }

    /// Value equality over the compared attributes.
    pub fn same_observation(&self, other: &ObservedState) -> bool {
        self.available == other.available && self.price == other.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_and_missing_fields_are_tolerated() {
        let state: ObservedState =
            serde_json::from_str(r#"{"available": true, "stock_level": 3}"#).unwrap();

        assert!(state.available);
        assert_eq!(state.price, None);
        assert_eq!(state.status, "");
        assert_eq!(state.observed_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_same_observation_compares_price_numerically() {
        let a = ObservedState::new(true, Some(Decimal::new(1990, 2)), "a");
        let b = ObservedState::new(true, Some(Decimal::new(199, 1)), "b");
        assert!(a.same_observation(&b));
        assert!(!a.same_observation(&ObservedState::new(false, a.price, "c")));
    }
}
