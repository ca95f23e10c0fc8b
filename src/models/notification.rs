//! Data models for change notifications.

use serde::Serialize;
use serde_json::json;

use super::{change_rule::ChangeRule, observed_state::ObservedState, target::MonitoredTarget};

/// A detected transition of one target, handed to a notifier exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeNotification {
    /// The target that changed.
    pub target: MonitoredTarget,
    /// The state recorded by the previous run.
    pub previous: ObservedState,
    /// The state observed by this run.
    pub current: ObservedState,
    /// The configured rules the transition satisfied.
    pub matched: Vec<ChangeRule>,
}

impl ChangeNotification {
    /// A one-line summary of the most significant matched rule.
    pub fn headline(&self) -> String {
        let name = &self.target.name;
        if self.matched.contains(&ChangeRule::BecameAvailable) {
            return format!("{name} is NOW AVAILABLE!");
        }
        if self.matched.contains(&ChangeRule::PriceDropped) {
            if let (Some(old), Some(new)) = (self.previous.price, self.current.price) {
                return format!("{name} dropped in price from {old} to {new}");
            }
        }
        if self.matched.contains(&ChangeRule::BecameUnavailable) {
            return format!("{name} is no longer available");
        }
        if self.matched.contains(&ChangeRule::AvailabilityChanged) {
            let now = if self.current.available { "available" } else { "unavailable" };
            return format!("{name} is now {now}");
        }
        if self.matched.contains(&ChangeRule::PriceChanged) {
            return format!("{name} changed price");
        }
        format!("{name} changed")
    }

    /// The variables exposed to notification templates.
    pub fn template_context(&self) -> serde_json::Value {
        json!({
            "target": {
                "id": self.target.id(),
                "name": self.target.name,
                "url": self.target.url.as_str(),
            },
            "previous": state_context(&self.previous),
            "current": state_context(&self.current),
            "matched": self.matched,
            "headline": self.headline(),
            "observed_at": self.current.observed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        })
    }
}

/// Unlike the stored form, an absent price is an explicit `null` so that
/// strict templates can test it.
fn state_context(state: &ObservedState) -> serde_json::Value {
    json!({
        "available": state.available,
        "price": state.price.map(|p| p.to_string()),
        "status": state.status,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::test_helpers::TargetBuilder;

    fn notification(
        previous: ObservedState,
        current: ObservedState,
        matched: &[ChangeRule],
    ) -> ChangeNotification {
        ChangeNotification {
            target: TargetBuilder::new("PlayStation 5").id("sku-123").build(),
            previous,
            current,
            matched: matched.to_vec(),
        }
    }

    #[test]
    fn test_headline_prefers_restock() {
        let n = notification(
            ObservedState::new(false, Some(Decimal::new(49999, 2)), ""),
            ObservedState::new(true, Some(Decimal::new(44999, 2)), ""),
            &[ChangeRule::PriceDropped, ChangeRule::BecameAvailable],
        );
        assert_eq!(n.headline(), "PlayStation 5 is NOW AVAILABLE!");
    }

    #[test]
    fn test_headline_for_price_drop() {
        let n = notification(
            ObservedState::new(true, Some(Decimal::new(49999, 2)), ""),
            ObservedState::new(true, Some(Decimal::new(44999, 2)), ""),
            &[ChangeRule::PriceDropped],
        );
        assert_eq!(n.headline(), "PlayStation 5 dropped in price from 499.99 to 449.99");
    }

    #[test]
    fn test_headline_for_sell_out() {
        let n = notification(
            ObservedState::new(true, None, ""),
            ObservedState::new(false, None, ""),
            &[ChangeRule::AvailabilityChanged],
        );
        assert_eq!(n.headline(), "PlayStation 5 is now unavailable");
    }

    #[test]
    fn test_template_context_shape() {
        let n = notification(
            ObservedState::new(false, None, "Current status: sold out"),
            ObservedState::new(true, Some(Decimal::new(1999, 2)), "Found: add to cart"),
            &[ChangeRule::BecameAvailable],
        );

        let context = n.template_context();

        assert_eq!(context["target"]["id"], "sku-123");
        assert_eq!(context["previous"]["available"], false);
        assert_eq!(context["current"]["available"], true);
        assert_eq!(context["current"]["price"], "19.99");
        assert!(context["previous"]["price"].is_null());
        assert_eq!(context["matched"][0], "became_available");
        assert_eq!(context["headline"], "PlayStation 5 is NOW AVAILABLE!");
    }
}
