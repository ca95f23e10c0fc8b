
use crate::models::{
    ChangeRule, MissingElementPolicy, MonitoredTarget, change_rule::default_notify_on,
};

/// A builder for creating `MonitoredTarget` instances for testing.
#[derive(Debug, Clone)]
pub struct TargetBuilder {
    id: Option<String>,
    name: String,
    url: String,
    selector: String,
    keywords: Vec<String>,
    price_selector: Option<String>,
    notify_on: Vec<ChangeRule>,
    missing_element: MissingElementPolicy,
}

impl TargetBuilder {
    /// Creates a new `TargetBuilder` for a product called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            url: "https://shop.example.com/item".to_string(),
            selector: ".buy-button".to_string(),
            keywords: vec!["add to cart".to_string()],
            price_selector: None,
            notify_on: default_notify_on(),
            missing_element: MissingElementPolicy::default(),
        }
    }

    /// Sets an explicit target id.
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Sets the page URL.
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Sets the availability selector.
    pub fn selector(mut self, selector: &str) -> Self {
        self.selector = selector.to_string();
        self
    }

    /// Sets the availability keywords.
    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Sets the price selector.
    pub fn price_selector(mut self, selector: &str) -> Self {
        self.price_selector = Some(selector.to_string());
        self
    }

    /// Sets the notify rules.
    pub fn notify_on(mut self, rules: &[ChangeRule]) -> Self {
        self.notify_on = rules.to_vec();
        self
    }

    /// Sets the missing element policy.
    pub fn missing_element(mut self, policy: MissingElementPolicy) -> Self {
        self.missing_element = policy;
        self
    }

    /// Builds the `MonitoredTarget`.
    pub fn build(self) -> MonitoredTarget {
        MonitoredTarget {
            explicit_id: self.id,
            name: self.name,
            url: self.url,
            selector: self.selector,
            keywords: self.keywords,
            price_selector: self.price_selector,
            notify_on: self.notify_on,
            missing_element: self.missing_element,
        }
    }
}
