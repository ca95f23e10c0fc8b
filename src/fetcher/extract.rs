//! Pure HTML extraction of availability and price.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use super::FetchError;
use crate::models::{MissingElementPolicy, MonitoredTarget, ObservedState};

/// Status text length kept when no keyword matched.
const STATUS_EXCERPT_CHARS: usize = 50;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d(?:[\d.,]*\d)?").expect("static regex is valid"));

/// Extracts the state of `target` from a downloaded page.
pub fn extract_state(target: &MonitoredTarget, html: &str) -> Result<ObservedState, FetchError> {
    let document = Html::parse_document(html);

    let selector = parse_selector(&target.selector)?;
    let (available, status) = match document.select(&selector).next() {
        Some(element) => match_keywords(&element_text(element), &target.keywords),
        None => match target.missing_element {
            MissingElementPolicy::Unavailable => {
                tracing::debug!(selector = %target.selector, "Availability element not found.");
                (false, "Element not found".to_string())
            }
            MissingElementPolicy::Error => {
                return Err(FetchError::ElementNotFound(target.selector.clone()));
            }
        },
    };

    let price = match &target.price_selector {
        Some(price_selector) => {
            let selector = parse_selector(price_selector)?;
            match document.select(&selector).next() {
                Some(element) => {
                    let text = element_text(element);
                    Some(parse_price(&text).ok_or(FetchError::InvalidPrice(text))?)
                }
                None => {
                    tracing::debug!(selector = %price_selector, "Price element not found.");
                    None
                }
            }
        }
        None => None,
    };

    Ok(ObservedState::new(available, price, status))
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Text content of an element with runs of whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Returns availability and a status line for the element text.
fn match_keywords(text: &str, keywords: &[String]) -> (bool, String) {
    let haystack = text.to_lowercase();
    for keyword in keywords {
        if haystack.contains(&keyword.to_lowercase()) {
            return (true, format!("Found: {keyword}"));
        }
    }

    let excerpt: String = haystack.chars().take(STATUS_EXCERPT_CHARS).collect();
    if excerpt.len() < haystack.len() {
        (false, format!("Current status: {excerpt}..."))
    } else {
        (false, format!("Current status: {excerpt}"))
    }
}

/// Parses the first number in `text` as a price.
///
/// Accepts `.` or `,` as the decimal separator. A final separator followed
/// by exactly three digits is read as a thousands separator.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let raw = NUMBER_RE.find(text)?.as_str();

    let normalized = match raw.rfind(['.', ',']) {
        None => raw.to_string(),
        Some(idx) => {
            let digits_before: String =
                raw[..idx].chars().filter(char::is_ascii_digit).collect();
            let fraction = &raw[idx + 1..];
            if fraction.len() == 3 {
                format!("{digits_before}{fraction}")
            } else {
                format!("{digits_before}.{fraction}")
            }
        }
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TargetBuilder;

    const IN_STOCK_PAGE: &str = r#"
        <html><body>
          <div class="buybox">
            <button class="add-to-cart">
              Add   to
              Cart
            </button>
          </div>
          <span class="price">$1,299.99</span>
        </body></html>"#;

    const SOLD_OUT_PAGE: &str = r#"
        <html><body>
          <div class="buybox"><button class="add-to-cart" disabled>Sold Out</button></div>
        </body></html>"#;

    #[test]
    fn test_keyword_match_is_case_and_whitespace_insensitive() {
        let target = TargetBuilder::new("Console")
            .selector(".buybox .add-to-cart")
            .keywords(&["ADD TO CART"])
            .build();

        let state = extract_state(&target, IN_STOCK_PAGE).unwrap();

        assert!(state.available);
        assert_eq!(state.status, "Found: ADD TO CART");
        assert_eq!(state.price, None);
    }

    #[test]
    fn test_no_keyword_reports_current_text() {
        let target = TargetBuilder::new("Console").selector(".add-to-cart").build();

        let state = extract_state(&target, SOLD_OUT_PAGE).unwrap();

        assert!(!state.available);
        assert_eq!(state.status, "Current status: sold out");
    }

    #[test]
    fn test_long_status_is_truncated() {
        let long = "x".repeat(80);
        let page = format!(r#"<div class="add-to-cart">{long}</div>"#);
        let target = TargetBuilder::new("Console").selector(".add-to-cart").build();

        let state = extract_state(&target, &page).unwrap();

        assert_eq!(state.status, format!("Current status: {}...", "x".repeat(50)));
    }

    #[test]
    fn test_missing_element_defaults_to_unavailable() {
        let target = TargetBuilder::new("Console").selector("#does-not-exist").build();

        let state = extract_state(&target, IN_STOCK_PAGE).unwrap();

        assert!(!state.available);
        assert_eq!(state.status, "Element not found");
    }

    #[test]
    fn test_missing_element_can_be_an_error() {
        let target = TargetBuilder::new("Console")
            .selector("#does-not-exist")
            .missing_element(MissingElementPolicy::Error)
            .build();

        let result = extract_state(&target, IN_STOCK_PAGE);

        assert_eq!(result, Err(FetchError::ElementNotFound("#does-not-exist".to_string())));
    }

    #[test]
    fn test_price_is_extracted() {
        let target = TargetBuilder::new("Console")
            .selector(".add-to-cart")
            .price_selector(".price")
            .build();

        let state = extract_state(&target, IN_STOCK_PAGE).unwrap();

        assert_eq!(state.price, Some(Decimal::new(129999, 2)));
    }

    #[test]
    fn test_missing_price_element_is_no_price() {
        let target = TargetBuilder::new("Console")
            .selector(".add-to-cart")
            .price_selector(".price")
            .build();

        let state = extract_state(&target, SOLD_OUT_PAGE).unwrap();

        assert_eq!(state.price, None);
    }

    #[test]
    fn test_unparsable_price_is_an_error() {
        let page = r#"<div class="add-to-cart">Add to cart</div><p class="price">Call us</p>"#;
        let target = TargetBuilder::new("Console")
            .selector(".add-to-cart")
            .price_selector(".price")
            .build();

        let result = extract_state(&target, page);

        assert_eq!(result, Err(FetchError::InvalidPrice("Call us".to_string())));
    }

    #[test]
    fn test_identical_pages_give_equal_observations() {
        let target = TargetBuilder::new("Console")
            .selector(".add-to-cart")
            .price_selector(".price")
            .build();

        let first = extract_state(&target, IN_STOCK_PAGE).unwrap();
        let second = extract_state(&target, IN_STOCK_PAGE).unwrap();

        assert!(first.same_observation(&second));
        assert_eq!(first.status, second.status);
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price("$19.99"), Some(Decimal::new(1999, 2)));
        assert_eq!(parse_price("Now only 1,299.00 USD"), Some(Decimal::new(129900, 2)));
        assert_eq!(parse_price("1.299,95 €"), Some(Decimal::new(129995, 2)));
        assert_eq!(parse_price("€1.299"), Some(Decimal::new(1299, 0)));
        assert_eq!(parse_price("£5"), Some(Decimal::new(5, 0)));
        assert_eq!(parse_price("19,9"), Some(Decimal::new(199, 1)));
        assert_eq!(parse_price("out of stock"), None);
    }
}
