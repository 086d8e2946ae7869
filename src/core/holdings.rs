//! Parsing of the free-text entity holding fields.
//!
//! Values look like `"+1,234 BTC (+3.2%)"`, `"-1.5%"` or the bare sentinel
//! `"hold"`. A value is classified by its sign alone.

use crate::core::model::{Decision, EntityCategory, EntityHolding, PercentField};
use crate::core::observation::EntityReport;

const HOLD: &str = "hold";

/// Surrounding whitespace is ignored.
fn is_hold(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(HOLD)
}

/// Drops `*`, signs and `%` from a display fragment.
fn strip_markers(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '+' | '-' | '%'))
        .collect()
}

/// Length of a `[-+]?\d+\.?\d*%` match starting at `start`, if any.
fn percent_len_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let digits_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
    }
    (bytes.get(i) == Some(&b'%')).then_some(i + 1 - start)
}

/// Signed percentage wrapped in parentheses, e.g. `(+3.2%)`.
fn parenthesized_percent(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().find_map(|(i, b)| {
        if *b != b'(' {
            return None;
        }
        let len = percent_len_at(bytes, i + 1)?;
        (bytes.get(i + 1 + len) == Some(&b')')).then(|| &value[i + 1..i + 1 + len])
    })
}

/// First signed percentage anywhere in the text.
fn first_percent(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    (0..bytes.len()).find_map(|i| percent_len_at(bytes, i).map(|len| &value[i..i + len]))
}

/// Removes the first parenthesized group together with the whitespace before it.
fn without_parenthesized(value: &str) -> String {
    let bytes = value.as_bytes();
    for (open, b) in bytes.iter().enumerate() {
        if *b != b'(' {
            continue;
        }
        let Some(close) = value[open..].find(')').map(|offset| open + offset) else {
            continue;
        };
        let start = value[..open].trim_end().len();
        return format!("{}{}", &value[..start], &value[close + 1..]);
    }
    value.to_string()
}

/// The percentage part of a holding field, without sign or `%`.
pub fn extract_percentage(value: &str) -> String {
    if value.is_empty() || is_hold(value) {
        return String::new();
    }
    parenthesized_percent(value)
        .or_else(|| first_percent(value))
        .map(strip_markers)
        .unwrap_or_default()
}

/// The headline part of a holding field, without the parenthesized percentage.
pub fn extract_main_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if is_hold(value) {
        return "Hold".to_string();
    }
    strip_markers(without_parenthesized(value).trim())
}

pub fn classify(value: &str) -> Decision {
    if is_hold(value) {
        Decision::Hold
    } else if value.contains('+') {
        Decision::Buy
    } else if value.contains('-') {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

pub fn parse_field(raw: &str) -> PercentField {
    PercentField {
        raw: raw.to_string(),
        main_value: extract_main_value(raw),
        percentage: extract_percentage(raw),
        decision: classify(raw),
    }
}

/// Keeps only the entities that report a change, in report order.
pub fn compute_holdings(reports: &[EntityReport]) -> Vec<EntityHolding> {
    reports
        .iter()
        .filter_map(|report| {
            let change = report.change.as_deref().filter(|c| !c.trim().is_empty())?;
            Some(EntityHolding {
                category: report.category,
                name: report.name.clone(),
                change: parse_field(change),
                streak: report
                    .streak
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .map(parse_field),
            })
        })
        .collect()
}

/// Holdings of one category, preserving order.
pub fn in_category(holdings: &[EntityHolding], category: EntityCategory) -> Vec<&EntityHolding> {
    holdings.iter().filter(|h| h.category == category).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_with_trailing_label() {
        let field = parse_field("+3.2% (Buy)");
        assert_eq!(field.percentage, "3.2");
        assert_eq!(field.main_value, "3.2");
        assert_eq!(field.decision, Decision::Buy);
    }

    #[test]
    fn test_hold_sentinel() {
        for raw in ["hold", "HOLD", "Hold", " hold\n"] {
            let field = parse_field(raw);
            assert_eq!(field.percentage, "");
            assert_eq!(field.main_value, "Hold");
            assert_eq!(field.decision, Decision::Hold);
        }
    }

    #[test]
    fn test_negative_percentage_sells() {
        let field = parse_field("-1.5%");
        assert_eq!(field.percentage, "1.5");
        assert_eq!(field.main_value, "1.5");
        assert_eq!(field.decision, Decision::Sell);
    }

    #[test]
    fn test_parenthesized_percentage_wins() {
        let field = parse_field("+1,250 BTC** (-0.75%)");
        assert_eq!(field.percentage, "0.75");
        assert_eq!(field.main_value, "1,250 BTC");
        assert_eq!(field.decision, Decision::Buy);
    }

    #[test]
    fn test_value_without_percentage() {
        let field = parse_field("12 days");
        assert_eq!(field.percentage, "");
        assert_eq!(field.main_value, "12 days");
        assert_eq!(field.decision, Decision::Hold);
    }

    #[test]
    fn test_percent_scanner_edge_cases() {
        assert_eq!(first_percent("up 3.%"), Some("3.%"));
        assert_eq!(first_percent("+ 4%"), Some("4%"));
        assert_eq!(first_percent("v1.2.3%"), Some("2.3%"));
        assert_eq!(parenthesized_percent("(abc) (5%)"), Some("5%"));
        assert_eq!(without_parenthesized("a (b"), "a (b");
    }

    #[test]
    fn test_compute_holdings_is_sparse() {
        let reports = vec![
            EntityReport {
                category: EntityCategory::Etf,
                name: "ibit".to_string(),
                change: Some("+2,100 (+0.4%)".to_string()),
                streak: Some("+5 (+1.1%)".to_string()),
            },
            EntityReport {
                category: EntityCategory::Etf,
                name: "gbtc".to_string(),
                change: None,
                streak: Some("-3".to_string()),
            },
            EntityReport {
                category: EntityCategory::Company,
                name: "strategy".to_string(),
                change: Some("hold".to_string()),
                streak: Some(String::new()),
            },
        ];

        let holdings = compute_holdings(&reports);
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].name, "ibit");
        assert_eq!(holdings[0].change.percentage, "0.4");
        assert_eq!(
            holdings[0].streak.as_ref().map(|s| s.decision),
            Some(Decision::Buy)
        );
        assert_eq!(holdings[1].change.main_value, "Hold");
        assert!(holdings[1].streak.is_none());

        assert_eq!(in_category(&holdings, EntityCategory::Etf).len(), 1);
        assert!(in_category(&holdings, EntityCategory::Exchange).is_empty());
    }
}
