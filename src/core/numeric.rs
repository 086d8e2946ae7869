//! Rounding and display helpers shared by the indicator computations.

use serde::{Deserialize, Deserializer};

/// Rendered in place of any value that could not be computed.
pub const SENTINEL: &str = "N/A";

/// Rounds to `decimals` places, ties away from zero.
pub fn round_half_away(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid rendering "-0.00".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Fixed-point display string, or [`SENTINEL`] for NaN/infinite input.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return SENTINEL.to_string();
    }
    let rounded = round_half_away(value, decimals);
    format!("{rounded:.prec$}", prec = decimals as usize)
}

pub fn format_percent(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return SENTINEL.to_string();
    }
    format!("{}%", format_fixed(value, decimals))
}

/// Parses the decimal strings exchanges use for prices and rates.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts either a JSON string or a JSON number and keeps it as text.
pub fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_half_away(2.5, 0), 3.0);
        assert_eq!(round_half_away(-2.5, 0), -3.0);
        assert_eq!(round_half_away(0.125, 2), 0.13);
        assert_eq!(round_half_away(-0.125, 2), -0.13);
        assert_eq!(round_half_away(-0.001, 2), 0.0);
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(100.0, 2), "100.00");
        assert_eq!(format_fixed(-0.004, 2), "0.00");
        assert_eq!(format_fixed(0.012345, 4), "0.0123");
        assert_eq!(format_fixed(f64::NAN, 2), SENTINEL);
        assert_eq!(format_fixed(f64::INFINITY, 2), SENTINEL);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(-0.01, 4), "-0.0100%");
        assert_eq!(format_percent(12.3456, 2), "12.35%");
        assert_eq!(format_percent(f64::NAN, 2), SENTINEL);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0.00010000"), Some(0.0001));
        assert_eq!(parse_decimal(" 64000.5 "), Some(64000.5));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }
}
