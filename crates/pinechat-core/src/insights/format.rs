//! Display formatting for insight values.
//!
//! Grouping follows the en-US convention: comma thousands separators and at
//! most three fraction digits, trailing zeros dropped.

/// Glyph prefixed to currency amounts.
pub const CURRENCY_GLYPH: &str = "₹";

const MAX_FRACTION_DIGITS: usize = 3;

/// `1234567.5` -> `"1,234,567.5"`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// `2500.0` -> `"₹2,500"`.
pub fn format_currency(value: f64) -> String {
    format!("{}{}", CURRENCY_GLYPH, format_number(value))
}

/// Appends the percent sign. The value is shown as given.
pub fn format_percentage(value: impl std::fmt::Display) -> String {
    format!("{}%", value)
}

/// Converts a `[0, 1]` rate to a percentage rounded to one decimal, `0.927` -> `"92.7"`.
pub fn success_rate_percent(rate: f64) -> String {
    format!("{:.1}", rate * 100.0)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
