//! US-locale display strings for CoinCap's decimal text fields.
//!
//! Values are parsed into [`BigDecimal`] so rounding happens on the decimal
//! digits CoinCap sent rather than on a binary float.

use bigdecimal::{BigDecimal, RoundingMode};
use std::str::FromStr;

/// Shown for a numeric field that is `null` or not decimal text.
pub const MISSING: &str = "-";

const COMPACT_SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Largest decimal exponent accepted in either direction. Exponent text
/// like `1e-999999999` would otherwise expand into a billion digits.
const MAX_SCALE: i64 = 64;

pub fn parse_decimal(text: Option<&str>) -> Option<BigDecimal> {
    let value = BigDecimal::from_str(text?.trim()).ok()?;
    let (_, scale) = value.as_bigint_and_exponent();
    if scale.abs() > MAX_SCALE {
        return None;
    }
    Some(value)
}

/// Currency style with two fraction digits, e.g. `$43,000.50`.
pub fn format_usd(text: Option<&str>) -> String {
    match parse_decimal(text) {
        Some(value) => usd(&value),
        None => MISSING.to_string(),
    }
}

/// Compact currency notation, e.g. `$1.2M` or `$817B`.
pub fn format_usd_compact(text: Option<&str>) -> String {
    match parse_decimal(text) {
        Some(value) => usd_compact(&value),
        None => MISSING.to_string(),
    }
}

/// Percent change with exactly three fraction digits, e.g. `5.123`.
pub fn format_percent_change(text: Option<&str>) -> String {
    match parse_decimal(text) {
        Some(value) => {
            let (negative, int, frac) = fixed_digits(&value, 3);
            format!("{}{}.{}", sign(negative), int, frac)
        }
        None => MISSING.to_string(),
    }
}

/// A change counts as profit only when it parses and is strictly above zero.
pub fn is_profit(text: Option<&str>) -> bool {
    parse_decimal(text).is_some_and(|value| value > BigDecimal::default())
}

fn usd(value: &BigDecimal) -> String {
    let (negative, int, frac) = fixed_digits(value, 2);
    format!("{}${}.{}", sign(negative), group_thousands(&int), frac)
}

// Integer part below ten keeps two significant digits, otherwise no
// fraction; a rounding carry into the next thousand moves up one suffix.
fn usd_compact(value: &BigDecimal) -> String {
    let mut group = (leading_exponent(value).max(0) / 3).min(COMPACT_SUFFIXES.len() as i64 - 1) as usize;

    loop {
        let (digits, scale) = value.as_bigint_and_exponent();
        let scaled = BigDecimal::new(digits, scale + 3 * group as i64);

        let exponent = leading_exponent(&scaled);
        let frac_len = if exponent <= 0 { (1 - exponent) as u32 } else { 0 };
        let (negative, int, frac) = fixed_digits(&scaled, frac_len);

        if int.len() > 3 && group + 1 < COMPACT_SUFFIXES.len() {
            group += 1;
            continue;
        }

        let frac = frac.trim_end_matches('0');
        let mut out = format!("{}${}", sign(negative), int);
        if !frac.is_empty() {
            out.push('.');
            out.push_str(frac);
        }
        out.push_str(COMPACT_SUFFIXES[group]);
        return out;
    }
}

/// Power of ten of the leading digit; zero counts as `0`.
fn leading_exponent(value: &BigDecimal) -> i64 {
    if *value == BigDecimal::default() {
        return 0;
    }
    let (digits, scale) = value.abs().as_bigint_and_exponent();
    digits.to_string().len() as i64 - scale - 1
}

/// Rounds half away from zero to `frac_len` digits and splits the result
/// into sign, integer digits and fraction digits.
fn fixed_digits(value: &BigDecimal, frac_len: u32) -> (bool, String, String) {
    let rounded = value.with_scale_round(frac_len as i64, RoundingMode::HalfUp);
    let negative = rounded < BigDecimal::default();
    let (digits, _) = rounded.abs().as_bigint_and_exponent();

    let mut text = digits.to_string();
    let width = frac_len as usize + 1;
    if text.len() < width {
        text = format!("{}{}", "0".repeat(width - text.len()), text);
    }

    let (int, frac) = text.split_at(text.len() - frac_len as usize);
    (negative, int.to_string(), frac.to_string())
}

fn group_thousands(int: &str) -> String {
    let mut out = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn sign(negative: bool) -> &'static str {
    if negative {
        "-"
    } else {
        ""
    }
}
