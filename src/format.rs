//! Display formatting for measurement values.
//!
//! Invalid input never raises: anything that is not a finite number degrades
//! to "absent", and absent values render as the em-dash placeholder. Number
//! reading and printing follow the browser board this client replaces, so
//! both surfaces show the same text for the same payload.

use serde_json::{Number, Value};

/// Shown wherever a value is missing or unusable.
pub const PLACEHOLDER: &str = "—";

/// Interprets a raw JSON value as a finite floating-point number.
///
/// Numbers pass through. Strings are read like a leading-number parse:
/// leading whitespace is skipped and the longest numeric prefix is used, so
/// "12abc" is 12 and "3.5 m/s" is 3.5. Returns `None` for null, booleans,
/// containers, strings without a numeric prefix, and infinite results.
pub fn parse_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_prefix(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Longest `[+-]digits[.digits][e[+-]digits]` prefix after leading
/// whitespace, requiring at least one mantissa digit.
fn numeric_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // A bare trailing "." adds nothing to the number.
        if frac_end > frac_start {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Renders a number with one decimal place, or the placeholder.
///
/// Exact halves round away from zero (12.25 → "12.3"). Every other value is
/// rounded from its exact binary value, so 1.45, stored just below 1.45,
/// gives "1.4".
pub fn format_numeric(value: Option<f64>) -> String {
    match value {
        Some(v) => {
            // An exact tie at the second decimal is an odd multiple of 0.25.
            let quarters = v * 4.0;
            if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
                format!("{:.1}", (v * 10.0).round() / 10.0)
            } else {
                format!("{:.1}", v)
            }
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// Renders a raw value as the backend sent it. Only a missing value (null or
/// absent) becomes the placeholder; an empty string stays empty. Whole
/// floats print without a fraction, so a `90.0` direction reads "90".
pub fn display_raw(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(v) if v == 0.0 => "0".to_string(),
        Some(v) => v.to_string(),
        None => n.to_string(),
    }
}
