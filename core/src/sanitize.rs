//! JSON sanitizer — last line of defense before a view result leaves the
//! core.
//!
//! `serde_json` cannot represent NaN or ±∞, so a non-finite f64 converted
//! carelessly becomes `null` and breaks frontend arithmetic. Views build
//! numbers through [`safe_num`]; [`json_safe`] then walks the finished value
//! and normalizes whatever slipped through. Both are idempotent.

use serde_json::Value;

/// f64 → JSON number, with non-finite values collapsed to 0.
pub fn safe_num(x: f64) -> Value {
    if x.is_finite() {
        Value::from(x)
    } else {
        Value::from(0)
    }
}

/// Percentage of `part` over `total`; 0.0 when the total is empty.
pub fn percentual(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

/// Mean of a slice; 0.0 for an empty one.
pub fn media(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let soma: f64 = values.iter().sum();
    let m = soma / values.len() as f64;
    if m.is_finite() {
        m
    } else {
        0.0
    }
}

/// Recursively normalize a JSON value: numbers that decayed to null stay
/// null only in non-numeric positions upstream; any non-finite number that
/// somehow survived is replaced by 0. Strings, booleans and explicit nulls
/// pass through.
pub fn json_safe(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(json_safe).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, json_safe(v))).collect())
        }
        Value::Number(n) => {
            if let Some(x) = n.as_f64() {
                if !x.is_finite() {
                    return Value::from(0);
                }
            }
            Value::Number(n)
        }
        other => other,
    }
}
