//! Lenient extraction of fields from Retell API responses
//!
//! Responses have changed shape across provider revisions: collections may
//! be bare arrays or wrapped, identifiers and names may use entity-prefixed
//! keys, and timestamps may be epoch numbers or strings. Every helper here
//! returns a default instead of failing when a field is missing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Keys under which any collection may be wrapped
const GENERIC_WRAPPERS: &[&str] = &["data", "items", "results"];

/// Epoch values below this are seconds, above are milliseconds
const EPOCH_MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// Items of a collection response
///
/// Accepts a bare array, or an object carrying an array under one of
/// `wrappers` or the generic wrapper keys. Anything else yields no items.
pub fn collection<'a>(body: &'a Value, wrappers: &[&str]) -> Vec<&'a Value> {
    if let Some(items) = body.as_array() {
        return items.iter().collect();
    }
    wrappers
        .iter()
        .chain(GENERIC_WRAPPERS)
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

/// Single-record response, unwrapped from `data` when present
pub fn record(body: &Value) -> &Value {
    match body.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    }
}

/// First present key rendered as a string, or empty
pub fn string(value: &Value, keys: &[&str]) -> String {
    opt_string(value, keys).unwrap_or_default()
}

/// First present, non-null key rendered as a string
///
/// Numbers and booleans are stringified; objects and arrays are skipped.
pub fn opt_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// First present numeric key; numeric strings are accepted
pub fn opt_number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First present timestamp key as RFC 3339, or empty
pub fn timestamp(value: &Value, keys: &[&str]) -> String {
    opt_timestamp(value, keys).unwrap_or_default()
}

/// First present timestamp key as RFC 3339
///
/// Epoch numbers are converted to UTC; strings are passed through untouched.
pub fn opt_timestamp(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Number(n) => n.as_f64().and_then(epoch_to_rfc3339),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// String map stored under `key`, non-string values stringified
pub fn string_map(value: &Value, key: &str) -> std::collections::HashMap<String, String> {
    value
        .get(key)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn epoch_to_rfc3339(raw: f64) -> Option<String> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let millis = if raw < EPOCH_MILLIS_THRESHOLD {
        raw * 1000.0
    } else {
        raw
    };
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
