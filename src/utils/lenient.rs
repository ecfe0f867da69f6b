//! Tolerant serde helpers for the productividad API.
//!
//! The backend is untyped JSON: counts arrive as numbers, numeric strings or
//! `null`, and ids arrive as numbers or strings. These helpers collapse every
//! malformed value into a neutral default so a bad field never fails the
//! whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Parses a JSON value into a finite `f64`, accepting numeric strings.
pub fn value_to_f64(value: &JsonValue) -> Option<f64> {
    let parsed = match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        JsonValue::Bool(_) | JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Any value that is not a usable number becomes `0.0`.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64).unwrap_or(0.0))
}

/// Probability in `[0, 1]`; anything unusable becomes `0.0`.
pub fn probability<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64_or_zero(deserializer)?;
    Ok(value.clamp(0.0, 1.0))
}

/// Non-negative whole count. Fractions are rounded, negatives become `0`.
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64_or_zero(deserializer)?;
    Ok(round_count(value))
}

/// Like [`count`] but keeps "absent" distinguishable from zero.
pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64).map(round_count))
}

/// Ids show up as numbers in some payloads and strings in others.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string).unwrap_or_default())
}

pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

/// `null` and missing arrays both become an empty `Vec`.
pub fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes `T` from whatever the backend sent, falling back to
/// `T::default()` when the value is `null` or has the wrong shape.
pub fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default())
}

pub fn value_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(number) => Some(number.to_string()),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn round_count(value: f64) -> u64 {
    if value <= 0.0 {
        0
    } else {
        value.round() as u64
    }
}
