//! Lenient deserializers for row fields whose wire type varies between
//! schema revisions (numeric vs. string ids, numbers stored as strings,
//! `null` where a list or text is expected).

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a string or an integer id and normalizes it to a string.
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("invalid id: {other}"))),
    }
}

/// Largest amount accepted from a row. Keeps sums of many rows far from
/// `u64::MAX` and every accepted value exact in an `f64`.
pub const MAX_AMOUNT: u64 = 1_000_000_000_000_000;

/// Accepts an integer, a float, a numeric string or `null` (as zero), up to
/// [`MAX_AMOUNT`].
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_u64().map(|n| n as f64).or_else(|| n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() && n >= 0.0 && n.round() <= MAX_AMOUNT as f64 => Ok(n.round() as u64),
        Some(n) if n.is_finite() && n >= 0.0 => Err(D::Error::custom(format!("amount out of range: {value}"))),
        _ => Err(D::Error::custom(format!("invalid amount: {value}"))),
    }
}

/// Accepts a quantity as an integer, numeric string or `null` (as zero).
pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let amount = amount(deserializer)?;
    u32::try_from(amount).map_err(|_| D::Error::custom(format!("quantity out of range: {amount}")))
}

/// Treats `null` as an empty string.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Treats `null` and empty strings as absent.
pub fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

/// Treats `null` as an empty list.
pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
