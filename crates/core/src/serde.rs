//! Serde helper functions for request deserialization.
//!
//! Request bodies come from loosely typed clients: blank strings mean "not provided"
//! and amounts sometimes arrive as strings.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// Deserialize an optional amount given as a JSON number or a numeric string.
///
/// Blank strings are None. Non-numeric strings and non-finite values are errors.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawAmount> = Option::deserialize(deserializer)?;
    let amount = match raw {
        None => return Ok(None),
        Some(RawAmount::Number(n)) => n,
        Some(RawAmount::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(RawAmount::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s}")))?,
    };

    if !amount.is_finite() {
        return Err(serde::de::Error::custom("amount must be a finite number"));
    }
    Ok(Some(amount))
}
