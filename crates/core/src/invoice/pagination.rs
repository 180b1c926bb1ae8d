//! Opaque continuation cursors.
//!
//! A cursor is the JSON text of the last key a query returned: an object mapping each
//! key attribute name to its string value. Resuming from a cursor starts strictly after
//! that key.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

/// Position of the last item returned by a query, by attribute name.
pub type PageKey = BTreeMap<String, String>;

/// Reasons a cursor cannot be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor is not valid JSON: {0}")]
    Syntax(String),
    #[error("cursor must be a JSON object of string attributes")]
    Shape,
    #[error("cursor carries no key attributes")]
    Empty,
}

/// Serializes a page key into a cursor.
pub fn encode(key: &PageKey) -> String {
    let object: Map<String, Value> = key
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(object).to_string()
}

/// Parses a cursor back into the page key it was encoded from.
pub fn decode(cursor: &str) -> Result<PageKey, CursorError> {
    let value: Value =
        serde_json::from_str(cursor).map_err(|e| CursorError::Syntax(e.to_string()))?;

    let Value::Object(object) = value else {
        return Err(CursorError::Shape);
    };

    if object.is_empty() {
        return Err(CursorError::Empty);
    }

    object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            _ => Err(CursorError::Shape),
        })
        .collect()
}
