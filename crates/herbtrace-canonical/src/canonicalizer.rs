use canonical_json::to_string;
use serde::Serialize;
use serde_json::Value;

use crate::finite::ensure_finite;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Provided value could not be turned into JSON.
    #[error("invalid JSON structure: {0}")]
    InvalidStructure(String),
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {0}")]
    NonFiniteNumber(String),
    /// Generic failure.
    #[error("other error: {0}")]
    Other(String),
}

/// Canonicalizer that emits deterministic bytes.
///
/// By default numbers are rendered as JSON strings before RFC 8785
/// serialization.
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer {
    stringify_numbers: bool,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canonicalizer {
    /// Creates the default canonicalizer (numbers are stringified).
    pub fn new() -> Self {
        Self {
            stringify_numbers: true,
        }
    }

    /// Creates a canonicalizer that keeps JSON numbers as numbers.
    pub fn preserving_numbers() -> Self {
        Self {
            stringify_numbers: false,
        }
    }

    /// Produces canonical bytes for a JSON value.
    pub fn canonicalize(&self, value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
        let canonical = if self.stringify_numbers {
            let mut owned = value.clone();
            stringify_numbers(&mut owned);
            to_string(&owned)
        } else {
            to_string(value)
        }
        .map_err(|err| CanonicalizationError::Other(err.to_string()))?;

        Ok(canonical.into_bytes())
    }

    /// Serializes any value and canonicalizes the result.
    ///
    /// NaN and infinite floats are rejected with their path.
    pub fn canonicalize_serialize<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, CanonicalizationError> {
        ensure_finite(value)?;
        let value = serde_json::to_value(value)
            .map_err(|err| CanonicalizationError::InvalidStructure(err.to_string()))?;
        self.canonicalize(&value)
    }
}

/// Canonical bytes of any serializable value using the default profile.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalizationError> {
    Canonicalizer::new().canonicalize_serialize(value)
}

/// Recursively converts all JSON numbers into strings.
fn stringify_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            let s = n.to_string();
            *value = Value::String(s);
        }
        Value::Array(arr) => {
            for v in arr {
                stringify_numbers(v);
            }
        }
        Value::Object(map) => {
            for v in map.values_mut() {
                stringify_numbers(v);
            }
        }
        _ => {}
    }
}
