use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;

use crate::validation::ValidationError;

/// Lowercase hex SHA-256 digest, or the empty string.
///
/// The empty value stands for "no hash": the previous hash of a genesis
/// transaction and the Merkle root of an empty batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashString(String);

impl HashString {
    /// The empty hash.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Parses a hash, accepting 64 hex digits (any case) or the empty string.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let re = Regex::new(r"^([0-9a-fA-F]{64})?$").expect("invalid regex");
        if !re.is_match(&value) {
            return Err(ValidationError::PatternMismatch {
                field: "hash",
                value,
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// True for the empty hash.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex text of the digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HashString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 over the concatenation of `parts`, rendered lowercase hex.
pub fn sha256_hex(parts: &[&[u8]]) -> HashString {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    HashString(hex::encode(hasher.finalize()))
}
