use crate::validation::ValidationError;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new instance without validation; callers are responsible for conformity.
            pub fn new(value: String) -> Self {
                Self(value)
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Borrowed string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    TransactionId,
    "Opaque transaction identifier (hex from the engine, UUIDs from the store).",
    r"^[A-Za-z0-9_-]{1,128}$"
);
newtype!(
    EntityId,
    "Identifier of the store-owned object a provenance record describes.",
    r"^[A-Za-z0-9_-]{1,128}$"
);
newtype!(
    Nonce,
    "Freshness salt mixed into a transaction hash (32 lowercase hex digits).",
    r"^[0-9a-f]{32}$"
);

impl TransactionId {
    /// Random 16-byte identifier rendered as hex.
    pub fn random() -> Self {
        Self(hex::encode(rand_bytes()))
    }
}

impl Nonce {
    /// Random 16-byte nonce rendered as hex.
    pub fn random() -> Self {
        Self(hex::encode(rand_bytes()))
    }
}

fn rand_bytes() -> [u8; 16] {
    rand::random()
}

/// UTC instant with millisecond precision, serialized as RFC 3339 with a `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current wall-clock time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wraps a chrono instant, truncating to milliseconds.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let millis = at.timestamp_millis();
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(at))
    }

    /// Parses any RFC 3339 timestamp and normalizes it to UTC.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(value)
            .map(|at| Self::from_datetime(at.with_timezone(&Utc)))
            .map_err(|_| ValidationError::PatternMismatch {
                field: "Timestamp",
                value: value.to_string(),
            })
    }

    /// Underlying chrono value.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Calendar month, 1 through 12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Canonical text form, e.g. `2024-03-01T06:30:00.000Z`.
    pub fn to_canonical_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trips_through_json() {
        let ts = Timestamp::parse("2024-03-01T12:00:00+05:30").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01T06:30:00.000Z");
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn now_survives_serialization() {
        let ts = Timestamp::now();
        let back = Timestamp::parse(&ts.to_string()).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn random_identifiers_are_valid_and_distinct() {
        let a = Nonce::random();
        let b = Nonce::random();
        assert_ne!(a, b);
        assert!(Nonce::parse(a.as_str()).is_ok());
        assert_eq!(TransactionId::random().as_str().len(), 32);
    }

    #[test]
    fn identifiers_reject_whitespace() {
        assert!(EntityId::parse("collection 1").is_err());
        assert!(EntityId::parse("3f2b-collection_1").is_ok());
    }

    #[test]
    fn deserialization_applies_the_pattern() {
        let short = format!("\"{}\"", "a".repeat(31));
        assert!(serde_json::from_str::<Nonce>(&short).is_err());
        let exact = format!("\"{}\"", "a".repeat(32));
        assert!(serde_json::from_str::<Nonce>(&exact).is_ok());
        assert!(serde_json::from_str::<Nonce>(&format!("\"{}\"", "A".repeat(32))).is_err());

        let accented = format!("\"{}\"", "\u{e9}".repeat(23));
        assert!(serde_json::from_str::<TransactionId>(&accented).is_err());
        assert!(serde_json::from_str::<EntityId>(r#""herb-7""#).is_ok());
    }
}
