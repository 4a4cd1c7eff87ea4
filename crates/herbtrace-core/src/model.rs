use herbtrace_canonical::{EntityId, HashString, Nonce, Timestamp, TransactionId, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::payload::StagePayload;

/// Supply-chain stage a record belongs to.
///
/// Declaration order is the canonical stage ordering; a valid chain never
/// moves backwards through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Harvest of raw herbs in the field.
    Collection,
    /// Washing, drying, grinding and similar steps.
    Processing,
    /// Laboratory quality testing.
    Testing,
    /// Formulation into a finished product batch.
    Manufacturing,
    /// Final packaging and labelling.
    Packaging,
}

impl EntityType {
    /// All stages in canonical order.
    pub const CANONICAL_ORDER: [EntityType; 5] = [
        EntityType::Collection,
        EntityType::Processing,
        EntityType::Testing,
        EntityType::Manufacturing,
        EntityType::Packaging,
    ];

    /// Position of this stage in [`EntityType::CANONICAL_ORDER`].
    pub fn stage_index(self) -> usize {
        match self {
            EntityType::Collection => 0,
            EntityType::Processing => 1,
            EntityType::Testing => 2,
            EntityType::Manufacturing => 3,
            EntityType::Packaging => 4,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Collection => "collection",
            EntityType::Processing => "processing",
            EntityType::Testing => "testing",
            EntityType::Manufacturing => "manufacturing",
            EntityType::Packaging => "packaging",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::CANONICAL_ORDER
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ValidationError::PatternMismatch {
                field: "entity_type",
                value: s.to_string(),
            })
    }
}

/// Verification state of a provenance record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Not yet checked.
    #[default]
    Pending,
    /// Part of a chain that passed order validation.
    Verified,
    /// Part of a chain that failed order validation.
    Failed,
}

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    /// Latitude, -90 to 90.
    pub lat: f64,
    /// Longitude, -180 to 180.
    pub lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude")]
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = ValidationError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Constructs a validated point.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::OutOfBounds {
                field: "lat",
                value: lat.to_string(),
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::OutOfBounds {
                field: "lng",
                value: lng.to_string(),
            });
        }
        Ok(Self { lat, lng })
    }
}

/// One attested event in a product's supply-chain history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// Transaction that recorded this event.
    pub transaction_id: TransactionId,
    /// Stage of the event; drives the order validator.
    pub entity_type: EntityType,
    /// Store-owned object this record describes.
    pub entity_id: EntityId,
    /// Attested fields.
    pub data: StagePayload,
    /// Where the event happened, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// When the event occurred (not when it was recorded).
    pub timestamp: Timestamp,
    /// Outcome of chain validation.
    #[serde(default)]
    pub verification_status: VerificationStatus,
    /// Hash produced by the hash-chain engine.
    pub block_hash: HashString,
}

impl ProvenanceRecord {
    /// True when the payload variant agrees with `entity_type`.
    pub fn payload_matches_stage(&self) -> bool {
        self.data.entity_type() == self.entity_type
    }
}

/// Hash-chain unit created once per recorded event.
///
/// `hash` covers `data`, `previous_hash`, `timestamp` and `nonce`; all four
/// are stored so the hash can be recomputed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Random identifier.
    pub id: TransactionId,
    /// Creation time; part of the hash input.
    pub timestamp: Timestamp,
    /// Entity payload with `entity_type` and `location` folded in.
    pub data: Value,
    /// Digest over the signed payload.
    pub hash: HashString,
    /// Hash of the preceding transaction, empty for genesis.
    #[serde(default)]
    pub previous_hash: HashString,
    /// Freshness salt; part of the hash input.
    pub nonce: Nonce,
    /// Optional batch commitment this transaction belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<HashString>,
    /// Optional detached signature over `hash`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}
