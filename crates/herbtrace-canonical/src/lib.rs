//! Canonical primitives for herbtrace provenance hashing.
//!
//! Every byte that feeds a transaction hash or a Merkle leaf is produced by
//! this crate: canonical JSON (RFC 8785), lowercase hex SHA-256 digests, and
//! the validated identifiers carried by provenance records.
//!
#![deny(missing_docs)]

/// Canonicalization helpers for deterministic hashing.
pub mod canonicalizer;
/// SHA-256 digests rendered as hex strings.
pub mod digest;
/// Rejection of NaN and infinite floats before JSON conversion.
pub mod finite;
/// Identifier newtypes and timestamps.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{canonical_bytes, CanonicalizationError, Canonicalizer};
pub use digest::{sha256_hex, HashString};
pub use finite::ensure_finite;
pub use identifiers::{EntityId, Nonce, Timestamp, TransactionId};
pub use validation::ValidationError;
