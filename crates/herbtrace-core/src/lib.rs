//! Traceability core for medicinal-herb supply chains.
//!
//! This crate provides:
//! - Provenance records and per-stage payloads (collection through packaging)
//! - A hash-chain engine linking each transaction to its predecessor
//! - Merkle roots and inclusion proofs over batches of records
//! - Chain-of-custody validation (chronology and stage progression)
//! - Geofence containment and seasonal harvest windows
//! - The JSON payload carried by batch and product QR codes, and its SVG rendering
//!
//! Core invariants:
//! - Transaction hashes cover length-framed `canonical_bytes(data)`, `previous_hash`, `timestamp`, `nonce`
//! - A chain is valid when every hash recomputes and every link matches its predecessor
//! - Validators never fail; they return every problem found as a message
//! - Only transaction creation suspends (simulated commit latency)
//!
#![deny(missing_docs)]

/// Error types for core operations.
pub mod errors;
/// Geofence and seasonal-window validation.
pub mod geofence;
/// Transaction hashing, verification, and chaining.
pub mod hash_chain;
/// Merkle roots and inclusion proofs.
pub mod merkle;
/// Entity types, provenance records, and transactions.
pub mod model;
/// Supply-chain order validation.
pub mod order;
/// Stage-specific payloads and their field checks.
pub mod payload;
/// QR code payload format.
pub mod qr;
/// Validation outcome shared by validators.
pub mod report;
/// Offline submission queue.
pub mod sync_queue;

pub use errors::CoreError;
pub use geofence::{
    haversine_distance, is_inside_geofence, validate_harvest_location,
    validate_harvest_location_in, Boundary, GeofenceZone, HarvestValidation, SeasonWindow,
};
pub use hash_chain::{
    hash, verify, verify_chain, ChainOptions, HashChainEngine, LedgerConfig, SignedPayload,
};
pub use merkle::{merkle_proof, merkle_root, provenance_root, MerkleProof};
pub use model::{EntityType, GeoPoint, ProvenanceRecord, Transaction, VerificationStatus};
pub use order::{apply_verdict, validate_supply_chain};
pub use payload::StagePayload;
pub use qr::{BatchLabel, ProductLabel, QrKind, QrPayload, QrStyle};
pub use report::ValidationReport;
pub use sync_queue::SyncQueue;
