//! Hash-chain engine: content hashes linked to their predecessor.
//!
//! A transaction hash is the lowercase hex SHA-256 of four length-framed
//! parts, each written as `<decimal byte length>:<bytes>`:
//! `canonical_bytes(data)`, `previous_hash`, `timestamp_millis`, `nonce`. The timestamp and nonce are drawn fresh for
//! every hash, so two calls with identical `data` differ, but both are
//! stored on the [`Transaction`] and [`verify`] replays them exactly.

use std::time::Duration;

use herbtrace_canonical::{
    canonical_bytes, ensure_finite, sha256_hex, HashString, Nonce, Timestamp, TransactionId,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::model::{EntityType, Transaction};
use crate::report::ValidationReport;

/// Default simulated ledger commit latency.
pub const DEFAULT_COMMIT_LATENCY: Duration = Duration::from_millis(1000);

/// The tuple a transaction hash covers.
#[derive(Debug)]
pub struct SignedPayload<'a, T: Serialize + ?Sized> {
    /// Payload; only its canonical bytes matter.
    pub data: &'a T,
    /// Predecessor hash, empty for genesis.
    pub previous_hash: &'a HashString,
    /// Freshness time component.
    pub timestamp: Timestamp,
    /// Freshness random component.
    pub nonce: &'a Nonce,
}

impl<T: Serialize + ?Sized> SignedPayload<'_, T> {
    /// Deterministic digest of the full tuple.
    ///
    /// Each part is prefixed with its length, so no two distinct tuples share
    /// the hashed byte stream.
    pub fn digest(&self) -> Result<HashString, CoreError> {
        let data = canonical_bytes(self.data)?;
        let millis = self.timestamp.as_datetime().timestamp_millis().to_string();
        let parts: [&[u8]; 4] = [
            &data,
            self.previous_hash.as_str().as_bytes(),
            millis.as_bytes(),
            self.nonce.as_str().as_bytes(),
        ];
        let lengths: Vec<String> = parts.iter().map(|part| format!("{}:", part.len())).collect();
        let framed: Vec<&[u8]> = parts
            .iter()
            .zip(&lengths)
            .flat_map(|(part, len)| [len.as_bytes(), *part])
            .collect();
        Ok(sha256_hex(&framed))
    }
}

/// Hashes `data` chained to `previous_hash` with a fresh timestamp and nonce.
///
/// Not idempotent: identical inputs give different hashes.
pub fn hash<T: Serialize + ?Sized>(
    data: &T,
    previous_hash: &HashString,
) -> Result<HashString, CoreError> {
    SignedPayload {
        data,
        previous_hash,
        timestamp: Timestamp::now(),
        nonce: &Nonce::random(),
    }
    .digest()
}

/// Recomputes a transaction's hash from its stored fields and compares.
pub fn verify(transaction: &Transaction) -> bool {
    let recomputed = SignedPayload {
        data: &transaction.data,
        previous_hash: &transaction.previous_hash,
        timestamp: transaction.timestamp,
        nonce: &transaction.nonce,
    }
    .digest();

    match recomputed {
        Ok(hash) => hash == transaction.hash,
        Err(err) => {
            warn!(transaction = %transaction.id, error = %err, "transaction data is not hashable");
            false
        }
    }
}

/// Options for [`verify_chain`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainOptions {
    /// Accept a first transaction whose `previous_hash` points outside the slice.
    pub allow_anchored: bool,
}

/// Verifies every transaction and every link of an ordered chain.
///
/// All failures are reported with their index; the check does not stop at
/// the first one.
pub fn verify_chain(transactions: &[Transaction], options: ChainOptions) -> ValidationReport {
    let mut errors = Vec::new();

    for (i, tx) in transactions.iter().enumerate() {
        if !verify(tx) {
            errors.push(format!("Hash mismatch at index {}", i));
        }

        match i.checked_sub(1).map(|prev| &transactions[prev]) {
            Some(prev) if tx.previous_hash != prev.hash => {
                errors.push(format!(
                    "Broken link at index {}: expected previous hash {}, found {}",
                    i, prev.hash, tx.previous_hash
                ));
            }
            None if !options.allow_anchored && !tx.previous_hash.is_empty() => {
                errors.push("Unanchored genesis at index 0".to_string());
            }
            _ => {}
        }
    }

    if !errors.is_empty() {
        debug!(failures = errors.len(), "chain verification failed");
    }
    ValidationReport::from_errors(errors)
}

/// Simulated ledger settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Delay awaited before a created transaction is returned.
    pub commit_latency: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            commit_latency: DEFAULT_COMMIT_LATENCY,
        }
    }
}

impl LedgerConfig {
    /// No simulated delay.
    pub fn immediate() -> Self {
        Self {
            commit_latency: Duration::ZERO,
        }
    }
}

/// Creates transactions. Holds configuration only; no ledger state.
#[derive(Debug, Clone, Default)]
pub struct HashChainEngine {
    config: LedgerConfig,
}

impl HashChainEngine {
    /// Engine with the given ledger settings.
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Ledger settings in use.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Builds and hashes a transaction for one entity event.
    ///
    /// `data` becomes `{entity_type, ...entity_data, location}` where
    /// `location` is the entity's `coordinates` field or `null`. A non-object
    /// payload is stored under `payload`. A NaN or infinite float anywhere in
    /// `entity_data` fails with [`CoreError::Canonicalization`]. The call awaits the configured
    /// commit latency before returning; dropping the future discards the
    /// transaction.
    #[tracing::instrument(skip_all, fields(entity_type = %entity_type))]
    pub async fn create_transaction<T: Serialize + ?Sized>(
        &self,
        entity_type: EntityType,
        entity_data: &T,
        previous_hash: Option<&HashString>,
    ) -> Result<Transaction, CoreError> {
        ensure_finite(entity_data)?;
        let data = transaction_data(entity_type, serde_json::to_value(entity_data)?);
        let previous_hash = previous_hash.cloned().unwrap_or_default();
        let timestamp = Timestamp::now();
        let nonce = Nonce::random();

        let hash = SignedPayload {
            data: &data,
            previous_hash: &previous_hash,
            timestamp,
            nonce: &nonce,
        }
        .digest()?;

        let transaction = Transaction {
            id: TransactionId::random(),
            timestamp,
            data,
            hash,
            previous_hash,
            nonce,
            merkle_root: None,
            signature: None,
        };

        tokio::time::sleep(self.config.commit_latency).await;

        debug!(id = %transaction.id, hash = %transaction.hash, "transaction committed");
        Ok(transaction)
    }
}

fn transaction_data(entity_type: EntityType, entity_data: Value) -> Value {
    let location = entity_data
        .get("coordinates")
        .cloned()
        .unwrap_or(Value::Null);

    let mut data = Map::new();
    data.insert("entity_type".to_string(), Value::from(entity_type.as_str()));
    match entity_data {
        Value::Object(fields) => data.extend(fields),
        other => {
            data.insert("payload".to_string(), other);
        }
    }
    data.insert("location".to_string(), location);
    Value::Object(data)
}
