//! Hash command implementation.

use herbtrace_canonical::HashString;
use herbtrace_core::{EntityType, HashChainEngine, LedgerConfig};
use serde_json::Value;
use tracing::info;

use super::read_json;
use crate::output;

pub async fn run(
    input: Option<String>,
    entity_type: EntityType,
    previous: Option<String>,
    ledger: LedgerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let entity: Value = read_json(input.as_deref())?;

    let previous = previous
        .map(|hash| HashString::parse(hash).map_err(|e| format!("Invalid previous hash: {}", e)))
        .transpose()?;

    let engine = HashChainEngine::new(ledger);
    let tx = engine
        .create_transaction(entity_type, &entity, previous.as_ref())
        .await?;

    info!(id = %tx.id, hash = %tx.hash, "transaction created");
    println!("{}", output::format_json(&tx));
    Ok(())
}
