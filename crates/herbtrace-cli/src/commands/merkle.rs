//! Merkle command implementation.

use herbtrace_core::merkle::{leaf_hash, merkle_proof, merkle_root};
use serde_json::{json, Value};

use super::read_json;
use crate::output;

pub fn run(input: Option<String>, proof: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let items: Vec<Value> = read_json(input.as_deref())?;
    let root = merkle_root(&items)?;

    let Some(index) = proof else {
        println!("{}", root);
        return Ok(());
    };

    let proof = merkle_proof(&items, index)?
        .ok_or_else(|| format!("Index {} out of range for {} item(s)", index, items.len()))?;
    let body = json!({
        "root": root,
        "leaf": leaf_hash(&items[index])?,
        "proof": proof,
    });
    println!("{}", output::format_json(&body));
    Ok(())
}
