//! Canonicalize command implementation.

use herbtrace_canonical::Canonicalizer;
use serde_json::Value;

use super::read_json;

pub fn run(input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let value: Value = read_json(input.as_deref())?;

    let bytes = Canonicalizer::new()
        .canonicalize(&value)
        .map_err(|e| format!("Canonicalization failed: {}", e))?;

    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
