//! Verify command implementation.

use herbtrace_core::{hash_chain, verify_chain, ChainOptions, Transaction};
use serde_json::json;

use super::read_json;
use crate::output;

pub fn run(
    input: Option<String>,
    strict: bool,
    anchored: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let chain: Vec<Transaction> = read_json(input.as_deref())?;

    let report = verify_chain(
        &chain,
        ChainOptions {
            allow_anchored: anchored,
        },
    );

    if json_output {
        let transactions: Vec<_> = chain
            .iter()
            .enumerate()
            .map(|(index, tx)| {
                json!({
                    "index": index,
                    "id": tx.id,
                    "hash": tx.hash,
                    "hash_ok": hash_chain::verify(tx),
                })
            })
            .collect();
        let body = json!({
            "transactions": transactions,
            "is_valid": report.is_valid,
            "errors": report.errors,
        });
        println!("{}", output::format_json(&body));
    } else {
        output::print_transaction_header();
        for (index, tx) in chain.iter().enumerate() {
            println!(
                "{}",
                output::format_transaction_row(index, tx, hash_chain::verify(tx))
            );
        }
        println!();
        output::print_report(&report);
    }

    if strict && !report.is_valid {
        std::process::exit(1);
    }

    Ok(())
}
