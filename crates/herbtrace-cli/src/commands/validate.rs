//! Validate command implementation.

use herbtrace_core::{validate_supply_chain, ProvenanceRecord, ValidationReport};

use super::read_json;
use crate::output;

pub fn run(
    input: Option<String>,
    fields: bool,
    strict: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let records: Vec<ProvenanceRecord> = read_json(input.as_deref())?;

    let mut report = validate_supply_chain(&records);
    if fields {
        let mut errors = report.errors;
        for (index, record) in records.iter().enumerate() {
            if !record.payload_matches_stage() {
                errors.push(format!(
                    "Record {}: payload is for {}, record is {}",
                    index,
                    record.data.entity_type(),
                    record.entity_type
                ));
            }
            errors.extend(
                record
                    .data
                    .validate()
                    .into_iter()
                    .map(|e| format!("Record {}: {}", index, e)),
            );
        }
        report = ValidationReport::from_errors(errors);
    }

    if json_output {
        println!("{}", output::format_json(&report));
    } else {
        output::print_report(&report);
    }

    if strict && !report.is_valid {
        std::process::exit(1);
    }

    Ok(())
}
