//! Chain-of-custody checks over a product's provenance records.

use tracing::debug;

use crate::model::{ProvenanceRecord, VerificationStatus};
use crate::report::ValidationReport;

/// Checks chronology and stage progression of an ordered record sequence.
///
/// Chronology errors come first, then progression errors. Repeated stages
/// are allowed; only a strict step backwards in the canonical ordering is
/// reported.
pub fn validate_supply_chain(chain: &[ProvenanceRecord]) -> ValidationReport {
    let mut errors = Vec::new();

    for (i, pair) in chain.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            errors.push(format!("Invalid timestamp order at index {}", i + 1));
        }
    }

    for pair in chain.windows(2) {
        let (prev, curr) = (pair[0].entity_type, pair[1].entity_type);
        if curr.stage_index() < prev.stage_index() {
            errors.push(format!(
                "Invalid supply chain progression: {} -> {}",
                prev, curr
            ));
        }
    }

    debug!(records = chain.len(), errors = errors.len(), "supply chain validated");
    ValidationReport::from_errors(errors)
}

/// Marks every record verified or failed according to `report`.
pub fn apply_verdict(records: &mut [ProvenanceRecord], report: &ValidationReport) {
    let status = if report.is_valid {
        VerificationStatus::Verified
    } else {
        VerificationStatus::Failed
    };
    for record in records {
        record.verification_status = status;
    }
}
