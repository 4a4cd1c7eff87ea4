use serde::{Deserialize, Serialize};

/// Outcome of a validator: every problem found, never just the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Human-readable problems in detection order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Builds a report whose validity follows from `errors`.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::from_errors(Vec::new())
    }
}
