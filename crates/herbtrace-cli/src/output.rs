//! Output formatting utilities.

use herbtrace_core::{Transaction, ValidationReport};
use serde::Serialize;

/// Formats a value as pretty JSON.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a transaction as a simple table row.
pub fn format_transaction_row(index: usize, tx: &Transaction, ok: bool) -> String {
    let entity_type = tx
        .data
        .get("entity_type")
        .and_then(|v| v.as_str())
        .unwrap_or("?");

    format!(
        "{:<6} {:<34} {:<15} {:<24} {}",
        index,
        truncate(tx.id.as_str(), 34),
        entity_type,
        truncate(tx.hash.as_str(), 24),
        if ok { "ok" } else { "FAILED" }
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_transaction_header() {
    println!(
        "{:<6} {:<34} {:<15} {:<24} {}",
        "INDEX", "TRANSACTION_ID", "TYPE", "HASH", "STATUS"
    );
    println!("{}", "-".repeat(90));
}

/// Prints a validation report in plain text.
pub fn print_report(report: &ValidationReport) {
    if report.is_valid {
        println!("valid");
        return;
    }
    println!("invalid ({} error(s))", report.errors.len());
    for error in &report.errors {
        println!("  - {}", error);
    }
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("abcdef", 6), "abcdef");
        assert_eq!(truncate("abcdefg", 6), "abc...");

        // 23 characters but 46 bytes
        let accented = "\u{e9}".repeat(23);
        assert_eq!(truncate(&accented, 34), accented);
        assert_eq!(
            truncate(&"\u{e9}".repeat(40), 24),
            format!("{}...", "\u{e9}".repeat(21))
        );
    }
}
