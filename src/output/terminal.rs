//! Terminal output utilities.

use crate::processing::InventoryReport;
use colored::Colorize;

/// Format a value as a right-aligned field of at least `width` characters.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    if value_str.len() >= width {
        value_str
    } else {
        format!("{value_str:>width$}")
    }
}

fn summary_lines(report: &InventoryReport) -> Vec<(&'static str, usize)> {
    vec![
        ("records", report.record_count),
        ("batches", report.batch_count),
        ("resolved", report.resolved_count),
        ("not found", report.not_found.len()),
        ("invalid", report.invalid.len()),
        ("lookup errors", report.lookup_errors.len()),
        ("servers", report.servers.len()),
        ("query failures", report.query_failures.len()),
    ]
}

/// Print the end of run counts to stdout, failures highlighted.
pub fn print_summary(report: &InventoryReport) {
    println!("{}", "# PostgreSQL single server inventory".bold());
    for (label, count) in summary_lines(report) {
        let value = format_field(count, 8);
        let is_failure = matches!(
            label,
            "not found" | "invalid" | "lookup errors" | "query failures"
        );
        if is_failure && count > 0 {
            println!("{}: {}", format_field(label, 16), value.red());
        } else {
            println!("{}: {}", format_field(label, 16), value);
        }
    }
}
