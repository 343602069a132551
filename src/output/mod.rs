//! Report files and console output.
//!
//! - [`csv`] - failure lists and the server inventory as CSV files
//! - [`terminal`] - end of run summary

mod csv;
mod terminal;

pub use csv::{escape_csv_field, save_inventory, save_lookup_errors, save_subscriptions};
pub use terminal::{format_field, print_summary};
