//! Inventory of Azure Database for PostgreSQL single servers.
//!
//! Reads subscription display names and resource groups from a CSV, resolves
//! each name to a subscription id, queries Azure Resource Graph for the
//! PostgreSQL servers in scope and writes the results and failures as CSV.

pub mod azure;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod processing;

use azure::AzureClient;
use colored::Colorize;
use config::Config;
use error::Result;
use processing::{run_inventory, InventoryReport, PipelineOptions};

pub use error::InventoryError;

/// Run the whole inventory for `config` and write every report file.
///
/// # Returns
/// * `Ok(InventoryReport)` - Run completed; check `query_failures` for partial failures
/// * `Err(FileNotFound | ClientInit | ...)` - Fatal, nothing written
pub async fn run(config: &Config) -> Result<InventoryReport> {
    let records = input::read_subscription_records(&config.input, &config.resource_group_column)?;
    let client = AzureClient::connect(config).await?;
    let queried_at = chrono::Utc::now();

    let report = run_inventory(&client, &client, &records, PipelineOptions::from(config)).await?;
    write_reports(config, &report, queried_at)?;

    log::info!(
        "#End run: {resolved}/{total} resolved, {servers} servers, {nf} not found, {inv} invalid, {le} lookup errors",
        resolved = report.resolved_count,
        total = report.record_count,
        servers = report.servers.len(),
        nf = report.not_found.len(),
        inv = report.invalid.len(),
        le = report.lookup_errors.len(),
    );
    for failure in &report.query_failures {
        log::warn!(
            "{} {} {}: {}",
            "query failed".on_red(),
            failure.subscription_id,
            failure.resource_group,
            failure.message
        );
    }
    Ok(report)
}

/// Write the failure lists and the inventory, once each.
pub fn write_reports(
    config: &Config,
    report: &InventoryReport,
    queried_at: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    output::save_subscriptions(&config.not_found_file, &report.not_found)?;
    output::save_subscriptions(&config.invalid_file, &report.invalid)?;
    output::save_lookup_errors(&config.lookup_error_file, &report.lookup_errors)?;
    output::save_inventory(&config.output, &report.servers, queried_at)?;
    Ok(())
}
