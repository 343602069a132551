//! Batch loop over the input records.

use super::{fetch_inventory, prepare_batches, resolve_batch, QueryFailure};
use crate::azure::{ResourceGraph, SubscriptionDirectory};
use crate::config::{Config, LookupErrorPolicy};
use crate::error::{InventoryError, Result};
use crate::models::{LookupFailure, ServerInventoryRow, SubscriptionRecord};
use std::num::NonZeroUsize;

/// Knobs of the batch loop.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub batch_size: NonZeroUsize,
    pub concurrency: NonZeroUsize,
    pub lookup_error_policy: LookupErrorPolicy,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        PipelineOptions {
            batch_size: config.batch_size,
            concurrency: config.concurrency,
            lookup_error_policy: config.lookup_error_policy,
        }
    }
}

/// Everything collected over a whole run, across all batches.
#[derive(Debug, Default)]
pub struct InventoryReport {
    pub record_count: usize,
    pub batch_count: usize,
    pub resolved_count: usize,
    pub servers: Vec<ServerInventoryRow>,
    pub not_found: Vec<String>,
    pub invalid: Vec<String>,
    pub lookup_errors: Vec<LookupFailure>,
    pub query_failures: Vec<QueryFailure>,
}

/// Resolve and inventory all records, batch by batch.
///
/// Failures are accumulated for the whole run so the caller can write each
/// report file once.
///
/// # Returns
/// * `Err(Lookup)` - Only with [`LookupErrorPolicy::Abort`], on the first failed lookup
pub async fn run_inventory<D, G>(
    directory: &D,
    graph: &G,
    records: &[SubscriptionRecord],
    options: PipelineOptions,
) -> Result<InventoryReport>
where
    D: SubscriptionDirectory,
    G: ResourceGraph,
{
    let mut report = InventoryReport {
        record_count: records.len(),
        ..Default::default()
    };

    for (batch_no, batch) in prepare_batches(records, options.batch_size).enumerate() {
        log::info!("#Start batch#{batch_no} records={}", batch.len());
        let resolution = resolve_batch(directory, batch, options.lookup_error_policy).await;

        if options.lookup_error_policy == LookupErrorPolicy::Abort {
            if let Some(failure) = resolution.lookup_errors.first() {
                return Err(InventoryError::Lookup {
                    name: failure.subscription_name.clone(),
                    message: failure.message.clone(),
                });
            }
        }

        let inventory = fetch_inventory(graph, &resolution.resolved, options.concurrency).await;

        report.batch_count += 1;
        report.resolved_count += resolution.resolved.len();
        report.servers.extend(inventory.servers);
        report.query_failures.extend(inventory.failures);
        report.not_found.extend(resolution.not_found);
        report.invalid.extend(resolution.invalid);
        report.lookup_errors.extend(resolution.lookup_errors);
    }

    Ok(report)
}
