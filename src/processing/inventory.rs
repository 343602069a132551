//! Fetching PostgreSQL server inventory for resolved subscriptions.

use crate::azure::{postgresql_server_query, ResourceGraph};
use crate::error::{InventoryError, Result};
use crate::models::{ResolvedSubscription, ServerInventoryRow};
use futures::stream::{self, StreamExt};
use std::num::NonZeroUsize;

/// A resolved subscription whose inventory query failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    pub subscription_id: String,
    pub resource_group: String,
    pub message: String,
}

/// Inventory collected for one batch.
#[derive(Debug, Default)]
pub struct InventoryBatch {
    pub servers: Vec<ServerInventoryRow>,
    pub failures: Vec<QueryFailure>,
}

/// Query the PostgreSQL servers of one subscription, optionally one resource group.
///
/// One request, no paging: a truncated response is logged and the rows
/// received are returned.
pub async fn get_postgresql_servers<G: ResourceGraph>(
    graph: &G,
    resolved: &ResolvedSubscription,
) -> Result<Vec<ServerInventoryRow>> {
    let query = postgresql_server_query(resolved.resource_group_filter());
    log::debug!("graph query for {}: {query}", resolved.subscription_id);

    let response = graph
        .query_resources(&query, &[resolved.subscription_id.clone()])
        .await?;

    if response.is_truncated() {
        log::warn!(
            "Truncated result for subscription {}: got {} of {:?} records",
            resolved.subscription_id,
            response.data.len(),
            response.total_records
        );
    }

    response
        .data
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            serde_path_to_error::deserialize(row).map_err(|e| InventoryError::Query {
                subscription_id: resolved.subscription_id.clone(),
                message: format!("Error parsing row {i}: path={} error={}", e.path(), e),
            })
        })
        .collect()
}

/// Query every resolved pair, at most `concurrency` at a time.
///
/// Results keep the order of `resolved` regardless of completion order.
/// A failed query is logged and recorded; the others still run.
pub async fn fetch_inventory<G: ResourceGraph>(
    graph: &G,
    resolved: &[ResolvedSubscription],
    concurrency: NonZeroUsize,
) -> InventoryBatch {
    let results: Vec<_> = stream::iter(resolved)
        .map(|r| async move { (r, get_postgresql_servers(graph, r).await) })
        .buffered(concurrency.get())
        .collect()
        .await;

    let mut batch = InventoryBatch::default();
    for (r, result) in results {
        match result {
            Ok(servers) => {
                log::info!(
                    "{} PostgreSQL servers in subscription {} {}",
                    servers.len(),
                    r.subscription_id,
                    r.resource_group_filter()
                        .map(|rg| format!("resource group {rg}"))
                        .unwrap_or_default()
                );
                batch.servers.extend(servers);
            }
            Err(e) => {
                log::error!("{e}");
                batch.failures.push(QueryFailure {
                    subscription_id: r.subscription_id.clone(),
                    resource_group: r.resource_group.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    batch
}
