//! Resolving subscription display names for one batch.

use crate::azure::SubscriptionDirectory;
use crate::config::LookupErrorPolicy;
use crate::error::InventoryError;
use crate::models::{BatchResolution, Resolution, SubscriptionRecord};
use itertools::Itertools;

/// Look up every record of `batch` in order and classify it.
///
/// Lookup call failures are logged and returned as
/// [`Resolution::LookupError`], except under [`LookupErrorPolicy::NotFound`]
/// where they are classified as not found in place.
pub async fn resolve_batch<D: SubscriptionDirectory>(
    directory: &D,
    batch: &[SubscriptionRecord],
    policy: LookupErrorPolicy,
) -> BatchResolution {
    let mut result = BatchResolution::default();

    for record in batch {
        let lookup = directory
            .find_subscription_id(&record.subscription_name)
            .await
            .map_err(|e| {
                log::error!("{e}");
                match e {
                    InventoryError::Lookup { message, .. } => message,
                    other => other.to_string(),
                }
            });
        let resolution = match Resolution::classify(record, lookup) {
            Resolution::LookupError { .. } if policy == LookupErrorPolicy::NotFound => {
                Resolution::NotFound
            }
            resolution => resolution,
        };
        match &resolution {
            Resolution::Resolved(r) => {
                log::debug!("{} -> {}", record.subscription_name, r.subscription_id)
            }
            Resolution::NotFound => log::warn!("Subscription not found: {}", record.subscription_name),
            Resolution::Invalid { returned_id } => log::warn!(
                "Subscription {} has invalid id '{returned_id}'",
                record.subscription_name
            ),
            Resolution::LookupError { .. } => {}
        }
        result.push(record, resolution);
    }

    log::info!(
        "Subscription Ids: [{}]",
        result
            .resolved
            .iter()
            .map(|r| format!("({}, {})", r.subscription_id, r.resource_group))
            .join(", ")
    );
    result
}
