//! PostgreSQL server rows returned by the resource graph query.

use serde::{Deserialize, Serialize};

/// Pricing tier of a server. The resource graph returns `null` or a
/// partial object for some servers, so every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Sku {
    pub name: Option<String>,
    pub tier: Option<String>,
    pub family: Option<String>,
    pub capacity: Option<u64>,
}

/// One projected row of `subscriptionId, name, resourceGroup, location, sku`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerInventoryRow {
    pub subscription_id: String,
    pub name: String,
    pub resource_group: String,
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sku: Sku,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
