//! Azure Resource Graph query text and response parsing.

use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};

/// Resource graph query selecting PostgreSQL single servers.
pub const POSTGRESQL_SERVER_QUERY: &str = "Resources \
    | where type =~ 'Microsoft.DBforPostgreSQL/servers' \
    | project subscriptionId, name, resourceGroup, location, sku";

/// Build the server query, optionally restricted to one resource group.
pub fn postgresql_server_query(resource_group: Option<&str>) -> String {
    match resource_group {
        Some(rg) => format!(
            "{POSTGRESQL_SERVER_QUERY} | where resourceGroup == {}",
            kql_string_literal(rg)
        ),
        None => POSTGRESQL_SERVER_QUERY.to_string(),
    }
}

/// Quote a value as a single-quoted KQL string literal.
fn kql_string_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Response body of a resource graph query.
///
/// The REST API uses camelCase (`totalRecords`, `$skipToken`), `az graph query`
/// uses snake_case; both are accepted.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct GraphResponse {
    /// Rows in object-array form.
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    /// Token for the next page (if more results are available).
    #[serde(default, alias = "$skipToken", alias = "skipToken")]
    pub skip_token: Option<String>,
    /// Total number of records matching the query.
    #[serde(default, alias = "totalRecords")]
    pub total_records: Option<u64>,
    /// Count of records in this response.
    #[serde(default)]
    pub count: u64,
    #[serde(default, alias = "resultTruncated")]
    pub result_truncated: Option<String>,
}

impl GraphResponse {
    /// True when the service returned fewer rows than matched the query.
    pub fn is_truncated(&self) -> bool {
        self.skip_token.is_some()
            || self
                .result_truncated
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("true"))
    }
}

/// Parse a graph response body, reporting the JSON path of any mismatch.
pub fn parse_graph_response(body: &str, subscription_id: &str) -> Result<GraphResponse> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", body);
        InventoryError::Query {
            subscription_id: subscription_id.to_string(),
            message: format!("Error parsing graph response: path={} error={}", e.path(), e),
        }
    })
}
