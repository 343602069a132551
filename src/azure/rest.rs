//! Azure Resource Manager REST backend.
//!
//! Tokens come from `azure_identity` (environment, managed identity or Azure
//! CLI credentials) unless a static bearer token is supplied.

use super::graph::{parse_graph_response, GraphResponse};
use super::{ResourceGraph, SubscriptionDirectory};
use crate::error::{InventoryError, Result};
use azure_core::auth::TokenCredential;
use serde::Deserialize;
use std::sync::Arc;

const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";
const RESOURCE_GRAPH_API_VERSION: &str = "2021-03-01";
const GRAPH_PAGE_SIZE: u32 = 1000;

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum TokenSource {
    /// A pre-issued token, e.g. from `az account get-access-token`.
    Static(String),
    Credential(Arc<dyn TokenCredential>),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("TokenSource::Static(***)"),
            TokenSource::Credential(_) => f.write_str("TokenSource::Credential"),
        }
    }
}

impl TokenSource {
    /// Ambient credential discovery (environment, managed identity, Azure CLI).
    pub fn from_environment() -> Self {
        TokenSource::Credential(Arc::new(azure_identity::DefaultAzureCredential::default()))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SubscriptionEntry {
    subscription_id: String,
    display_name: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SubscriptionPage {
    #[serde(default)]
    value: Vec<SubscriptionEntry>,
    next_link: Option<String>,
}

/// HTTP client for the subscriptions and resource graph endpoints.
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl ArmClient {
    /// # Arguments
    /// * `endpoint` - ARM base URL without trailing slash, e.g. `https://management.azure.com`
    /// * `tokens` - Bearer token source
    pub fn new(endpoint: impl Into<String>, tokens: TokenSource) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InventoryError::ClientInit(e.to_string()))?;
        Ok(ArmClient {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    async fn bearer_token(&self) -> std::result::Result<String, String> {
        match &self.tokens {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Credential(credential) => {
                let scope = format!("{}/.default", self.endpoint);
                let token = credential
                    .get_token(&[scope.as_str()])
                    .await
                    .map_err(|e| format!("Error acquiring token: {e}"))?;
                Ok(token.token.secret().to_string())
            }
        }
    }

    /// Acquire one token so credential problems surface before the run starts.
    pub async fn check_credentials(&self) -> Result<()> {
        self.bearer_token()
            .await
            .map(|_| ())
            .map_err(InventoryError::ClientInit)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> std::result::Result<String, String> {
        let token = self.bearer_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Error reading response body: {e}"))?;
        if !status.is_success() {
            log::debug!("HTTP {status} body: {body}");
            return Err(format!("HTTP {status}: {}", body.trim()));
        }
        Ok(body)
    }
}

impl SubscriptionDirectory for ArmClient {
    async fn find_subscription_id(&self, display_name: &str) -> Result<Option<String>> {
        let lookup_error = |message: String| InventoryError::Lookup {
            name: display_name.to_string(),
            message,
        };

        let mut next = Some(format!(
            "{}/subscriptions?api-version={SUBSCRIPTIONS_API_VERSION}",
            self.endpoint
        ));
        let mut page_count = 0;
        while let Some(url) = next.take() {
            let body = self.send(self.http.get(&url)).await.map_err(lookup_error)?;
            let mut deserializer = serde_json::Deserializer::from_str(&body);
            let page: SubscriptionPage = serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|e| {
                    lookup_error(format!(
                        "Error parsing subscription page {page_count}: path={} error={}",
                        e.path(),
                        e
                    ))
                })?;
            log::trace!("subscription page#{page_count} entries={}", page.value.len());

            if let Some(found) = page.value.into_iter().find(|s| s.display_name == display_name) {
                return Ok(Some(found.subscription_id));
            }

            if page.next_link.as_deref() == Some(url.as_str()) {
                return Err(lookup_error("nextLink not unique - possible infinite loop".into()));
            }
            next = page.next_link;
            page_count += 1;
        }
        Ok(None)
    }
}

impl ResourceGraph for ArmClient {
    async fn query_resources(&self, query: &str, subscriptions: &[String]) -> Result<GraphResponse> {
        let scope = subscriptions.join(",");
        let url = format!(
            "{}/providers/Microsoft.ResourceGraph/resources?api-version={RESOURCE_GRAPH_API_VERSION}",
            self.endpoint
        );
        let payload = serde_json::json!({
            "subscriptions": subscriptions,
            "query": query,
            "options": { "resultFormat": "objectArray", "$top": GRAPH_PAGE_SIZE },
        });
        let body = self
            .send(self.http.post(&url).json(&payload))
            .await
            .map_err(|message| InventoryError::Query {
                subscription_id: scope.clone(),
                message,
            })?;
        parse_graph_response(&body, &scope)
    }
}
