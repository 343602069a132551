//! Azure access for the inventory run.
//!
//! The pipeline only depends on the two traits below:
//! - [`SubscriptionDirectory`] - display name to subscription id
//! - [`ResourceGraph`] - resource graph queries
//!
//! Two implementations exist:
//! - [`rest`] - ARM REST API with azure_identity credentials
//! - [`cli`] - the Azure CLI (`az`)

mod cli;
mod graph;
mod rest;

use crate::config::{Backend, Config};
use crate::error::Result;

pub use cli::AzCli;
pub use graph::{postgresql_server_query, GraphResponse, POSTGRESQL_SERVER_QUERY};
pub use rest::{ArmClient, TokenSource};

/// Looks up subscriptions by display name.
#[allow(async_fn_in_trait)]
pub trait SubscriptionDirectory {
    /// Id of the first subscription whose display name equals `display_name`
    /// exactly, `Ok(None)` when there is none.
    async fn find_subscription_id(&self, display_name: &str) -> Result<Option<String>>;
}

/// Runs resource graph queries.
#[allow(async_fn_in_trait)]
pub trait ResourceGraph {
    /// Run `query` scoped to `subscriptions` and return the raw response.
    async fn query_resources(&self, query: &str, subscriptions: &[String]) -> Result<GraphResponse>;
}

/// The backend selected on the command line.
#[derive(Debug, Clone)]
pub enum AzureClient {
    Rest(ArmClient),
    Cli(AzCli),
}

impl AzureClient {
    /// Build the configured backend and check that it can authenticate.
    ///
    /// # Returns
    /// * `Err(ClientInit)` - No usable credential, or `az` missing / not logged in
    pub async fn connect(config: &Config) -> Result<Self> {
        match config.backend {
            Backend::Rest => {
                let tokens = match &config.access_token {
                    Some(token) => {
                        log::info!("Using bearer token from configuration");
                        TokenSource::Static(token.clone())
                    }
                    None => TokenSource::from_environment(),
                };
                let client = ArmClient::new(&config.arm_endpoint, tokens)?;
                client.check_credentials().await?;
                log::info!("Connected to {}", config.arm_endpoint);
                Ok(AzureClient::Rest(client))
            }
            Backend::Cli => {
                let az = AzCli::default();
                az.check_login().await?;
                log::info!("Using Azure CLI backend");
                Ok(AzureClient::Cli(az))
            }
        }
    }
}

impl SubscriptionDirectory for AzureClient {
    async fn find_subscription_id(&self, display_name: &str) -> Result<Option<String>> {
        match self {
            AzureClient::Rest(c) => c.find_subscription_id(display_name).await,
            AzureClient::Cli(c) => c.find_subscription_id(display_name).await,
        }
    }
}

impl ResourceGraph for AzureClient {
    async fn query_resources(&self, query: &str, subscriptions: &[String]) -> Result<GraphResponse> {
        match self {
            AzureClient::Rest(c) => c.query_resources(query, subscriptions).await,
            AzureClient::Cli(c) => c.query_resources(query, subscriptions).await,
        }
    }
}
