//! Error type shared by every stage of the inventory run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading input, talking to Azure or writing reports.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Input CSV does not exist.
    #[error("File {} not found.", .0.display())]
    FileNotFound(PathBuf),

    /// Input CSV exists but cannot be interpreted.
    #[error("Input format error in {}: {message}", path.display())]
    InputFormat { path: PathBuf, message: String },

    /// Credential discovery or client construction failed.
    #[error("Error initializing Azure clients: {0}")]
    ClientInit(String),

    /// The subscription directory call itself failed (transport, auth, parse).
    #[error("Error getting subscription ID for {name}: {message}")]
    Lookup { name: String, message: String },

    /// A resource graph query failed.
    #[error("Resource graph query failed for subscription {subscription_id}: {message}")]
    Query {
        subscription_id: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
