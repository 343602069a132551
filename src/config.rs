//! Command line arguments and the validated run configuration.
//!
//! Arguments are parsed with clap; every flag also reads an environment
//! variable so the tool can be driven from a `.env` file (loaded in `main`).

use crate::error::{InventoryError, Result};
use clap::builder::TypedValueParser;
use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_INPUT_FILE: &str = "subscriptions.csv";
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_NOT_FOUND_FILE: &str = "not_found_subscriptions.csv";
pub const DEFAULT_INVALID_FILE: &str = "invalid_subscriptions.csv";
pub const DEFAULT_LOOKUP_ERROR_FILE: &str = "lookup_error_subscriptions.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "postgresql_servers.csv";
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

/// Input column holding the subscription display name.
pub const SUBSCRIPTION_NAME_COLUMN: &str = "SubscriptionName";
/// Default input column holding the resource group.
pub const DEFAULT_RESOURCE_GROUP_COLUMN: &str = "ResourceGroup";

/// What to do with a record whose directory lookup call failed.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LookupErrorPolicy {
    /// Write the name to the lookup-error file and keep going.
    #[default]
    Report,
    /// Count the name as not found (legacy behaviour).
    NotFound,
    /// Stop the run on the first failed lookup.
    Abort,
}

/// Which Azure access path to use.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// ARM REST API with azure_identity credentials.
    #[default]
    Rest,
    /// The `az` command line tool.
    Cli,
}

/// Inventory PostgreSQL single servers for a list of subscriptions.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input CSV file
    #[arg(long, env = "PGINV_INPUT", default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    /// Batch size
    #[arg(
        long = "batch_size",
        env = "PGINV_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize)
    )]
    pub batch_size: usize,

    /// Output file for not found subscriptions
    #[arg(long = "not_found_file", env = "PGINV_NOT_FOUND_FILE", default_value = DEFAULT_NOT_FOUND_FILE)]
    pub not_found_file: PathBuf,

    /// Output file for invalid subscriptions
    #[arg(long = "invalid_file", env = "PGINV_INVALID_FILE", default_value = DEFAULT_INVALID_FILE)]
    pub invalid_file: PathBuf,

    /// Output file for subscriptions whose lookup call failed
    #[arg(long = "lookup_error_file", env = "PGINV_LOOKUP_ERROR_FILE", default_value = DEFAULT_LOOKUP_ERROR_FILE)]
    pub lookup_error_file: PathBuf,

    /// Output CSV for the PostgreSQL server inventory
    #[arg(long, env = "PGINV_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Input column holding the resource group (e.g. ResourceGroupName)
    #[arg(long = "resource_group_column", env = "PGINV_RESOURCE_GROUP_COLUMN", default_value = DEFAULT_RESOURCE_GROUP_COLUMN)]
    pub resource_group_column: String,

    /// Handling of records whose lookup call failed
    #[arg(long = "lookup_error_policy", env = "PGINV_LOOKUP_ERROR_POLICY", value_enum, default_value_t = LookupErrorPolicy::Report)]
    pub lookup_error_policy: LookupErrorPolicy,

    /// Maximum in-flight inventory queries per batch
    #[arg(
        long,
        env = "PGINV_CONCURRENCY",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize)
    )]
    pub concurrency: usize,

    /// Azure access path
    #[arg(long, env = "PGINV_BACKEND", value_enum, default_value_t = Backend::Rest)]
    pub backend: Backend,

    /// Azure Resource Manager endpoint
    #[arg(long = "arm_endpoint", env = "ARM_ENDPOINT", default_value = DEFAULT_ARM_ENDPOINT)]
    pub arm_endpoint: String,

    /// Bearer token to use instead of credential discovery
    #[arg(long = "access_token", env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// log4rs configuration file
    #[arg(long = "log_config", env = "PGINV_LOG_CONFIG", default_value = "log4rs.yml")]
    pub log_config: PathBuf,

    /// Log level used when the log4rs configuration file is absent
    #[arg(long = "log_level", env = "PGINV_LOG_LEVEL", default_value = "info", value_parser = parse_level_filter)]
    pub log_level: log::LevelFilter,
}

fn parse_level_filter(value: &str) -> std::result::Result<log::LevelFilter, String> {
    value.parse().map_err(|_| {
        format!("unknown log level '{value}', expected off, error, warn, info, debug or trace")
    })
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub batch_size: NonZeroUsize,
    pub not_found_file: PathBuf,
    pub invalid_file: PathBuf,
    pub lookup_error_file: PathBuf,
    pub output: PathBuf,
    pub resource_group_column: String,
    pub lookup_error_policy: LookupErrorPolicy,
    pub concurrency: NonZeroUsize,
    pub backend: Backend,
    pub arm_endpoint: String,
    pub access_token: Option<String>,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let batch_size = NonZeroUsize::new(args.batch_size)
            .ok_or_else(|| InventoryError::Config("batch_size must be at least 1".into()))?;
        let concurrency = NonZeroUsize::new(args.concurrency)
            .ok_or_else(|| InventoryError::Config("concurrency must be at least 1".into()))?;

        let resource_group_column = args.resource_group_column.trim().to_string();
        if resource_group_column.is_empty() {
            return Err(InventoryError::Config(
                "resource_group_column must not be empty".into(),
            ));
        }

        let arm_endpoint = args.arm_endpoint.trim_end_matches('/').to_string();
        if !arm_endpoint.starts_with("http://") && !arm_endpoint.starts_with("https://") {
            return Err(InventoryError::Config(format!(
                "arm_endpoint must be an http(s) URL, got '{}'",
                args.arm_endpoint
            )));
        }

        Ok(Config {
            input: args.input.clone(),
            batch_size,
            not_found_file: args.not_found_file.clone(),
            invalid_file: args.invalid_file.clone(),
            lookup_error_file: args.lookup_error_file.clone(),
            output: args.output.clone(),
            resource_group_column,
            lookup_error_policy: args.lookup_error_policy,
            concurrency,
            backend: args.backend,
            arm_endpoint,
            access_token: args.access_token.clone().filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> std::result::Result<Args, clap::Error> {
        let mut argv = vec!["pg-single-server-inventory"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_defaults_match_legacy_flags() {
        let args = parse(&[]).expect("defaults should parse");
        let config = Config::from_args(&args).expect("defaults should validate");
        assert_eq!(config.input, PathBuf::from("subscriptions.csv"));
        assert_eq!(config.batch_size.get(), 500);
        assert_eq!(config.not_found_file, PathBuf::from("not_found_subscriptions.csv"));
        assert_eq!(config.invalid_file, PathBuf::from("invalid_subscriptions.csv"));
        assert_eq!(config.resource_group_column, "ResourceGroup");
        assert_eq!(config.lookup_error_policy, LookupErrorPolicy::Report);
        assert_eq!(config.concurrency.get(), 1);
    }

    #[test]
    fn test_batch_size_zero_rejected_at_parse() {
        assert!(parse(&["--batch_size", "0"]).is_err());
    }

    #[test]
    fn test_underscore_flags() {
        let args = parse(&[
            "--input",
            "in.csv",
            "--batch_size",
            "2",
            "--not_found_file",
            "nf.csv",
            "--invalid_file",
            "inv.csv",
            "--resource_group_column",
            "ResourceGroupName",
            "--lookup_error_policy",
            "not-found",
            "--backend",
            "cli",
        ])
        .expect("flags should parse");
        let config = Config::from_args(&args).expect("flags should validate");
        assert_eq!(config.batch_size.get(), 2);
        assert_eq!(config.resource_group_column, "ResourceGroupName");
        assert_eq!(config.lookup_error_policy, LookupErrorPolicy::NotFound);
        assert_eq!(config.backend, Backend::Cli);
    }

    #[test]
    fn test_log_level_parsed() {
        let args = parse(&["--log_level", "DEBUG"]).expect("level should parse");
        assert_eq!(args.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let err = parse(&["--log_level", "verbose"]).unwrap_err();
        assert!(err.to_string().contains("unknown log level 'verbose'"), "{err}");
    }

    #[test]
    fn test_arm_endpoint_trailing_slash_trimmed() {
        let args = parse(&["--arm_endpoint", "http://localhost:8080/"]).unwrap();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.arm_endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_arm_endpoint_must_be_url() {
        let args = parse(&["--arm_endpoint", "management.azure.com"]).unwrap();
        assert!(matches!(
            Config::from_args(&args),
            Err(InventoryError::Config(_))
        ));
    }
}
