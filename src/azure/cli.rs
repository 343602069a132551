//! Azure CLI backend.
//!
//! Runs `az` as a child process and parses its JSON output. The CLI handles
//! login and token refresh itself.

use super::graph::{parse_graph_response, GraphResponse};
use super::{ResourceGraph, SubscriptionDirectory};
use crate::error::{InventoryError, Result};
use colored::Colorize;
use tokio::process::Command;

/// Upper bound for captured stdout.
const MAX_STDOUT_BYTES: usize = 5_000_000;

/// Largest page `az graph query` accepts.
const GRAPH_PAGE_SIZE: &str = "1000";

/// Run a program with arguments and return its stdout.
///
/// Arguments are passed as-is (no shell splitting), so display names and
/// queries containing quotes or spaces reach `az` unchanged. The child is
/// awaited, so several commands can be in flight on one task.
///
/// # Returns
/// * `Ok(String)` - The stdout output on success
/// * `Err(String)` - stderr or the spawn error when the command fails
pub async fn run(program: &str, args: &[&str]) -> std::result::Result<String, String> {
    let cmd = format!("{program} {}", args.join(" "));
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let output = Command::new(program).args(args).output().await.map_err(|e| {
        log::error!("Command execution failed: {}", e);
        format!("Failed to execute {program}: {e}")
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(format!("ERROR running {program}: {}", stderr.trim()));
    }

    log::debug!("Success output.stdout.len(): {}", output.stdout.len());
    if output.stdout.len() > MAX_STDOUT_BYTES {
        return Err(format!(
            "Response too large: {} bytes for command: {cmd}",
            output.stdout.len()
        ));
    }

    String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {}", e))
}

/// Quote a value as a JMESPath raw string literal.
fn jmespath_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Parse the output of `az account list --query "[?...].id"`.
fn parse_account_ids(stdout: &str) -> std::result::Result<Vec<String>, String> {
    let mut deserializer = serde_json::Deserializer::from_str(stdout);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| format!("Error parsing az account list output: path={} error={}", e.path(), e))
}

/// Subscription directory and resource graph access through `az`.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl Default for AzCli {
    fn default() -> Self {
        AzCli {
            program: "az".to_string(),
        }
    }
}

impl AzCli {
    /// Use a different executable, e.g. a wrapper script.
    pub fn with_program(program: impl Into<String>) -> Self {
        AzCli {
            program: program.into(),
        }
    }

    /// Verify the CLI is installed and logged in.
    pub async fn check_login(&self) -> Result<()> {
        run(&self.program, &["account", "show", "--output", "json"])
            .await
            .map(|_| ())
            .map_err(InventoryError::ClientInit)
    }
}

impl SubscriptionDirectory for AzCli {
    async fn find_subscription_id(&self, display_name: &str) -> Result<Option<String>> {
        let query = format!("[?name=={}].id", jmespath_literal(display_name));
        let lookup_error = |message: String| InventoryError::Lookup {
            name: display_name.to_string(),
            message,
        };
        let stdout = run(
            &self.program,
            &["account", "list", "--all", "--query", &query, "--output", "json"],
        )
        .await
        .map_err(lookup_error)?;
        let ids = parse_account_ids(&stdout).map_err(lookup_error)?;
        Ok(ids.into_iter().next())
    }
}

impl ResourceGraph for AzCli {
    async fn query_resources(&self, query: &str, subscriptions: &[String]) -> Result<GraphResponse> {
        let scope = subscriptions.join(",");
        let mut args = vec!["graph", "query", "-q", query, "--first", GRAPH_PAGE_SIZE];
        for subscription in subscriptions {
            args.extend(["--subscriptions", subscription.as_str()]);
        }
        args.extend(["--output", "json"]);

        let stdout = run(&self.program, &args)
            .await
            .map_err(|message| InventoryError::Query {
                subscription_id: scope.clone(),
                message,
            })?;
        parse_graph_response(&stdout, &scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success() {
        let out = run("echo", &["hello", "it's me"]).await.expect("echo should run");
        assert_eq!(out, "hello it's me\n");
    }

    #[tokio::test]
    async fn test_run_failure() {
        assert!(run("false", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let err = run("definitely-not-a-real-az-binary", &["--version"])
            .await
            .unwrap_err();
        assert!(err.contains("Failed to execute"), "{err}");
    }

    #[test]
    fn test_jmespath_literal() {
        assert_eq!(jmespath_literal("Prod Platform"), "'Prod Platform'");
        assert_eq!(jmespath_literal("Bob's sub"), r"'Bob\'s sub'");
    }

    #[test]
    fn test_parse_account_ids() {
        let ids = parse_account_ids(r#"["123e4567-e89b-12d3-a456-426614174000"]"#).unwrap();
        assert_eq!(ids, vec!["123e4567-e89b-12d3-a456-426614174000"]);
        assert!(parse_account_ids("[]").unwrap().is_empty());
        assert!(parse_account_ids("not json").is_err());
    }

    #[tokio::test]
    async fn test_directory_lookup_error_names_subscription() {
        let az = AzCli::with_program("false");
        let err = az.find_subscription_id("Prod").await.unwrap_err();
        assert!(
            matches!(err, InventoryError::Lookup { ref name, .. } if name == "Prod"),
            "{err:?}"
        );
    }

    /// Fake `az` that answers every call with one server after a delay.
    #[cfg(unix)]
    fn slow_az(dir: &std::path::Path, delay_secs: f32) -> String {
        use std::os::unix::fs::PermissionsExt;
        let script = dir.join("az");
        let body = format!(
            "#!/bin/sh\nsleep {delay_secs}\necho '{{\"count\": 1, \"data\": [{{\"subscriptionId\": \"s\", \"name\": \"pg\", \"resourceGroup\": \"rg\", \"location\": \"eastus\", \"sku\": null}}]}}'\n"
        );
        std::fs::write(&script, body).expect("write fake az");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake az");
        script.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_queries_run_concurrently() {
        use crate::models::ResolvedSubscription;
        use crate::processing::fetch_inventory;
        use std::num::NonZeroUsize;
        use std::time::{Duration, Instant};

        let dir = tempfile::tempdir().unwrap();
        let az = AzCli::with_program(slow_az(dir.path(), 1.0));
        let pairs: Vec<ResolvedSubscription> = (0..3)
            .map(|i| ResolvedSubscription {
                subscription_id: format!("sub-{i}"),
                resource_group: String::new(),
            })
            .collect();

        let started = Instant::now();
        let batch = fetch_inventory(&az, &pairs, NonZeroUsize::new(3).unwrap()).await;
        let elapsed = started.elapsed();

        assert!(batch.failures.is_empty(), "{:?}", batch.failures);
        assert_eq!(batch.servers.len(), 3);
        assert!(
            elapsed < Duration::from_secs(2),
            "3 queries at concurrency 3 took {elapsed:?}"
        );
    }
}
