//! CSV report writers.
//!
//! Every writer truncates its target: the last call for a path wins.

use crate::error::Result;
use crate::models::{LookupFailure, ServerInventoryRow};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const SUBSCRIPTION_NAME_HEADER: &str = "SubscriptionName";

const INVENTORY_HEADER: [&str; 9] = [
    "SubscriptionId",
    "Name",
    "ResourceGroup",
    "Location",
    "SkuName",
    "SkuTier",
    "SkuFamily",
    "SkuCapacity",
    "QueriedAt",
];

/// Quote a field if it contains a comma, quote or line break.
pub fn escape_csv_field(input: &str) -> String {
    if input.contains([',', '"', '\n', '\r']) {
        // Excel also expects embedded quotes doubled
        let escaped = input.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        input.to_string()
    }
}

fn write_csv<I, R>(path: &Path, header: &[&str], rows: I) -> Result<usize>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", header.join(","))?;
    let mut count = 0;
    for row in rows {
        let line: Vec<String> = row.into_iter().map(|f| escape_csv_field(&f)).collect();
        writeln!(out, "{}", line.join(","))?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Overwrite `path` with a `SubscriptionName` column listing `names`.
pub fn save_subscriptions(path: &Path, names: &[String]) -> Result<()> {
    let count = write_csv(
        path,
        &[SUBSCRIPTION_NAME_HEADER],
        names.iter().map(|n| [n.clone()]),
    )?;
    log::info!("Wrote {count} subscription names to {}", path.display());
    Ok(())
}

/// Overwrite `path` with the names and error texts of failed lookups.
pub fn save_lookup_errors(path: &Path, failures: &[LookupFailure]) -> Result<()> {
    let count = write_csv(
        path,
        &[SUBSCRIPTION_NAME_HEADER, "Error"],
        failures
            .iter()
            .map(|f| [f.subscription_name.clone(), f.message.clone()]),
    )?;
    log::info!("Wrote {count} lookup errors to {}", path.display());
    Ok(())
}

/// Overwrite `path` with the server inventory, one row per server.
pub fn save_inventory(
    path: &Path,
    servers: &[ServerInventoryRow],
    queried_at: DateTime<Utc>,
) -> Result<()> {
    let stamp = queried_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let count = write_csv(
        path,
        &INVENTORY_HEADER,
        servers.iter().map(|s| {
            [
                s.subscription_id.clone(),
                s.name.clone(),
                s.resource_group.clone(),
                s.location.clone(),
                opt(&s.sku.name),
                opt(&s.sku.tier),
                opt(&s.sku.family),
                s.sku.capacity.map(|c| c.to_string()).unwrap_or_default(),
                stamp.clone(),
            ]
        }),
    )?;
    log::info!("Wrote {count} PostgreSQL servers to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sku;
    use chrono::TimeZone;

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_save_subscriptions_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_found.csv");
        save_subscriptions(&path, &["Ghost".to_string(), "Finance, Legacy".to_string()]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "SubscriptionName\nGhost\n\"Finance, Legacy\"\n");
    }

    #[test]
    fn test_save_subscriptions_empty_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.csv");
        save_subscriptions(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SubscriptionName\n");
    }

    #[test]
    fn test_second_write_replaces_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_subscriptions(&path, &["First".to_string(), "Second".to_string()]).unwrap();
        save_subscriptions(&path, &["Third".to_string()]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "SubscriptionName\nThird\n"
        );
    }

    #[test]
    fn test_save_lookup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.csv");
        let failures = vec![LookupFailure {
            subscription_name: "Flaky".to_string(),
            message: "HTTP 403 Forbidden: AuthorizationFailed".to_string(),
        }];
        save_lookup_errors(&path, &failures).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "SubscriptionName,Error\nFlaky,HTTP 403 Forbidden: AuthorizationFailed\n"
        );
    }

    #[test]
    fn test_save_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servers.csv");
        let servers = vec![ServerInventoryRow {
            subscription_id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            name: "pg-orders".to_string(),
            resource_group: "rg-db".to_string(),
            location: "australiaeast".to_string(),
            sku: Sku {
                name: Some("GP_Gen5_4".to_string()),
                tier: Some("GeneralPurpose".to_string()),
                family: None,
                capacity: Some(4),
            },
        }];
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        save_inventory(&path, &servers, at).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "SubscriptionId,Name,ResourceGroup,Location,SkuName,SkuTier,SkuFamily,SkuCapacity,QueriedAt"
        );
        assert_eq!(
            lines[1],
            "123e4567-e89b-12d3-a456-426614174000,pg-orders,rg-db,australiaeast,GP_Gen5_4,GeneralPurpose,,4,2024-05-01T12:00:00Z"
        );
    }
}
