//! Reading the subscription list from the input CSV.
//!
//! The reader accepts RFC 4180 style files: quoted fields with doubled
//! quotes, CRLF or LF line endings and an optional UTF-8 BOM (Excel exports).

use crate::config::SUBSCRIPTION_NAME_COLUMN;
use crate::error::{InventoryError, Result};
use crate::models::SubscriptionRecord;
use std::path::Path;

/// Read `SubscriptionName` and the resource group column from the input CSV.
///
/// # Arguments
/// * `path` - Input CSV with a header row
/// * `resource_group_column` - Header of the resource group column
///
/// # Returns
/// * `Ok(Vec<SubscriptionRecord>)` - One record per non-blank row, in file order
/// * `Err(FileNotFound)` - The file does not exist
/// * `Err(InputFormat)` - A required column is missing or a row is malformed
pub fn read_subscription_records(
    path: &Path,
    resource_group_column: &str,
) -> Result<Vec<SubscriptionRecord>> {
    if !path.exists() {
        return Err(InventoryError::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    log::info!("Reading subscriptions from {}", path.display());

    let format_error = |message: String| InventoryError::InputFormat {
        path: path.to_path_buf(),
        message,
    };

    let mut rows = parse_csv(&text).map_err(format_error)?.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| format_error("file is empty, expected a header row".to_string()))?;

    let column_index = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| format_error(format!("missing column '{name}', found {header:?}")))
    };
    let name_idx = column_index(SUBSCRIPTION_NAME_COLUMN)?;
    let rg_idx = column_index(resource_group_column)?;

    let mut records = Vec::new();
    // Header is line 1
    for (line, row) in rows.enumerate().map(|(i, r)| (i + 2, r)) {
        if row.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let field = |idx: usize| {
            row.get(idx).cloned().ok_or_else(|| {
                format_error(format!(
                    "row {line} has {} fields, expected at least {}",
                    row.len(),
                    idx + 1
                ))
            })
        };
        records.push(SubscriptionRecord {
            subscription_name: field(name_idx)?,
            resource_group: field(rg_idx)?,
        });
    }

    log::info!("Read {} subscription records", records.len());
    Ok(records)
}

/// Split CSV text into rows of fields.
fn parse_csv(text: &str) -> std::result::Result<Vec<Vec<String>>, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
