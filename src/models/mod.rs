//! Domain models for the PostgreSQL inventory run.
//!
//! - [`SubscriptionRecord`] and [`ResolvedSubscription`] - input rows and their resolved form
//! - [`Resolution`] and [`BatchResolution`] - per-record lookup outcome and batch partition
//! - [`ServerInventoryRow`] - rows returned by the resource graph
//! - [`is_valid_guid`] - subscription id format check

mod guid;
mod resolution;
mod server;
mod subscription;

pub use guid::is_valid_guid;
pub use resolution::{BatchResolution, LookupFailure, Resolution};
pub use server::{ServerInventoryRow, Sku};
pub use subscription::{ResolvedSubscription, SubscriptionRecord};
