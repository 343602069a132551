//! The inventory pipeline.
//!
//! - [`batch`] - fixed-size grouping of input records
//! - [`resolver`] - display name to subscription id classification
//! - [`inventory`] - resource graph queries per resolved subscription
//! - [`pipeline`] - batches through resolver and inventory, accumulating results

mod batch;
mod inventory;
mod pipeline;
mod resolver;

pub use batch::prepare_batches;
pub use inventory::{fetch_inventory, get_postgresql_servers, InventoryBatch, QueryFailure};
pub use pipeline::{run_inventory, InventoryReport, PipelineOptions};
pub use resolver::resolve_batch;
