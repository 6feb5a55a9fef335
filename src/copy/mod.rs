pub mod orchestrator;
pub mod schema;
pub mod segment;

pub use orchestrator::{run, CopySummary, RunReport};
pub use schema::{derive_definition, CapacityOverrides, Replication, TableDefinition};
pub use segment::copy_segment;
