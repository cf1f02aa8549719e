//! Campaign reporting pipeline — load the interchange file, repair missing
//! conversions, derive business metrics, filter, and aggregate per channel.

pub mod clean;
pub mod dashboard;
pub mod enrich;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod render;

pub use dashboard::{aggregate, AggregateOutcome, DashboardAggregates};
pub use filter::{filter, FilterCriteria, Selection};
pub use pipeline::{load_and_process, process_file};
