//! Seeded synthetic campaign dataset — reproducible, intentionally imperfect
//! rows for exercising the reporting pipeline.

pub mod generator;
pub mod profile;

pub use generator::{DatasetGenerator, GeneratorSummary};
pub use profile::ChannelProfile;
