//! Seed Threshold Pipeline
//!
//! Allocates a finite multi-species seed stock across state×biome regions,
//! converts each region's share into plantable hectares and reports a
//! per-region diversity threshold.
//!
//! Layout:
//! - `utils/`: Quantity type, locale number parsing, DataFrame helpers
//! - `data`: Table loading with Polars into typed records
//! - `stages/`: Density, stock, allocation and threshold stages
//! - `pipeline`: Runs the stages for one parameter set
//! - `explorer`: Cached and parallel runs over many parameter sets
//! - `report`: DataFrame conversion and CSV/Parquet/JSON export

pub mod error;
pub mod schema;
pub mod config;
pub mod utils;
pub mod data;
pub mod stages;
pub mod pipeline;
pub mod explorer;
pub mod report;

// Re-export commonly used types
pub use error::{Result, SeedError};
pub use config::{AreaVariant, DataPaths, DistributionPolicy, RunParams, SupplyType, TargetSpeciesSet};
pub use utils::Quantity;
pub use data::SeedData;
pub use pipeline::{run_pipeline, PipelineRun};
pub use explorer::ScenarioExplorer;
pub use stages::RegionSummary;
