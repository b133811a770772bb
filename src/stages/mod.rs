//! Pipeline stages
//!
//! Each stage is a pure function over immutable tables, in pipeline order:
//! sowing weight → density → stock → allocation → threshold.

pub mod sowing_weight;
pub mod density;
pub mod stock;
pub mod allocation;
pub mod threshold;

// Re-export stage functions
pub use sowing_weight::{sowing_weight, sowing_weight_of};
pub use density::{compute_densities, SpeciesDensity};
pub use stock::{combine_suppliers, CombinedStock};
pub use allocation::{
    distribute_stock, join_region_areas, merge_stock_and_density, AllocationRow, RegionArea, SpeciesSupply,
};
pub use threshold::{
    compute_thresholds, count_species, merge_region_summaries, RegionSpeciesCount, RegionSummary,
    RegionThreshold,
};
