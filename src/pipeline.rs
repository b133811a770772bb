//! Seed allocation pipeline - main coordinator
//!
//! Runs every stage in order for one set of parameters. A run reads only the
//! immutable input tables and keeps no state afterwards, so changing any
//! parameter simply means running again.

use crate::config::{AreaVariant, RunParams};
use crate::data::SeedData;
use crate::error::{Result, SeedError};
use crate::schema;
use crate::stages::*;
use serde::Serialize;
use std::time::Instant;

/// Every table produced by one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub params: RunParams,
    pub densities: Vec<SpeciesDensity>,
    pub combined_stock: Vec<CombinedStock>,
    pub allocation: Vec<AllocationRow>,
    pub summary: Vec<RegionSummary>,
}

impl PipelineRun {
    /// Regions that ended up with a threshold
    pub fn regions_with_threshold(&self) -> usize {
        self.summary
            .iter()
            .filter(|s| s.threshold_hectares.is_some())
            .count()
    }

    /// Median threshold over the regions that have one
    pub fn median_threshold(&self) -> Option<f64> {
        let mut values: Vec<f64> = self.summary.iter().filter_map(|s| s.threshold_hectares).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        })
    }
}

/// Run the full pipeline
///
/// # Errors
/// - `SeedError::InvalidParameter` when a parameter is out of its domain
/// - `SeedError::Schema` when relative-area distribution asks for potential
///   areas and the area table has no `area_potential` column
pub fn run_pipeline(data: &SeedData, params: &RunParams) -> Result<PipelineRun> {
    params.validate()?;

    let policy = params.distribution;
    if policy.use_relative_area && policy.area_variant == AreaVariant::Potential && !data.areas.has_potential {
        return Err(SeedError::Schema {
            table: schema::area::TABLE.to_string(),
            column: schema::area::AREA_POTENTIAL.to_string(),
            available: vec![schema::area::REGION_KEY.to_string(), schema::area::AREA.to_string()],
        });
    }

    let start = Instant::now();
    tracing::info!(
        "Running pipeline: {:?}, {} seeds/ha, chunk size {}, suppliers {:?}, top {}",
        params.target_species,
        params.target_density,
        params.chunk_size,
        params.suppliers,
        params.n_species
    );

    // (a) Species densities
    let densities = compute_densities(&data.species, params.target_density, params.chunk_size);

    // (b) Stock from the selected supply channels, joined onto the densities
    let combined_stock = combine_suppliers(&data.stock, &params.suppliers);
    let supply = merge_stock_and_density(&densities, &combined_stock);

    // (c) Region eligibility with areas, then allocation
    let region_areas = join_region_areas(data.regions(params.target_species), &data.areas);
    let allocation = distribute_stock(&supply, &region_areas, &policy);

    // (d) Independent summaries merged on region key
    let thresholds = compute_thresholds(&allocation, params.n_species);
    let counts = count_species(&allocation);
    let summary = merge_region_summaries(&counts, &thresholds);

    tracing::info!(
        "Pipeline finished in {:?}: {} allocation rows, {} regions ({} with a threshold)",
        start.elapsed(),
        allocation.len(),
        summary.len(),
        thresholds.len()
    );

    Ok(PipelineRun {
        params: params.clone(),
        densities,
        combined_stock,
        allocation,
        summary,
    })
}
