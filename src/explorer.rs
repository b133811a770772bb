//! Scenario Explorer - cached and parallel pipeline runs
//!
//! Interactive callers re-run the pipeline on every parameter change. The
//! explorer keeps the loaded tables in memory and caches finished runs in a
//! Moka cache keyed by every parameter that changes the output.
//!
//! Sweeps over many parameter sets run on the Rayon pool: runs only share the
//! immutable input tables.

use crate::config::{AreaVariant, RunParams, SupplyType, TargetSpeciesSet};
use crate::data::SeedData;
use crate::error::Result;
use crate::pipeline::{run_pipeline, PipelineRun};
use moka::sync::Cache;
use rayon::prelude::*;
use std::sync::Arc;

pub const DEFAULT_CACHE_CAPACITY: u64 = 64;

/// Cache key covering every output-affecting parameter
///
/// Floats are keyed by bit pattern; the supplier selection is sorted and
/// deduplicated since it acts as a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamsKey {
    target_species: TargetSpeciesSet,
    target_density_bits: u64,
    chunk_size: usize,
    suppliers: Vec<SupplyType>,
    use_species_count: bool,
    use_relative_area: bool,
    area_variant: AreaVariant,
    n_species: usize,
}

impl From<&RunParams> for ParamsKey {
    fn from(params: &RunParams) -> Self {
        let mut suppliers = params.suppliers.clone();
        suppliers.sort();
        suppliers.dedup();

        ParamsKey {
            target_species: params.target_species,
            target_density_bits: params.target_density.to_bits(),
            chunk_size: params.chunk_size,
            suppliers,
            use_species_count: params.distribution.use_species_count,
            use_relative_area: params.distribution.use_relative_area,
            area_variant: params.distribution.area_variant,
            n_species: params.n_species,
        }
    }
}

pub struct ScenarioExplorer {
    data: Arc<SeedData>,
    cache: Cache<ParamsKey, Arc<PipelineRun>>,
}

impl ScenarioExplorer {
    pub fn new(data: SeedData) -> Self {
        Self::with_capacity(data, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(data: SeedData, capacity: u64) -> Self {
        Self {
            data: Arc::new(data),
            cache: Cache::new(capacity),
        }
    }

    pub fn data(&self) -> &SeedData {
        &self.data
    }

    /// Run (or fetch) the pipeline for one parameter set
    ///
    /// Failed runs are not cached.
    pub fn run(&self, params: &RunParams) -> Result<Arc<PipelineRun>> {
        let key = ParamsKey::from(params);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {:?}", key);
            return Ok(hit);
        }

        let run = Arc::new(run_pipeline(&self.data, params)?);
        self.cache.insert(key, Arc::clone(&run));
        Ok(run)
    }

    /// Run many parameter sets in parallel, results in input order
    pub fn sweep(&self, scenarios: &[RunParams]) -> Vec<Result<Arc<PipelineRun>>> {
        tracing::info!("Sweeping {} scenarios", scenarios.len());
        scenarios.par_iter().map(|params| self.run(params)).collect()
    }

    pub fn cached_runs(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

/// Every combination of the two distribution flags and both area variants
/// on top of `base`. Area variants are only varied when area weighting is on.
pub fn distribution_scenarios(base: &RunParams) -> Vec<RunParams> {
    let mut scenarios = Vec::new();
    for use_species_count in [false, true] {
        for use_relative_area in [false, true] {
            let variants: &[AreaVariant] = if use_relative_area {
                &[AreaVariant::Total, AreaVariant::Potential]
            } else {
                &[AreaVariant::Total]
            };
            for &area_variant in variants {
                let mut params = base.clone();
                params.distribution.use_species_count = use_species_count;
                params.distribution.use_relative_area = use_relative_area;
                params.distribution.area_variant = area_variant;
                scenarios.push(params);
            }
        }
    }
    scenarios
}
