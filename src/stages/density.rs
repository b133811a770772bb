//! Sowing density per species
//!
//! Converts a target seed density (seeds/ha) into the seed mass each species
//! needs per hectare. The target is shared out within chunks of consecutive
//! species rows in proportion to their sowing weights:
//!
//! ```text
//! chunk_index    = ordinal / chunk_size
//! sum_of_weights = Σ weight over the chunk
//! seeds_per_ha   = target_density / sum_of_weights × weight / germination_rate_pct
//! kg_per_ha      = seeds_per_ha / seeds_per_kg
//! ```
//!
//! Zero or missing inputs make the affected values invalid without stopping
//! the computation for the other species.

use crate::data::SpeciesRecord;
use crate::stages::sowing_weight::sowing_weight_of;
use crate::utils::Quantity;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Density result for one species row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesDensity {
    pub species_id: Option<String>,
    pub ordinal: usize,
    pub seeds_per_kg: Quantity,
    pub germination_rate_pct: Quantity,
    pub chunk_index: usize,
    pub weight: Quantity,
    /// Shared by every row of the chunk
    pub sum_of_weights: Quantity,
    pub seeds_per_ha: Quantity,
    pub kg_per_ha: Quantity,
}

/// Compute required kg/ha for every species row
///
/// Chunks come from each record's `ordinal`, not from its position in the
/// slice. Invalid weights are left out of the chunk sum. A `chunk_size` of 0
/// is treated as 1.
pub fn compute_densities(
    species: &[SpeciesRecord],
    target_density: f64,
    chunk_size: usize,
) -> Vec<SpeciesDensity> {
    let chunk_size = chunk_size.max(1);

    let weights: Vec<(usize, Quantity)> = species
        .iter()
        .map(|s| (s.ordinal / chunk_size, sowing_weight_of(s.seeds_per_kg)))
        .collect();

    let mut chunk_sums: FxHashMap<usize, Quantity> = FxHashMap::default();
    for (chunk, weight) in &weights {
        let sum = chunk_sums.entry(*chunk).or_insert(Quantity::ZERO);
        if weight.is_valid() {
            *sum = *sum + *weight;
        }
    }

    tracing::debug!(
        "Density: {} species in {} chunks (chunk size {})",
        species.len(),
        chunk_sums.len(),
        chunk_size
    );

    let target = Quantity::new(target_density);

    species
        .iter()
        .zip(weights)
        .map(|(record, (chunk_index, weight))| {
            let sum_of_weights = chunk_sums.get(&chunk_index).copied().unwrap_or(Quantity::ZERO);
            let seeds_per_ha = target / sum_of_weights * weight / record.germination_rate_pct;
            let kg_per_ha = seeds_per_ha / record.seeds_per_kg;

            SpeciesDensity {
                species_id: record.species_id.clone(),
                ordinal: record.ordinal,
                seeds_per_kg: record.seeds_per_kg,
                germination_rate_pct: record.germination_rate_pct,
                chunk_index,
                weight,
                sum_of_weights,
                seeds_per_ha,
                kg_per_ha,
            }
        })
        .collect()
}
