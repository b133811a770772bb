//! Region thresholds and species diversity
//!
//! Two independent summaries of the allocation table, merged on region key:
//!
//! 1. Threshold: per region, rank species with a valid positive hectare value
//!    from largest to smallest, keep the top `n_species` and report the
//!    smallest of them. Planting that many hectares of each of the top-N
//!    species reaches the diversity target.
//! 2. Species count: distinct eligible species per region, regardless of
//!    whether their allocation is usable.

use crate::stages::allocation::AllocationRow;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionThreshold {
    pub region_key: String,
    pub threshold_hectares: f64,
    /// min(n_species, valid species in the region)
    pub species_used_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSpeciesCount {
    pub region_key: String,
    pub species_count: usize,
}

/// Final per-region output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region_key: String,
    /// Absent when the region had no valid positive allocation
    pub threshold_hectares: Option<f64>,
    pub species_used_count: Option<usize>,
    pub species_count: usize,
}

/// Top-N weakest-link threshold per region
///
/// Rows with invalid or non-positive hectares are discarded first; regions
/// left with nothing are absent. Output is sorted by region key.
pub fn compute_thresholds(rows: &[AllocationRow], n_species: usize) -> Vec<RegionThreshold> {
    let mut by_region: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
    for row in rows {
        if let Some(ha) = row.plantable_hectares.positive() {
            by_region.entry(row.region_key.as_str()).or_default().push(ha);
        }
    }

    let mut thresholds: Vec<RegionThreshold> = by_region
        .into_iter()
        .filter_map(|(region_key, mut hectares)| {
            hectares.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
            hectares.truncate(n_species);
            let threshold = hectares.last().copied()?;

            Some(RegionThreshold {
                region_key: region_key.to_string(),
                threshold_hectares: threshold,
                species_used_count: hectares.len(),
            })
        })
        .collect();

    thresholds.sort_by(|a, b| a.region_key.cmp(&b.region_key));
    thresholds
}

/// Distinct species per region over the unfiltered allocation table
///
/// Rows without a species id count towards no species but still make the
/// region appear. Output is sorted by region key.
pub fn count_species(rows: &[AllocationRow]) -> Vec<RegionSpeciesCount> {
    let mut by_region: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
    for row in rows {
        let species = by_region.entry(row.region_key.as_str()).or_default();
        if let Some(id) = row.species_id.as_deref() {
            species.insert(id);
        }
    }

    let mut counts: Vec<RegionSpeciesCount> = by_region
        .into_iter()
        .map(|(region_key, species)| RegionSpeciesCount {
            region_key: region_key.to_string(),
            species_count: species.len(),
        })
        .collect();

    counts.sort_by(|a, b| a.region_key.cmp(&b.region_key));
    counts
}

/// Attach thresholds to species counts
///
/// Every region with a species count appears once; threshold fields are
/// `None` where the threshold summary has no entry.
pub fn merge_region_summaries(
    counts: &[RegionSpeciesCount],
    thresholds: &[RegionThreshold],
) -> Vec<RegionSummary> {
    let threshold_index: FxHashMap<&str, &RegionThreshold> = thresholds
        .iter()
        .map(|t| (t.region_key.as_str(), t))
        .collect();

    counts
        .iter()
        .map(|c| {
            let threshold = threshold_index.get(c.region_key.as_str());
            RegionSummary {
                region_key: c.region_key.clone(),
                threshold_hectares: threshold.map(|t| t.threshold_hectares),
                species_used_count: threshold.map(|t| t.species_used_count),
                species_count: c.species_count,
            }
        })
        .collect()
}
