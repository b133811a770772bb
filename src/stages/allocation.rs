//! Stock allocation across regions
//!
//! Each species' combined stock is handed out to the regions that list it as
//! eligible, then converted to plantable hectares with the species' kg/ha.
//! Allocation never moves stock between species.
//!
//! Policies (independent, may be combined):
//! - `use_species_count`: divide by the number of rows listing the species
//! - `use_relative_area`: multiply by `row_area / area_sum`, where `area_sum`
//!   is the species' total area over every row listing it
//!
//! With both off, every eligible region receives the whole stock.

use crate::config::{AreaVariant, DistributionPolicy};
use crate::data::{AreaTable, RegionRecord};
use crate::stages::density::SpeciesDensity;
use crate::stages::stock::CombinedStock;
use crate::utils::Quantity;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Region eligibility row with its area attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionArea {
    pub region_key: String,
    pub state: Option<String>,
    pub biome: Option<String>,
    pub species_id: Option<String>,
    pub area_total: Quantity,
    pub area_potential: Quantity,
}

impl RegionArea {
    pub fn area(&self, variant: AreaVariant) -> Quantity {
        match variant {
            AreaVariant::Total => self.area_total,
            AreaVariant::Potential => self.area_potential,
        }
    }
}

/// Per-species density with its combined stock attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesSupply {
    pub species_id: Option<String>,
    pub kg_per_ha: Quantity,
    /// Invalid when the species has no stock in the selected channels
    pub combined_stock: Quantity,
}

/// One (region, species) allocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    pub region_key: String,
    pub state: Option<String>,
    pub biome: Option<String>,
    pub species_id: Option<String>,
    /// Area of the selected variant for this row
    pub area: Quantity,
    pub kg_per_ha: Quantity,
    /// Zero-filled combined stock of the species
    pub combined_stock: Quantity,
    /// Rows listing this species across the whole region table
    pub occurrence_count: usize,
    /// Selected-variant area summed over those rows (invalid areas skipped)
    pub area_sum: Quantity,
    pub allocated_stock: Quantity,
    pub plantable_hectares: Quantity,
}

fn index_by_key<'a, T>(rows: &'a [T], key: impl Fn(&'a T) -> Option<&'a str>) -> FxHashMap<&'a str, Vec<usize>> {
    let mut index: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (i, row) in rows.iter().enumerate() {
        if let Some(k) = key(row) {
            index.entry(k).or_default().push(i);
        }
    }
    index
}

/// Left join of region rows onto area rows by region key
///
/// Regions without area data keep invalid areas; a key with several area rows
/// yields one output row per match.
pub fn join_region_areas(regions: &[RegionRecord], areas: &AreaTable) -> Vec<RegionArea> {
    let area_index = index_by_key(&areas.records, |a| Some(a.region_key.as_str()));

    let mut joined = Vec::with_capacity(regions.len());
    for region in regions {
        let build = |area_total: Quantity, area_potential: Quantity| RegionArea {
            region_key: region.region_key.clone(),
            state: region.state.clone(),
            biome: region.biome.clone(),
            species_id: region.species_id.clone(),
            area_total,
            area_potential,
        };

        match area_index.get(region.region_key.as_str()) {
            Some(matches) => {
                for &i in matches {
                    let area = &areas.records[i];
                    joined.push(build(area.area_total, area.area_potential));
                }
            }
            None => joined.push(build(Quantity::INVALID, Quantity::INVALID)),
        }
    }
    joined
}

/// Left join of combined stock onto the density table by species id
///
/// Stock for species absent from the density table is dropped.
pub fn merge_stock_and_density(densities: &[SpeciesDensity], combined: &[CombinedStock]) -> Vec<SpeciesSupply> {
    let stock: FxHashMap<&str, Quantity> = combined
        .iter()
        .map(|c| (c.species_id.as_str(), c.combined_stock))
        .collect();

    densities
        .iter()
        .map(|d| SpeciesSupply {
            species_id: d.species_id.clone(),
            kg_per_ha: d.kg_per_ha,
            combined_stock: d
                .species_id
                .as_deref()
                .and_then(|id| stock.get(id).copied())
                .unwrap_or(Quantity::INVALID),
        })
        .collect()
}

/// Allocate stock to every eligible (region, species) row
///
/// Rows keep the order of `region_areas`. A species listed by a region but
/// missing from `supply` still gets a row, with zero stock and invalid kg/ha.
pub fn distribute_stock(
    supply: &[SpeciesSupply],
    region_areas: &[RegionArea],
    policy: &DistributionPolicy,
) -> Vec<AllocationRow> {
    let supply_index = index_by_key(supply, |s| s.species_id.as_deref());

    // STEP 1: region × species join
    let mut joined: Vec<(&RegionArea, Quantity, Quantity)> = Vec::with_capacity(region_areas.len());
    for region in region_areas {
        let matches = region
            .species_id
            .as_deref()
            .and_then(|id| supply_index.get(id));

        match matches {
            Some(indices) => {
                for &i in indices {
                    joined.push((region, supply[i].kg_per_ha, supply[i].combined_stock));
                }
            }
            None => joined.push((region, Quantity::INVALID, Quantity::INVALID)),
        }
    }

    // STEP 2: per-species occurrence count and area sum over all joined rows
    let mut species_totals: FxHashMap<&str, (usize, Quantity)> = FxHashMap::default();
    for (region, _, _) in &joined {
        if let Some(id) = region.species_id.as_deref() {
            let entry = species_totals.entry(id).or_insert((0, Quantity::ZERO));
            entry.0 += 1;
            entry.1 = Quantity::sum_valid([entry.1, region.area(policy.area_variant)]);
        }
    }

    // STEP 3: allocate and convert to hectares
    let rows: Vec<AllocationRow> = joined
        .into_iter()
        .map(|(region, kg_per_ha, stock)| {
            let (occurrence_count, area_sum) = region
                .species_id
                .as_deref()
                .and_then(|id| species_totals.get(id).copied())
                .unwrap_or((0, Quantity::INVALID));

            let area = region.area(policy.area_variant);
            let combined_stock = stock.or(0.0);

            let mut allocated_stock = combined_stock;
            if policy.use_species_count {
                allocated_stock = allocated_stock / occurrence_count as f64;
            }
            if policy.use_relative_area {
                allocated_stock = allocated_stock * (area / area_sum);
            }

            AllocationRow {
                region_key: region.region_key.clone(),
                state: region.state.clone(),
                biome: region.biome.clone(),
                species_id: region.species_id.clone(),
                area,
                kg_per_ha,
                combined_stock,
                occurrence_count,
                area_sum,
                allocated_stock,
                plantable_hectares: allocated_stock / kg_per_ha,
            }
        })
        .collect();

    tracing::debug!(
        "Allocation: {} rows for {} species (species_count={}, relative_area={}, area={:?})",
        rows.len(),
        species_totals.len(),
        policy.use_species_count,
        policy.use_relative_area,
        policy.area_variant
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AreaRecord;
    use approx::assert_relative_eq;

    fn region(key: &str, species: &str, total: f64, potential: f64) -> RegionArea {
        RegionArea {
            region_key: key.to_string(),
            state: Some(key[..2].to_string()),
            biome: Some("Cerrado".to_string()),
            species_id: Some(species.to_string()),
            area_total: Quantity::new(total),
            area_potential: Quantity::new(potential),
        }
    }

    fn supply(id: &str, kg_per_ha: f64, stock: f64) -> SpeciesSupply {
        SpeciesSupply {
            species_id: Some(id.to_string()),
            kg_per_ha: Quantity::new(kg_per_ha),
            combined_stock: Quantity::new(stock),
        }
    }

    fn sample_regions() -> Vec<RegionArea> {
        vec![
            region("GO_CE", "A", 100.0, 10.0),
            region("MG_CE", "A", 300.0, 30.0),
            region("MG_CE", "B", 300.0, 30.0),
            region("BA_CE", "A", 600.0, 60.0),
        ]
    }

    fn policy(use_species_count: bool, use_relative_area: bool, area_variant: AreaVariant) -> DistributionPolicy {
        DistributionPolicy { use_species_count, use_relative_area, area_variant }
    }

    #[test]
    fn test_no_flags_duplicates_stock() {
        let supply = vec![supply("A", 2.0, 1000.0), supply("B", 0.5, 10.0)];
        let rows = distribute_stock(&supply, &sample_regions(), &DistributionPolicy::default());

        assert_eq!(rows.len(), 4);
        for row in rows.iter().filter(|r| r.species_id.as_deref() == Some("A")) {
            assert_relative_eq!(row.allocated_stock.value().unwrap(), 1000.0);
            assert_relative_eq!(row.plantable_hectares.value().unwrap(), 500.0);
            assert_eq!(row.occurrence_count, 3);
        }
        assert_relative_eq!(rows[2].plantable_hectares.value().unwrap(), 20.0);
    }

    #[test]
    fn test_species_count_divides() {
        let supply = vec![supply("A", 2.0, 900.0)];
        let rows = distribute_stock(&supply, &sample_regions(), &policy(true, false, AreaVariant::Total));
        assert_relative_eq!(rows[0].allocated_stock.value().unwrap(), 300.0);
        assert_relative_eq!(rows[3].plantable_hectares.value().unwrap(), 150.0);
    }

    #[test]
    fn test_relative_area_conserves_stock() {
        let supply = vec![supply("A", 2.0, 1000.0)];
        for variant in [AreaVariant::Total, AreaVariant::Potential] {
            let rows = distribute_stock(&supply, &sample_regions(), &policy(false, true, variant));
            let a_rows: Vec<&AllocationRow> =
                rows.iter().filter(|r| r.species_id.as_deref() == Some("A")).collect();

            let total: f64 = a_rows.iter().map(|r| r.allocated_stock.value().unwrap()).sum();
            assert_relative_eq!(total, 1000.0, epsilon = 1e-9);
            assert_relative_eq!(a_rows[0].allocated_stock.value().unwrap(), 100.0, epsilon = 1e-9);
            assert_relative_eq!(a_rows[2].allocated_stock.value().unwrap(), 600.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_both_flags_compose() {
        let supply = vec![supply("A", 1.0, 1000.0)];
        let rows = distribute_stock(&supply, &sample_regions(), &policy(true, true, AreaVariant::Total));
        // 1000 / 3 × 300 / 1000
        assert_relative_eq!(rows[1].allocated_stock.value().unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_stock_is_zero_filled() {
        let mut no_stock = supply("A", 2.0, 0.0);
        no_stock.combined_stock = Quantity::INVALID;
        let rows = distribute_stock(&[no_stock], &sample_regions(), &DistributionPolicy::default());
        assert_eq!(rows[0].combined_stock, Quantity::ZERO);
        assert_eq!(rows[0].plantable_hectares, Quantity::ZERO);
    }

    #[test]
    fn test_species_without_density_keeps_row() {
        let rows = distribute_stock(&[supply("A", 2.0, 10.0)], &sample_regions(), &DistributionPolicy::default());
        let b = &rows[2];
        assert_eq!(b.species_id.as_deref(), Some("B"));
        assert_eq!(b.combined_stock, Quantity::ZERO);
        assert!(!b.kg_per_ha.is_valid());
        assert!(!b.plantable_hectares.is_valid());
    }

    #[test]
    fn test_missing_area_counts_but_is_invalid() {
        let mut regions = sample_regions();
        regions[0].area_total = Quantity::INVALID;
        let rows = distribute_stock(&[supply("A", 1.0, 900.0)], &regions, &policy(false, true, AreaVariant::Total));

        assert_eq!(rows[0].occurrence_count, 3);
        assert_relative_eq!(rows[0].area_sum.value().unwrap(), 900.0);
        assert!(!rows[0].allocated_stock.is_valid());
        assert_relative_eq!(rows[1].allocated_stock.value().unwrap(), 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_area_sum_is_invalid() {
        let regions = vec![region("GO_CE", "A", 0.0, 0.0)];
        let rows = distribute_stock(&[supply("A", 1.0, 50.0)], &regions, &policy(false, true, AreaVariant::Total));
        assert!(!rows[0].allocated_stock.is_valid());
        assert!(!rows[0].plantable_hectares.is_valid());
    }

    #[test]
    fn test_join_region_areas_left_join() {
        let regions = vec![
            RegionRecord {
                region_key: "GO_CE".to_string(),
                state: Some("GO".to_string()),
                biome: Some("Cerrado".to_string()),
                species_id: Some("A".to_string()),
            },
            RegionRecord {
                region_key: "XX_XX".to_string(),
                state: None,
                biome: None,
                species_id: Some("A".to_string()),
            },
        ];
        let areas = AreaTable {
            records: vec![AreaRecord {
                region_key: "GO_CE".to_string(),
                area_total: Quantity::new(5.0),
                area_potential: Quantity::new(1.0),
            }],
            has_potential: true,
        };

        let joined = join_region_areas(&regions, &areas);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].area(AreaVariant::Total), Quantity::new(5.0));
        assert_eq!(joined[0].area(AreaVariant::Potential), Quantity::new(1.0));
        assert!(!joined[1].area_total.is_valid());
    }

    #[test]
    fn test_merge_stock_and_density() {
        let density = |id: &str, kg: f64| SpeciesDensity {
            species_id: Some(id.to_string()),
            ordinal: 0,
            seeds_per_kg: Quantity::new(1.0),
            germination_rate_pct: Quantity::new(1.0),
            chunk_index: 0,
            weight: Quantity::new(1.0),
            sum_of_weights: Quantity::new(1.0),
            seeds_per_ha: Quantity::new(kg),
            kg_per_ha: Quantity::new(kg),
        };
        let densities = vec![density("A", 2.0), density("B", 3.0)];
        let combined = vec![
            CombinedStock { species_id: "A".to_string(), combined_stock: Quantity::new(10.0) },
            CombinedStock { species_id: "Z".to_string(), combined_stock: Quantity::new(99.0) },
        ];

        let merged = merge_stock_and_density(&densities, &combined);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].combined_stock, Quantity::new(10.0));
        assert!(!merged[1].combined_stock.is_valid());
    }
}
