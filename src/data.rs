//! Data Loading and Management
//!
//! Loads the species, stock, region and area tables with Polars and converts
//! them into typed records. Every column is read as text and numeric cells go
//! through the locale number parser, so a malformed cell fails the load with
//! `SeedError::Parse` and a missing header fails it with `SeedError::Schema`.

use crate::config::{DataPaths, SupplyType, TargetSpeciesSet};
use crate::error::Result;
use crate::schema;
use crate::utils::frame_helpers::{has_column, raw_values, read_csv_str, read_csv_table, str_values};
use crate::utils::{materialize_with_columns, parse_locale_column, Quantity};
use polars::prelude::*;
use serde::Serialize;

/// One row of the species table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesRecord {
    /// 0-based row position in the source table; drives chunk assignment
    pub ordinal: usize,
    pub species_id: Option<String>,
    pub seeds_per_kg: Quantity,
    /// Percentage, expected in (0, 100]
    pub germination_rate_pct: Quantity,
}

/// One (species, supply channel) stock row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    pub species_id: String,
    pub supply_type: SupplyType,
    pub quantity_kg: Quantity,
}

/// Eligibility of one species in one state×biome region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecord {
    pub region_key: String,
    pub state: Option<String>,
    pub biome: Option<String>,
    pub species_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRecord {
    pub region_key: String,
    pub area_total: Quantity,
    pub area_potential: Quantity,
}

/// Area rows plus whether the source table carried `area_potential`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaTable {
    pub records: Vec<AreaRecord>,
    pub has_potential: bool,
}

/// Main data holder for a seed allocation run
///
/// Both target-species region tables are held so a run can pick either one.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub species: Vec<SpeciesRecord>,
    pub stock: Vec<StockRecord>,
    pub regions_top30: Vec<RegionRecord>,
    pub regions_top60: Vec<RegionRecord>,
    pub areas: AreaTable,
}

impl SeedData {
    /// Load all tables from the data directory
    pub fn load(paths: &DataPaths) -> Result<Self> {
        tracing::info!("Loading seed tables from {:?}", paths.data_dir);

        let species = parse_species(read_csv_table(&paths.species())?)?;
        let stock = parse_stock(read_csv_table(&paths.stocks())?)?;
        let regions_top30 = parse_regions(read_csv_table(&paths.regions(TargetSpeciesSet::Top30))?)?;
        let regions_top60 = parse_regions(read_csv_table(&paths.regions(TargetSpeciesSet::Top60))?)?;
        let areas = parse_areas(read_csv_table(&paths.areas())?)?;

        let data = SeedData { species, stock, regions_top30, regions_top60, areas };
        data.log_sizes();
        Ok(data)
    }

    /// Build from CSV text held in memory (same validation as `load`)
    pub fn from_csv_text(
        species_csv: &str,
        stock_csv: &str,
        regions_top30_csv: &str,
        regions_top60_csv: &str,
        areas_csv: &str,
    ) -> Result<Self> {
        Ok(SeedData {
            species: parse_species(read_csv_str(species_csv)?)?,
            stock: parse_stock(read_csv_str(stock_csv)?)?,
            regions_top30: parse_regions(read_csv_str(regions_top30_csv)?)?,
            regions_top60: parse_regions(read_csv_str(regions_top60_csv)?)?,
            areas: parse_areas(read_csv_str(areas_csv)?)?,
        })
    }

    pub fn regions(&self, set: TargetSpeciesSet) -> &[RegionRecord] {
        match set {
            TargetSpeciesSet::Top30 => &self.regions_top30,
            TargetSpeciesSet::Top60 => &self.regions_top60,
        }
    }

    fn log_sizes(&self) {
        tracing::info!("  Species: {}", self.species.len());
        tracing::info!("  Stock rows: {}", self.stock.len());
        tracing::info!("  Region rows (top 30): {}", self.regions_top30.len());
        tracing::info!("  Region rows (top 60): {}", self.regions_top60.len());
        tracing::info!(
            "  Area rows: {} (area_potential: {})",
            self.areas.records.len(),
            if self.areas.has_potential { "present" } else { "absent" }
        );
    }
}

/// Parse the species table, recording each row's position as its ordinal
pub fn parse_species(df: DataFrame) -> Result<Vec<SpeciesRecord>> {
    use schema::species::*;

    let df = materialize_with_columns(df, &REQUIRED, TABLE)?;
    let ids = str_values(&df, SPECIES)?;
    let seeds = parse_locale_column(raw_values(&df, SEEDS_PER_KG)?, SEEDS_PER_KG)?;
    let germination = parse_locale_column(raw_values(&df, GERMINATION_RATE)?, GERMINATION_RATE)?;

    Ok(ids
        .into_iter()
        .zip(seeds)
        .zip(germination)
        .enumerate()
        .map(|(ordinal, ((id, seeds_per_kg), germination_rate_pct))| SpeciesRecord {
            ordinal,
            species_id: id.map(str::to_string),
            seeds_per_kg,
            germination_rate_pct,
        })
        .collect())
}

/// Parse the stock table.
///
/// Rows without a species or with a supply type outside the four known
/// channels can never be selected, so they are dropped with a warning.
pub fn parse_stock(df: DataFrame) -> Result<Vec<StockRecord>> {
    use schema::stock::*;

    let df = materialize_with_columns(df, &REQUIRED, TABLE)?;
    let ids = str_values(&df, SPECIE)?;
    let types = str_values(&df, SUPPLY_TYPE)?;
    let quantities = parse_locale_column(raw_values(&df, QUANTITY_KG)?, QUANTITY_KG)?;

    let mut records = Vec::with_capacity(df.height());
    let mut dropped = 0usize;

    for ((id, supply), quantity_kg) in ids.into_iter().zip(types).zip(quantities) {
        let parsed = supply.and_then(|s| s.parse::<SupplyType>().ok());
        match (id, parsed) {
            (Some(id), Some(supply_type)) => records.push(StockRecord {
                species_id: id.to_string(),
                supply_type,
                quantity_kg,
            }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::warn!(
            "Dropped {} stock rows with a blank species or unknown {}",
            dropped,
            SUPPLY_TYPE
        );
    }
    Ok(records)
}

/// Parse a region eligibility table (top 30 or top 60 variant)
pub fn parse_regions(df: DataFrame) -> Result<Vec<RegionRecord>> {
    use schema::region::*;

    let df = materialize_with_columns(df, &REQUIRED, TABLE)?;
    let keys = str_values(&df, REGION_KEY)?;
    let states = str_values(&df, STATE)?;
    let biomes = str_values(&df, BIOME)?;
    let species = str_values(&df, SPECIE)?;

    let mut records = Vec::with_capacity(df.height());
    let mut dropped = 0usize;

    for (((key, state), biome), species_id) in keys.into_iter().zip(states).zip(biomes).zip(species) {
        let Some(key) = key else {
            dropped += 1;
            continue;
        };
        records.push(RegionRecord {
            region_key: key.to_string(),
            state: state.map(str::to_string),
            biome: biome.map(str::to_string),
            species_id: species_id.map(str::to_string),
        });
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} region rows with a blank {}", dropped, REGION_KEY);
    }
    Ok(records)
}

/// Parse the area table; `area_potential` is optional
pub fn parse_areas(df: DataFrame) -> Result<AreaTable> {
    use schema::area::*;

    let has_potential = has_column(&df, AREA_POTENTIAL);
    let columns: Vec<&str> = if has_potential {
        vec![REGION_KEY, AREA, AREA_POTENTIAL]
    } else {
        REQUIRED.to_vec()
    };

    let df = materialize_with_columns(df, &columns, TABLE)?;
    let keys = str_values(&df, REGION_KEY)?;
    let totals = parse_locale_column(raw_values(&df, AREA)?, AREA)?;
    let potentials = if has_potential {
        parse_locale_column(raw_values(&df, AREA_POTENTIAL)?, AREA_POTENTIAL)?
    } else {
        vec![Quantity::INVALID; df.height()]
    };

    let records = keys
        .into_iter()
        .zip(totals)
        .zip(potentials)
        .filter_map(|((key, area_total), area_potential)| {
            key.map(|k| AreaRecord {
                region_key: k.to_string(),
                area_total,
                area_potential,
            })
        })
        .collect();

    Ok(AreaTable { records, has_potential })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeedError;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_species_assigns_ordinals() {
        let df = read_csv_str(
            "Species,Seeds/kg,Germination Rate (%)\n\
             Inga edulis,\"1 200\",\"85,5\"\n\
             Cedrela fissilis,,60\n",
        )
        .unwrap();
        let species = parse_species(df).unwrap();

        assert_eq!(species.len(), 2);
        assert_eq!(species[0].ordinal, 0);
        assert_eq!(species[1].ordinal, 1);
        assert_eq!(species[0].species_id.as_deref(), Some("Inga edulis"));
        assert_relative_eq!(species[0].seeds_per_kg.value().unwrap(), 1200.0);
        assert_relative_eq!(species[0].germination_rate_pct.value().unwrap(), 85.5);
        assert!(!species[1].seeds_per_kg.is_valid());
    }

    #[test]
    fn test_parse_species_missing_column() {
        let df = read_csv_str("Species,Seeds/kg\nA,100\n").unwrap();
        let err = parse_species(df).unwrap_err();
        assert!(matches!(err, SeedError::Schema { ref column, .. } if column == "Germination Rate (%)"));
    }

    #[test]
    fn test_parse_species_garbage_number() {
        let df = read_csv_str("Species,Seeds/kg,Germination Rate (%)\nA,lots,50\n").unwrap();
        let err = parse_species(df).unwrap_err();
        assert!(matches!(err, SeedError::Parse { ref value, .. } if value == "lots"));
    }

    #[test]
    fn test_parse_stock_drops_unknown_supply_types() {
        let df = read_csv_str(
            "Specie,Supply_Type,Total_MORFO_Supply_Kg\n\
             A,supplier_top,10\n\
             A,wholesale,5\n\
             ,pilot_top,3\n\
             B,pilot_2ry,\"2,5\"\n",
        )
        .unwrap();
        let stock = parse_stock(df).unwrap();

        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].supply_type, SupplyType::SupplierTop);
        assert_eq!(stock[1].species_id, "B");
        assert_relative_eq!(stock[1].quantity_kg.value().unwrap(), 2.5);
    }

    #[test]
    fn test_parse_areas_optional_potential() {
        let without = parse_areas(read_csv_str("regionkey,Area\nr1,\"1 000\"\n").unwrap()).unwrap();
        assert!(!without.has_potential);
        assert_relative_eq!(without.records[0].area_total.value().unwrap(), 1000.0);
        assert!(!without.records[0].area_potential.is_valid());

        let with = parse_areas(
            read_csv_str("regionkey,Area,area_potential\nr1,1000,250\n").unwrap(),
        )
        .unwrap();
        assert!(with.has_potential);
        assert_relative_eq!(with.records[0].area_potential.value().unwrap(), 250.0);
    }

    #[test]
    fn test_parse_regions() {
        let df = read_csv_str(
            "regionkey,STATE,BIOME,Specie\n\
             BA_MA,BA,Mata Atlantica,A\n\
             BA_MA,BA,Mata Atlantica,\n",
        )
        .unwrap();
        let regions = parse_regions(df).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].state.as_deref(), Some("BA"));
        assert_eq!(regions[1].species_id, None);
    }

    #[test]
    fn test_load_sample_data() {
        let paths = DataPaths::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let data = SeedData::load(&paths).expect("Failed to load data");
        assert_eq!(data.species.len(), 10);
        assert!(data.regions_top60.len() > data.regions_top30.len());
        assert!(data.areas.has_potential);
        // Blank germination rate stays invalid rather than failing the load
        assert!(!data.species[7].germination_rate_pct.is_valid());
    }
}
