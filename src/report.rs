//! Table export
//!
//! Converts pipeline tables to Polars DataFrames using the input-style column
//! headers and writes them out. The region summary is the table map and
//! table renderers consume; density and allocation tables are for inspection.

use crate::config::RunParams;
use crate::error::Result;
use crate::pipeline::PipelineRun;
use crate::schema::{allocation, density, output};
use crate::stages::{AllocationRow, RegionSummary, SpeciesDensity};
use crate::utils::frame_helpers::{write_csv, write_parquet};
use crate::utils::Quantity;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SUMMARY_STEM: &str = "region_thresholds";
pub const DENSITY_FILE: &str = "species_density.csv";
pub const ALLOCATION_FILE: &str = "allocation.csv";

/// JSON form of the summary, carrying the parameters that produced it
#[derive(Serialize)]
struct SummaryDocument<'a> {
    params: &'a RunParams,
    regions: &'a [RegionSummary],
}

fn values(quantities: impl Iterator<Item = Quantity>) -> Vec<Option<f64>> {
    quantities.map(Quantity::value).collect()
}

/// `regionkey, Threshold_ha, NumSpeciesUsed, species_count`
pub fn summary_frame(summary: &[RegionSummary]) -> Result<DataFrame> {
    let keys: Vec<&str> = summary.iter().map(|s| s.region_key.as_str()).collect();
    let thresholds: Vec<Option<f64>> = summary.iter().map(|s| s.threshold_hectares).collect();
    let used: Vec<Option<u32>> = summary
        .iter()
        .map(|s| s.species_used_count.map(|n| n as u32))
        .collect();
    let counts: Vec<u32> = summary.iter().map(|s| s.species_count as u32).collect();

    let df = df!(
        output::REGION_KEY => keys,
        output::THRESHOLD_HA => thresholds,
        output::NUM_SPECIES_USED => used,
        output::SPECIES_COUNT => counts,
    )?;
    Ok(df)
}

pub fn density_frame(densities: &[SpeciesDensity]) -> Result<DataFrame> {
    let df = df!(
        density::SPECIES => densities.iter().map(|d| d.species_id.clone()).collect::<Vec<_>>(),
        density::ORDINAL => densities.iter().map(|d| d.ordinal as u64).collect::<Vec<_>>(),
        density::SEEDS_PER_KG => values(densities.iter().map(|d| d.seeds_per_kg)),
        density::GERMINATION_RATE => values(densities.iter().map(|d| d.germination_rate_pct)),
        density::CHUNK_INDEX => densities.iter().map(|d| d.chunk_index as u64).collect::<Vec<_>>(),
        density::WEIGHT => values(densities.iter().map(|d| d.weight)),
        density::SUM_OF_WEIGHTS => values(densities.iter().map(|d| d.sum_of_weights)),
        density::SEEDS_PER_HA => values(densities.iter().map(|d| d.seeds_per_ha)),
        density::KG_PER_HA => values(densities.iter().map(|d| d.kg_per_ha)),
    )?;
    Ok(df)
}

pub fn allocation_frame(rows: &[AllocationRow]) -> Result<DataFrame> {
    let df = df!(
        allocation::REGION_KEY => rows.iter().map(|r| r.region_key.clone()).collect::<Vec<_>>(),
        allocation::STATE => rows.iter().map(|r| r.state.clone()).collect::<Vec<_>>(),
        allocation::BIOME => rows.iter().map(|r| r.biome.clone()).collect::<Vec<_>>(),
        allocation::SPECIE => rows.iter().map(|r| r.species_id.clone()).collect::<Vec<_>>(),
        allocation::AREA => values(rows.iter().map(|r| r.area)),
        allocation::KG_PER_HA => values(rows.iter().map(|r| r.kg_per_ha)),
        allocation::COMBINED_STOCK => values(rows.iter().map(|r| r.combined_stock)),
        allocation::COUNT_APPEARANCES => rows.iter().map(|r| r.occurrence_count as u64).collect::<Vec<_>>(),
        allocation::SUM_AREA => values(rows.iter().map(|r| r.area_sum)),
        allocation::ALLOCATED_STOCK => values(rows.iter().map(|r| r.allocated_stock)),
        allocation::POSSIBLE_HA => values(rows.iter().map(|r| r.plantable_hectares)),
    )?;
    Ok(df)
}

/// Write the summary as CSV, Parquet and JSON; with `dump_tables`, also the
/// density and allocation tables as CSV. Returns the written paths.
pub fn write_outputs(run: &PipelineRun, output_dir: &Path, dump_tables: bool) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let mut summary = summary_frame(&run.summary)?;

    let csv_path = output_dir.join(format!("{SUMMARY_STEM}.csv"));
    write_csv(&mut summary, &csv_path)?;
    written.push(csv_path);

    let parquet_path = output_dir.join(format!("{SUMMARY_STEM}.parquet"));
    write_parquet(&mut summary, &parquet_path)?;
    written.push(parquet_path);

    let json_path = output_dir.join(format!("{SUMMARY_STEM}.json"));
    let document = SummaryDocument {
        params: &run.params,
        regions: &run.summary,
    };
    std::fs::write(&json_path, serde_json::to_string_pretty(&document)?)?;
    written.push(json_path);

    if dump_tables {
        let density_path = output_dir.join(DENSITY_FILE);
        write_csv(&mut density_frame(&run.densities)?, &density_path)?;
        written.push(density_path);

        let allocation_path = output_dir.join(ALLOCATION_FILE);
        write_csv(&mut allocation_frame(&run.allocation)?, &allocation_path)?;
        written.push(allocation_path);
    }

    for path in &written {
        tracing::info!("Wrote {:?}", path);
    }
    Ok(written)
}
