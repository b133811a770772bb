//! Run the seed threshold pipeline once and export the results
//!
//! Usage:
//!   DATA_DIR=data OUTPUT_DIR=output cargo run --release --bin seed_threshold
//!
//! Parameters come from PARAMS_FILE (JSON) and per-field environment
//! overrides (TARGET_SPECIES, TARGET_DENSITY, CHUNK_SIZE, SUPPLIERS,
//! USE_SPECIES_COUNT, USE_RELATIVE_AREA, AREA_VARIANT, N_SPECIES).
//! DUMP_TABLES=1 also writes the density and allocation tables.

use anyhow::Context;
use seed_threshold::report::{summary_frame, write_outputs};
use seed_threshold::{run_pipeline, DataPaths, RunParams, SeedData};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_threshold=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let paths = DataPaths::from_env();
    let output_dir = PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()));
    let dump_tables = std::env::var("DUMP_TABLES").map(|v| v == "1").unwrap_or(false);

    let params = RunParams::from_env().context("Failed to read run parameters")?;
    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {:?}", paths.data_dir);
    tracing::info!("  OUTPUT_DIR: {:?}", output_dir);
    tracing::info!("  Params: {}", serde_json::to_string(&params)?);

    let data = SeedData::load(&paths).context("Failed to load input tables")?;
    let run = run_pipeline(&data, &params).context("Pipeline run failed")?;

    let summary = summary_frame(&run.summary)?;
    println!("\nResults table (first 30 regions):");
    println!("{}", summary.head(Some(30)));

    let written = write_outputs(&run, &output_dir, dump_tables)
        .with_context(|| format!("Failed to write outputs to {:?}", output_dir))?;
    println!("\n✓ Wrote {} files to {:?}", written.len(), output_dir);

    Ok(())
}
