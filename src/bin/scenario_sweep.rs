//! Compare distribution policies side by side
//!
//! Runs every combination of the species-count and relative-area flags (and
//! both area variants when area weighting is on) for the configured base
//! parameters, in parallel.
//!
//! Usage:
//!   DATA_DIR=data cargo run --release --bin scenario_sweep

use anyhow::Context;
use seed_threshold::explorer::distribution_scenarios;
use seed_threshold::{DataPaths, RunParams, ScenarioExplorer, SeedData};
use std::time::Instant;
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
    let base = RunParams::from_env().context("Failed to read run parameters")?;
    let data = SeedData::load(&paths).context("Failed to load input tables")?;
    let has_potential = data.areas.has_potential;

    let explorer = ScenarioExplorer::new(data);
    let scenarios: Vec<RunParams> = distribution_scenarios(&base)
        .into_iter()
        .filter(|p| has_potential || p.distribution.area_variant != seed_threshold::AreaVariant::Potential)
        .collect();

    let start = Instant::now();
    let results = explorer.sweep(&scenarios);

    println!("\n{}", "=".repeat(78));
    println!(
        "{:<14} {:<14} {:<10} {:>16} {:>18}",
        "species_count", "relative_area", "area", "regions w/ thr.", "median Threshold_ha"
    );
    println!("{}", "=".repeat(78));

    for (params, result) in scenarios.iter().zip(results) {
        let d = params.distribution;
        let area = if d.use_relative_area { format!("{:?}", d.area_variant) } else { "-".to_string() };
        match result {
            Ok(run) => println!(
                "{:<14} {:<14} {:<10} {:>16} {:>18}",
                d.use_species_count,
                d.use_relative_area,
                area,
                run.regions_with_threshold(),
                run.median_threshold()
                    .map_or_else(|| "n/a".to_string(), |m| format!("{:.1}", m)),
            ),
            Err(e) => println!(
                "{:<14} {:<14} {:<10} failed: {}",
                d.use_species_count, d.use_relative_area, area, e
            ),
        }
    }

    println!("{}", "=".repeat(78));
    println!(
        "{} scenarios in {:.3} ms ({} cached)",
        scenarios.len(),
        start.elapsed().as_secs_f64() * 1000.0,
        explorer.cached_runs()
    );

    Ok(())
}
