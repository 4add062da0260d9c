use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use solar_sizing_opt::report::plot::{plot_battery_distribution, plot_charge_trajectory};
use solar_sizing_opt::report::print_scenario;
use solar_sizing_opt::{
    read_pvwatts, read_usage, select_scenarios, ScenarioSweeper, SizingConfig, SweepMode,
};

const DEFAULT_PRODUCTION: &str = "input/pvwatts_hourly.csv";
const DEFAULT_USAGE: &str = "input/usage.csv";
const CACHE_PATH: &str = "results/sweep_cache.json";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mode = match args.get(1).map(|s| s.as_str()) {
        Some("worst") => SweepMode::WorstWindow,
        Some("full") | None => SweepMode::FullYear,
        Some(other) => {
            eprintln!("Unknown mode '{other}'. Usage: solar-sizing-opt [full|worst] [production.csv] [usage.csv]");
            std::process::exit(2);
        }
    };
    let production_path = args.get(2).map(|s| s.as_str()).unwrap_or(DEFAULT_PRODUCTION);
    let usage_path = args.get(3).map(|s| s.as_str()).unwrap_or(DEFAULT_USAGE);

    if let Err(e) = run(mode, production_path, usage_path) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(mode: SweepMode, production_path: &str, usage_path: &str) -> Result<()> {
    let production = read_pvwatts(production_path)?;
    let usage = read_usage(usage_path)?;
    let config = SizingConfig::default();

    let result = ScenarioSweeper::new(&config, &production, &usage)
        .with_cache(CACHE_PATH)
        .run(mode, good_lp::scip)?;
    println!(
        "Sweep finished: {} of {} windows solved.",
        result.solved_count(),
        result.len()
    );

    let scenarios = select_scenarios(&result)?;
    std::fs::create_dir_all("results").context("Failed to create results directory")?;
    for scenario in scenarios.iter() {
        print_scenario(&config, scenario, usage.total());
        if !scenario.solution.trajectory.charge_level.is_empty() {
            let filename = format!("results/{}_trajectory.png", scenario.name);
            let title = format!(
                "Battery charge, {} (window {})",
                scenario.name, scenario.window_index
            );
            if let Err(e) = plot_charge_trajectory(
                &scenario.solution.trajectory,
                scenario.solution.battery_capacity_kwh,
                config.min_charge_fraction,
                &title,
                &filename,
            ) {
                eprintln!("Warning: failed to plot {filename}: {e}");
            }
        }
    }

    if mode == SweepMode::FullYear {
        if let Err(e) = plot_battery_distribution(&result, "results/battery_distribution.png") {
            eprintln!("Warning: failed to plot battery distribution: {e}");
        }
    }

    Ok(())
}
