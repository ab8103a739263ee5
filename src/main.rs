mod analysis;
mod cli;
mod report;
mod scenario;

use analysis::run_analysis;
use clap::Parser;
use cli::Cli;
use report::render_summary;
use rigx::SolverConfig;
use scenario::Scenario;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr so `--json` output stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SolverConfig::from_path(path)?,
        None => SolverConfig::default(),
    };

    // Either the caller's rig or the built-in 3:1, then any command-line load case.
    let mut scenario = match &cli.rig {
        Some(path) => Scenario::from_path(path)?,
        None => Scenario::demo(),
    };
    scenario.apply_overrides(cli.load, cli.efficiency, cli.target_ma);

    let summary = run_analysis(&scenario, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary.result)?);
    } else {
        println!("{}", render_summary(&summary));
    }

    Ok(())
}
