use std::path::PathBuf;

use clap::Parser;

/// Solve the static equilibrium of a rope rig.
///
/// Without a rig file a 3:1 demonstration rig is solved.
#[derive(Debug, Parser)]
#[command(name = "rigx")]
#[command(version)]
pub struct Cli {
    /// Rig description in JSON (nodes, segments, ropes and optional load case)
    #[arg(value_name = "RIG")]
    pub rig: Option<PathBuf>,

    /// Load weight, overriding the rig file
    #[arg(long)]
    pub load: Option<f64>,

    /// Pulley efficiency in (0, 1], overriding the rig file
    #[arg(long)]
    pub efficiency: Option<f64>,

    /// Mechanical advantage to report instead of the solved one
    #[arg(long)]
    pub target_ma: Option<f64>,

    /// Solver configuration in JSON
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the result as JSON instead of a text report
    #[arg(long)]
    pub json: bool,
}
