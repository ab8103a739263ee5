#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod errors;
pub mod geometry;
pub mod least_squares;
pub mod linalg;
pub mod rig;
pub mod skate_block;
pub mod solver;
pub mod system;

pub use config::{SkateBlockConfig, SolverConfig};
pub use errors::{ConfigError, RigError};
pub use geometry::{vec2, Vec2};
pub use rig::{Node, NodeKind, Rig, Rope, Segment};
pub use skate_block::{solve_skate_block, solve_skate_block_with, SkateBlockSolution};
pub use solver::{
    mechanical_advantage, solve_equilibrium, LoadCase, RigStats, SimulationResult,
    SolveDiagnostics, TargetOverride,
};
pub use system::EquilibriumSystem;
