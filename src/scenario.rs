use std::path::Path;

use rigx::{vec2, LoadCase, Node, NodeKind, Rope, Segment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a rig file cannot be loaded.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read rig file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid rig description.
    #[error("failed to parse rig file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A rig together with the load case it should be solved for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Nodes of the rig.
    pub nodes: Vec<Node>,
    /// Rope segments between nodes.
    pub segments: Vec<Segment>,
    /// Ropes, each an ordered list of segment ids starting at the haul end.
    #[serde(default)]
    pub ropes: Vec<Rope>,
    /// Weight of the load.
    #[serde(default = "default_load_weight")]
    pub load_weight: f64,
    /// Pulley efficiency.
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    /// Mechanical advantage to report instead of the solved one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ma: Option<f64>,
}

/// Load used when a rig file does not name one.
fn default_load_weight() -> f64 {
    100.0
}

/// Efficiency used when a rig file does not name one.
fn default_efficiency() -> f64 {
    1.0
}

impl Scenario {
    /// Parse a scenario from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a scenario from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// A 3:1 with one anchor pulley and a pulley on the load block.
    ///
    /// The hauler pulls straight up on a line leaving the block, the rope turns
    /// around the block, runs up to the anchor pulley and back down to the
    /// block's becket, so three strands hold the load.
    pub fn demo() -> Self {
        Self {
            nodes: vec![
                Node::new("hand", NodeKind::Anchor, vec2(-0.5, -4.0)),
                Node::new("anchor", NodeKind::PulleyAnchor, vec2(0.5, 0.0)).with_sheaves(1),
                Node::new("block", NodeKind::Load, vec2(0.0, 8.0)).with_sheaves(1),
            ],
            segments: vec![
                Segment::new("haul", "block", "hand"),
                Segment::new("rise", "block", "anchor"),
                Segment::new("fall", "anchor", "block"),
            ],
            ropes: vec![Rope::new(["haul", "rise", "fall"])],
            load_weight: 120.0,
            efficiency: 0.9,
            target_ma: None,
        }
    }

    /// Replace the load case with any values given on the command line.
    pub fn apply_overrides(
        &mut self,
        load_weight: Option<f64>,
        efficiency: Option<f64>,
        target_ma: Option<f64>,
    ) {
        if let Some(load_weight) = load_weight {
            self.load_weight = load_weight;
        }
        if let Some(efficiency) = efficiency {
            self.efficiency = efficiency;
        }
        if target_ma.is_some() {
            self.target_ma = target_ma;
        }
    }

    /// Scalar inputs for the solver.
    pub fn load_case(&self) -> LoadCase {
        LoadCase {
            load_weight: self.load_weight,
            efficiency: self.efficiency,
            target_ma: self.target_ma,
        }
    }
}
