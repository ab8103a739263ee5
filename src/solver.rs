//! Equilibrium solve: tensions, node resultants and mechanical advantage.
//!
//! The physical solve and the target mechanical-advantage override are kept as
//! separate stages. The override only rewrites reported numbers after the
//! physical result exists.

use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SolverConfig;
use crate::errors::RigError;
use crate::geometry::Vec2;
use crate::rig::{Node, Rig, Rope, Segment};
use crate::system::{external_load, EquilibriumSystem};

/// Scalar inputs of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    /// Weight of the load, in force units.
    pub load_weight: f64,
    /// Fraction of tension retained at each pulley, in `(0, 1]`.
    pub efficiency: f64,
    /// Textbook mechanical advantage to report instead of the solved one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ma: Option<f64>,
}

impl LoadCase {
    /// Create a load case without a target mechanical advantage.
    #[must_use]
    pub const fn new(load_weight: f64, efficiency: f64) -> Self {
        Self {
            load_weight,
            efficiency,
            target_ma: None,
        }
    }

    /// Report `target_ma` instead of the solved mechanical advantage.
    #[must_use]
    pub fn with_target_ma(mut self, target_ma: f64) -> Self {
        self.target_ma = Some(target_ma);
        self
    }

    /// Efficiency actually used by the physical solve.
    ///
    /// Values outside `[0, 1]` are clamped and a non-number falls back to 1.0.
    /// A 1:1 target is lossless by convention.
    #[must_use]
    pub fn effective_efficiency(&self) -> f64 {
        if self.target_ma == Some(1.0) {
            return 1.0;
        }
        sanitize_efficiency(self.efficiency)
    }
}

/// Aggregate figures reported alongside the tensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigStats {
    /// Tension on the first segment of the first rope.
    pub haul_tension: f64,
    /// Load weight the solve was run with.
    pub load_weight: f64,
    /// Mechanical advantage with lossless pulleys.
    pub ideal_ma: f64,
    /// Mechanical advantage at the requested efficiency.
    pub effective_ma: f64,
}

/// How trustworthy the numbers are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// Columns skipped by the eliminator during the physical solve.
    pub skipped_pivots: usize,
    /// Whether some tension direction was left unconstrained.
    pub rank_deficient: bool,
    /// Whether tensions and MA were overwritten by a target MA.
    pub target_override: bool,
}

/// Output of an equilibrium solve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Tension of each segment, never negative.
    pub tensions: BTreeMap<String, f64>,
    /// Resultant force on each node: incident tensions plus external load.
    ///
    /// The load is added on every node whose kind carries it. That covers
    /// [`crate::NodeKind::PulleyFree`] blocks as well as
    /// [`crate::NodeKind::Load`] nodes, so a balanced moving pulley reports a
    /// near-zero resultant.
    pub node_forces: BTreeMap<String, Vec2>,
    /// Haul tension and mechanical advantage.
    pub stats: RigStats,
    /// Numerical diagnostics.
    pub diagnostics: SolveDiagnostics,
}

impl SimulationResult {
    /// Result for a rig without segments.
    fn empty(load_weight: f64) -> Self {
        Self {
            stats: RigStats {
                load_weight,
                ..RigStats::default()
            },
            ..Self::default()
        }
    }

    /// Tension of the segment with the given id.
    #[must_use]
    pub fn tension(&self, segment: &str) -> Option<f64> {
        self.tensions.get(segment).copied()
    }

    /// Resultant force on the node with the given id.
    #[must_use]
    pub fn node_force(&self, node: &str) -> Option<Vec2> {
        self.node_forces.get(node).copied()
    }
}

/// Post-processing stage that makes reported figures match a named
/// mechanical advantage.
///
/// Every segment is reported at `load / target`, ideal MA becomes the target,
/// and effective MA equals the ideal when the efficiency is within the
/// configured tolerance of 1.0. Node forces are left untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetOverride {
    /// Mechanical advantage to report.
    pub target_ma: f64,
}

impl TargetOverride {
    /// Create the stage, or `None` when the target cannot be honoured.
    #[must_use]
    pub fn new(target_ma: f64) -> Option<Self> {
        if target_ma.is_finite() && target_ma > 0.0 {
            Some(Self { target_ma })
        } else {
            warn!(target_ma, "Ignoring non-positive target mechanical advantage");
            None
        }
    }

    /// Rewrite `result` in place.
    pub fn apply(&self, result: &mut SimulationResult, efficiency: f64, efficiency_tolerance: f64) {
        let load_weight = result.stats.load_weight;
        let haul_tension = load_weight / self.target_ma;
        for tension in result.tensions.values_mut() {
            *tension = haul_tension;
        }
        result.stats.ideal_ma = self.target_ma;
        result.stats.haul_tension = haul_tension;
        result.stats.effective_ma = if (efficiency - 1.0).abs() <= efficiency_tolerance {
            result.stats.ideal_ma
        } else {
            mechanical_advantage(load_weight, haul_tension)
        };
        result.diagnostics.target_override = true;
    }
}

/// Solve a rig given as plain lists with the default configuration.
///
/// # Errors
///
/// Returns a [`RigError`] when the lists reference ids that do not exist. The
/// solve itself always produces a result.
///
/// # Examples
/// ```
/// use rigx::{solve_equilibrium, vec2, Node, NodeKind, Rope, Segment};
///
/// // A 2:1: the haul line and the anchored standing part both hold the block.
/// let nodes = [
///     Node::new("anchor", NodeKind::Anchor, vec2(0.0, 0.0)),
///     Node::new("hand", NodeKind::Anchor, vec2(0.0, 0.0)),
///     Node::new("block", NodeKind::Load, vec2(0.0, 10.0)),
/// ];
/// let segments = [
///     Segment::new("haul", "block", "hand"),
///     Segment::new("standing", "block", "anchor"),
/// ];
/// let ropes = [Rope::new(["haul", "standing"])];
///
/// let result = solve_equilibrium(&nodes, &segments, &ropes, 100.0, 1.0, None)
///     .expect("well-formed rig");
/// assert!((result.stats.haul_tension - 50.0).abs() < 1.0e-6);
/// assert!((result.stats.effective_ma - 2.0).abs() < 1.0e-6);
/// ```
pub fn solve_equilibrium(
    nodes: &[Node],
    segments: &[Segment],
    ropes: &[Rope],
    load_weight: f64,
    efficiency: f64,
    target_ma: Option<f64>,
) -> Result<SimulationResult, RigError> {
    let rig = Rig::from_parts(nodes, segments, ropes)?;
    let case = LoadCase {
        load_weight,
        efficiency,
        target_ma,
    };
    Ok(rig.solve(&case))
}

impl Rig {
    /// Solve the rig with the default configuration.
    #[must_use]
    pub fn solve(&self, case: &LoadCase) -> SimulationResult {
        self.solve_with(case, &SolverConfig::default())
    }

    /// Solve the rig with an explicit configuration.
    ///
    /// Runs the physical solve at the requested efficiency, a second
    /// independent solve at efficiency 1.0 for the ideal mechanical advantage,
    /// and finally the [`TargetOverride`] stage when a target is given.
    #[must_use]
    pub fn solve_with(&self, case: &LoadCase, config: &SolverConfig) -> SimulationResult {
        if self.segment_count() == 0 {
            debug!("Rig has no segments; returning an empty result");
            return SimulationResult::empty(case.load_weight);
        }

        let efficiency = case.effective_efficiency();
        let (tensions, skipped_pivots) = self.solve_tensions(case.load_weight, efficiency, config);
        let (ideal_tensions, _) = self.solve_tensions(case.load_weight, 1.0, config);

        let haul_tension = self.haul_tension(&tensions);
        let ideal_haul_tension = self.haul_tension(&ideal_tensions);

        let mut result = SimulationResult {
            tensions: self
                .segments()
                .zip(&tensions)
                .map(|(segment, &tension)| (segment.id.clone(), tension))
                .collect(),
            node_forces: self
                .node_indices()
                .map(|node| {
                    (
                        self.node_at(node).id.clone(),
                        self.resultant_force(node, &tensions, case.load_weight),
                    )
                })
                .collect(),
            stats: RigStats {
                haul_tension,
                load_weight: case.load_weight,
                ideal_ma: mechanical_advantage(case.load_weight, ideal_haul_tension),
                effective_ma: mechanical_advantage(case.load_weight, haul_tension),
            },
            diagnostics: SolveDiagnostics {
                skipped_pivots,
                rank_deficient: skipped_pivots > 0,
                target_override: false,
            },
        };

        if let Some(stage) = case.target_ma.and_then(TargetOverride::new) {
            stage.apply(&mut result, efficiency, config.efficiency_tolerance);
        }

        debug!(
            segments = self.segment_count(),
            haul_tension = result.stats.haul_tension,
            effective_ma = result.stats.effective_ma,
            ideal_ma = result.stats.ideal_ma,
            "Solved rig equilibrium"
        );
        result
    }

    /// Build and solve the system, returning clamped tensions in segment order
    /// and the number of skipped pivots.
    fn solve_tensions(
        &self,
        load_weight: f64,
        efficiency: f64,
        config: &SolverConfig,
    ) -> (Vec<f64>, usize) {
        let system = EquilibriumSystem::build(self, load_weight, efficiency, config);
        let solved = system.solve(config.pivot_tolerance);
        let tensions = solved
            .solution
            .iter()
            .map(|&tension| tension.max(0.0))
            .collect();
        (tensions, solved.skipped_pivots)
    }

    /// Tension on the first segment of the first rope.
    fn haul_tension(&self, tensions: &[f64]) -> f64 {
        self.ropes()
            .first()
            .and_then(|rope| rope.first())
            .map_or(0.0, |segment| tensions[segment.index()])
    }

    /// External load plus the pull of every incident segment.
    fn resultant_force(&self, node: NodeIndex, tensions: &[f64], load_weight: f64) -> Vec2 {
        let kind = self.node_at(node).kind;
        self.incident(node)
            .fold(external_load(kind.carries_load(), load_weight), |sum, (segment, direction)| {
                sum + direction * tensions[segment.index()]
            })
    }

    /// Tension of a segment in a solved result, looked up by position.
    #[must_use]
    pub fn segment_tension(&self, result: &SimulationResult, position: usize) -> Option<f64> {
        self.segments()
            .nth(position)
            .and_then(|segment| result.tension(&segment.id))
    }
}

/// `load / haul`, or zero when nothing is hauling.
#[must_use]
pub fn mechanical_advantage(load_weight: f64, haul_tension: f64) -> f64 {
    if haul_tension == 0.0 {
        0.0
    } else {
        load_weight / haul_tension
    }
}

/// Clamp an efficiency into `[0, 1]`.
pub(crate) fn sanitize_efficiency(efficiency: f64) -> f64 {
    if efficiency.is_nan() {
        warn!("Efficiency is not a number; using 1.0");
        1.0
    } else if !(0.0..=1.0).contains(&efficiency) {
        let clamped = efficiency.clamp(0.0, 1.0);
        warn!(efficiency, clamped, "Efficiency outside [0, 1]; clamping");
        clamped
    } else {
        efficiency
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::vec2;
    use crate::rig::NodeKind;

    /// Load hanging from two anchors on separate single-segment ropes.
    fn bridle(left: Vec2, right: Vec2, load: Vec2) -> Rig {
        let nodes = [
            Node::new("left", NodeKind::Anchor, left),
            Node::new("right", NodeKind::Anchor, right),
            Node::new("load", NodeKind::Load, load),
        ];
        let segments = [
            Segment::new("l", "load", "left"),
            Segment::new("r", "load", "right"),
        ];
        Rig::from_parts(&nodes, &segments, &[Rope::new(["l"]), Rope::new(["r"])])
            .expect("valid rig")
    }

    #[test]
    fn mechanical_advantage_guards_zero_haul() {
        assert_eq!(mechanical_advantage(100.0, 0.0), 0.0);
        assert_relative_eq!(mechanical_advantage(100.0, 25.0), 4.0);
    }

    #[test]
    fn efficiency_is_clamped() {
        assert_eq!(sanitize_efficiency(1.5), 1.0);
        assert_eq!(sanitize_efficiency(-0.2), 0.0);
        assert_eq!(sanitize_efficiency(f64::NAN), 1.0);
        assert_eq!(sanitize_efficiency(0.85), 0.85);
    }

    #[test]
    fn one_to_one_target_is_lossless() {
        let case = LoadCase::new(100.0, 0.7).with_target_ma(1.0);
        assert_eq!(case.effective_efficiency(), 1.0);
        assert_eq!(LoadCase::new(100.0, 0.7).effective_efficiency(), 0.7);
    }

    #[test]
    fn symmetric_bridle_shares_load() {
        let rig = bridle(vec2(-3.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 4.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0));
        // Each leg is 5 long with a vertical rise of 4: T · 4/5 = 40.
        assert_relative_eq!(result.tension("l").unwrap_or_default(), 50.0, epsilon = 1.0e-8);
        assert_relative_eq!(result.tension("r").unwrap_or_default(), 50.0, epsilon = 1.0e-8);
        let residual = result.node_force("load").unwrap_or_default();
        assert!(residual.length() < 1.0e-8);
        assert!(!result.diagnostics.rank_deficient);
    }

    #[test]
    fn anchor_resultant_is_reaction_pull() {
        let rig = bridle(vec2(-3.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 4.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0));
        let left = result.node_force("left").unwrap_or_default();
        assert_relative_eq!(left.x, 30.0, epsilon = 1.0e-8);
        assert_relative_eq!(left.y, 40.0, epsilon = 1.0e-8);
    }

    #[test]
    fn inverted_geometry_clamps_to_zero() {
        // Load above both anchors: the solve asks the ropes to push.
        let rig = bridle(vec2(-3.0, 0.0), vec2(3.0, 0.0), vec2(0.0, -4.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0));
        assert!(result.tensions.values().all(|&tension| tension == 0.0));
        assert_eq!(result.stats.effective_ma, 0.0);
    }

    #[test]
    fn horizontal_bridle_is_rank_deficient_but_finite() {
        let rig = bridle(vec2(-3.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 0.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0));
        assert!(result.diagnostics.rank_deficient);
        assert!(result.tensions.values().all(|tension| tension.is_finite()));
    }

    #[test]
    fn coincident_nodes_do_not_produce_nan() {
        let rig = bridle(vec2(0.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 0.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0));
        assert!(result.tensions.values().all(|tension| tension.is_finite()));
        assert!(result
            .node_forces
            .values()
            .all(|force| force.x.is_finite() && force.y.is_finite()));
    }

    #[test]
    fn override_stage_rewrites_tensions_and_ma() {
        let mut result = SimulationResult {
            tensions: [("a".to_string(), 10.0), ("b".to_string(), 70.0)]
                .into_iter()
                .collect(),
            stats: RigStats {
                haul_tension: 10.0,
                load_weight: 90.0,
                ideal_ma: 2.5,
                effective_ma: 9.0,
            },
            ..SimulationResult::default()
        };
        let stage = TargetOverride::new(3.0).expect("positive target");
        stage.apply(&mut result, 0.8, 0.01);

        assert_eq!(result.tension("a"), Some(30.0));
        assert_eq!(result.tension("b"), Some(30.0));
        assert_eq!(result.stats.ideal_ma, 3.0);
        assert_eq!(result.stats.haul_tension, 30.0);
        assert_relative_eq!(result.stats.effective_ma, 3.0);
        assert!(result.diagnostics.target_override);
    }

    #[test]
    fn override_equates_effective_and_ideal_near_unit_efficiency() {
        let mut result = SimulationResult::empty(0.0);
        TargetOverride::new(4.0)
            .expect("positive target")
            .apply(&mut result, 0.995, 0.01);
        // With no load the haul is zero, yet near-lossless efficiency reports the target.
        assert_eq!(result.stats.effective_ma, 4.0);

        let mut lossy = SimulationResult::empty(0.0);
        TargetOverride::new(4.0)
            .expect("positive target")
            .apply(&mut lossy, 0.9, 0.01);
        assert_eq!(lossy.stats.effective_ma, 0.0);
    }

    #[test]
    fn non_positive_target_is_ignored() {
        assert!(TargetOverride::new(0.0).is_none());
        assert!(TargetOverride::new(-2.0).is_none());
        let rig = bridle(vec2(-3.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 4.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0).with_target_ma(0.0));
        assert!(!result.diagnostics.target_override);
    }

    #[test]
    fn segment_tension_by_position() {
        let rig = bridle(vec2(-3.0, 0.0), vec2(3.0, 0.0), vec2(0.0, 4.0));
        let result = rig.solve(&LoadCase::new(80.0, 1.0));
        assert_eq!(rig.segment_tension(&result, 1), result.tension("r"));
        assert_eq!(rig.segment_tension(&result, 5), None);
    }
}
