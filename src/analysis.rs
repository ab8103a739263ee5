use crate::scenario::Scenario;
use rigx::{LoadCase, Rig, RigError, SimulationResult, SolverConfig};

/// Solved scenario with what the report needs to present it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// Load case the rig was solved for.
    pub case: LoadCase,
    /// Segment ids in the order they were declared.
    pub segment_order: Vec<String>,
    /// Number of ropes threaded through the rig.
    pub rope_count: usize,
    /// The solver output.
    pub result: SimulationResult,
}

/// Assemble the rig described by `scenario` and solve it.
///
/// Tensions come from the weighted least-squares formulation of force balance
/// and rope continuity; see <https://en.wikipedia.org/wiki/Block_and_tackle>
/// for the mechanical advantage being reported.
pub fn run_analysis(
    scenario: &Scenario,
    config: &SolverConfig,
) -> Result<AnalysisSummary, RigError> {
    let rig = Rig::from_parts(&scenario.nodes, &scenario.segments, &scenario.ropes)?;
    let case = scenario.load_case();
    let result = rig.solve_with(&case, config);

    Ok(AnalysisSummary {
        case,
        segment_order: rig.segments().map(|segment| segment.id.clone()).collect(),
        rope_count: rig.rope_count(),
        result,
    })
}
