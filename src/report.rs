use crate::analysis::AnalysisSummary;
use std::fmt::Write;

/// Render a textual summary of a solved rig.
///
/// Tensions are listed in declaration order with their share of the load, so a
/// reader can see at a glance where friction loss accumulates along each rope.
#[must_use]
pub fn render_summary(summary: &AnalysisSummary) -> String {
    let mut output = String::new();
    let result = &summary.result;
    let stats = &result.stats;

    writeln!(
        &mut output,
        "Rig equilibrium (load = {:.1}, efficiency = {:.2}, {} rope(s))",
        summary.case.load_weight, summary.case.efficiency, summary.rope_count
    )
    .expect("writing to string cannot fail");

    for id in &summary.segment_order {
        let tension = result.tension(id).unwrap_or_default();
        writeln!(
            &mut output,
            "  {id:<12} tension = {tension:>10.3} ({:>5.1}% of load)",
            share_of_load(tension, stats.load_weight)
        )
        .expect("writing to string cannot fail");
    }

    writeln!(&mut output, "Haul tension: {:.3}", stats.haul_tension)
        .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "Mechanical advantage: ideal {:.2}:1, effective {:.2}:1",
        stats.ideal_ma, stats.effective_ma
    )
    .expect("writing to string cannot fail");

    if result.diagnostics.target_override {
        output.push_str(
            "Note: tensions reported uniformly to match the target mechanical advantage\n",
        );
    }
    if result.diagnostics.rank_deficient {
        writeln!(
            &mut output,
            "Warning: rig is under-constrained ({} free direction(s)); some tensions are arbitrary",
            result.diagnostics.skipped_pivots
        )
        .expect("writing to string cannot fail");
    }

    output
}

/// Tension as a percentage of the load, zero for a weightless load.
fn share_of_load(tension: f64, load_weight: f64) -> f64 {
    if load_weight == 0.0 {
        0.0
    } else {
        100.0 * tension / load_weight
    }
}
