//! Two-point balance for a skate block riding a tensioned skyline.
//!
//! The carriage hangs between anchors A and B with the load below it. The leg
//! to A is the skyline and carries the known tension. The control line to B
//! takes whatever tension cancels the skyline's horizontal pull, so for a given
//! carriage height both legs are determined and only the vertical balance is
//! left. The height is found by bisecting on the sign of that vertical residual.
//! Past the carriage sheave the skyline runs on with `efficiency` of its tension.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SkateBlockConfig;
use crate::errors::ConfigError;
use crate::geometry::Vec2;
use crate::solver::sanitize_efficiency;

/// Balanced carriage position and line tensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkateBlockSolution {
    /// Vertical coordinate of the carriage (diagram coordinates, y down).
    pub carriage_y: f64,
    /// Tension of the skyline leg running to anchor A.
    pub tension_a: f64,
    /// Tension of the control line running to anchor B.
    pub tension_b: f64,
    /// Tension of the skyline past the carriage sheave.
    pub tension_c: f64,
    /// Net horizontal pull of both legs on the carriage, positive to the right.
    ///
    /// Zero whenever the carriage lies strictly between the anchors; outside
    /// the span no pulling control line can cancel the skyline.
    pub horizontal_imbalance: f64,
    /// Upward support minus load weight at `carriage_y`.
    pub vertical_residual: f64,
    /// Bisection steps taken.
    pub iterations: usize,
}

/// Solve the skate block with the default configuration.
///
/// # Examples
/// ```
/// use rigx::{solve_skate_block, vec2};
///
/// let solution = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, 0.0), 0.0, 100.0, 100.0, 1.0);
/// // Each leg lifts half the load: 100 · y / √(100 + y²) = 50.
/// assert!((solution.carriage_y - (100.0_f64 / 3.0).sqrt()).abs() < 1.0e-6);
/// assert!(solution.horizontal_imbalance.abs() < 1.0e-9);
/// ```
#[must_use]
pub fn solve_skate_block(
    anchor_a: Vec2,
    anchor_b: Vec2,
    carriage_x: f64,
    skyline_tension: f64,
    load_weight: f64,
    efficiency: f64,
) -> SkateBlockSolution {
    balance(
        anchor_a,
        anchor_b,
        carriage_x,
        skyline_tension,
        load_weight,
        efficiency,
        &SkateBlockConfig::default(),
    )
}

/// Solve the skate block with an explicit configuration.
///
/// When the skyline cannot lift the load at any sag the search stops
/// `config.max_sag` below the lower anchor and returns that position.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `config` fails
/// [`SkateBlockConfig::validate`].
///
/// # Examples
/// ```
/// use rigx::{solve_skate_block_with, vec2, SkateBlockConfig};
///
/// let config = SkateBlockConfig { max_iterations: 0, ..SkateBlockConfig::default() };
/// let result = solve_skate_block_with(vec2(-10.0, 0.0), vec2(10.0, 0.0), 0.0, 100.0, 100.0, 1.0, &config);
/// assert!(result.is_err());
/// ```
pub fn solve_skate_block_with(
    anchor_a: Vec2,
    anchor_b: Vec2,
    carriage_x: f64,
    skyline_tension: f64,
    load_weight: f64,
    efficiency: f64,
    config: &SkateBlockConfig,
) -> Result<SkateBlockSolution, ConfigError> {
    config.validate()?;
    Ok(balance(
        anchor_a,
        anchor_b,
        carriage_x,
        skyline_tension,
        load_weight,
        efficiency,
        config,
    ))
}

/// Bracket and bisect the carriage height under a validated configuration.
fn balance(
    anchor_a: Vec2,
    anchor_b: Vec2,
    carriage_x: f64,
    skyline_tension: f64,
    load_weight: f64,
    efficiency: f64,
    config: &SkateBlockConfig,
) -> SkateBlockSolution {
    let legs = Legs {
        anchor_a,
        anchor_b,
        carriage_x,
        tension_a: skyline_tension.max(0.0),
        efficiency: sanitize_efficiency(efficiency),
        load_weight: load_weight.max(0.0),
    };
    let tolerance = config.tolerance * legs.load_weight.max(1.0);

    // Level with the higher anchor neither leg lifts, so the residual starts negative.
    let lowest_anchor = anchor_a.y.max(anchor_b.y);
    let mut lo = anchor_a.y.min(anchor_b.y);
    let mut sag = (anchor_a.x - anchor_b.x).abs().max(1.0).min(config.max_sag);
    let mut hi = lowest_anchor + sag;
    while legs.residual(hi) < 0.0 && sag < config.max_sag {
        lo = hi;
        sag = (sag * 2.0).min(config.max_sag);
        hi = lowest_anchor + sag;
    }

    if legs.residual(hi) < 0.0 {
        warn!(
            skyline_tension,
            load_weight, "Skyline cannot support the load; returning maximum sag"
        );
        return legs.solution(hi, 0);
    }

    let mut carriage_y = hi;
    let mut iterations = 0;
    while iterations < config.max_iterations {
        iterations += 1;
        carriage_y = 0.5 * (lo + hi);
        let residual = legs.residual(carriage_y);
        if residual.abs() <= tolerance {
            break;
        }
        if residual < 0.0 {
            lo = carriage_y;
        } else {
            hi = carriage_y;
        }
    }

    debug!(carriage_y, iterations, "Balanced skate block carriage");
    legs.solution(carriage_y, iterations)
}

/// Fixed inputs of the balance.
#[derive(Clone, Copy, Debug)]
struct Legs {
    /// Skyline anchor.
    anchor_a: Vec2,
    /// Control line anchor.
    anchor_b: Vec2,
    /// Horizontal carriage position.
    carriage_x: f64,
    /// Skyline tension.
    tension_a: f64,
    /// Sheave efficiency, already sanitised.
    efficiency: f64,
    /// Load hanging from the carriage.
    load_weight: f64,
}

impl Legs {
    /// Control line tension and the net pull of both legs at height `y`.
    fn pull(&self, y: f64) -> (f64, Vec2) {
        let carriage = Vec2::new(self.carriage_x, y);
        let toward_a = carriage.direction_to(self.anchor_a);
        let toward_b = carriage.direction_to(self.anchor_b);
        let tension_b = self.control_tension(toward_a, toward_b);
        (tension_b, toward_a * self.tension_a + toward_b * tension_b)
    }

    /// Tension on the B leg that cancels the skyline horizontally.
    ///
    /// A rope only pulls, so a balance that would need a negative tension (or
    /// a vertical B leg) leaves the control line slack.
    fn control_tension(&self, toward_a: Vec2, toward_b: Vec2) -> f64 {
        if toward_b.x.abs() < f64::EPSILON {
            return 0.0;
        }
        let tension = -self.tension_a * toward_a.x / toward_b.x;
        if tension.is_finite() && tension > 0.0 {
            tension
        } else {
            0.0
        }
    }

    /// Upward support minus load.
    fn residual(&self, y: f64) -> f64 {
        -self.pull(y).1.y - self.load_weight
    }

    /// Package the answer for a carriage at height `y`.
    fn solution(&self, y: f64, iterations: usize) -> SkateBlockSolution {
        let (tension_b, pull) = self.pull(y);
        SkateBlockSolution {
            carriage_y: y,
            tension_a: self.tension_a,
            tension_b,
            tension_c: self.efficiency * self.tension_a,
            horizontal_imbalance: pull.x,
            vertical_residual: -pull.y - self.load_weight,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::vec2;

    /// Net force of both legs and the load on the carriage, recomputed from the
    /// reported tensions.
    fn net_force(anchor_a: Vec2, anchor_b: Vec2, x: f64, solution: &SkateBlockSolution) -> Vec2 {
        let carriage = vec2(x, solution.carriage_y);
        carriage.direction_to(anchor_a) * solution.tension_a
            + carriage.direction_to(anchor_b) * solution.tension_b
    }

    #[test]
    fn symmetric_rig_centres_and_balances() {
        let solution = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, 0.0), 0.0, 100.0, 100.0, 1.0);
        assert_relative_eq!(solution.carriage_y, (100.0_f64 / 3.0).sqrt(), epsilon = 1.0e-6);
        assert_relative_eq!(solution.horizontal_imbalance, 0.0, epsilon = 1.0e-9);
        assert!(solution.vertical_residual.abs() <= 1.0e-9 * 100.0);
        assert_eq!(solution.tension_a, 100.0);
        assert_relative_eq!(solution.tension_b, 100.0, epsilon = 1.0e-12);
        assert_eq!(solution.tension_c, 100.0);
    }

    #[test]
    fn off_centre_carriage_balances_both_directions() {
        let (a, b) = (vec2(-10.0, 0.0), vec2(10.0, 0.0));
        let solution = solve_skate_block(a, b, 4.0, 100.0, 100.0, 1.0);
        assert_relative_eq!(solution.horizontal_imbalance, 0.0, epsilon = 1.0e-9);
        assert!(solution.vertical_residual.abs() <= 1.0e-7);
        // The nearer anchor has the steeper, more heavily loaded leg.
        assert!(solution.tension_b > solution.tension_a);
        let net = net_force(a, b, 4.0, &solution);
        assert_relative_eq!(net.x, 0.0, epsilon = 1.0e-9);
        assert_relative_eq!(-net.y, 100.0, epsilon = 1.0e-6);
    }

    #[test]
    fn friction_reduces_tension_past_the_sheave() {
        let (a, b) = (vec2(-10.0, 0.0), vec2(10.0, 0.0));
        for x in [0.0, -6.0, 4.0] {
            let solution = solve_skate_block(a, b, x, 100.0, 100.0, 0.8);
            assert_relative_eq!(solution.tension_c, 80.0, epsilon = 1.0e-12);
            assert_relative_eq!(solution.horizontal_imbalance, 0.0, epsilon = 1.0e-9);
            assert!(solution.vertical_residual.abs() <= 1.0e-7);
        }
    }

    #[test]
    fn uneven_anchors_still_cancel_horizontally() {
        let (a, b) = (vec2(-10.0, 0.0), vec2(10.0, -2.0));
        let solution = solve_skate_block(a, b, 3.0, 200.0, 150.0, 0.9);
        let net = net_force(a, b, 3.0, &solution);
        assert_relative_eq!(net.x, 0.0, epsilon = 1.0e-9);
        assert_relative_eq!(-net.y, 150.0, epsilon = 1.0e-6);
    }

    #[test]
    fn heavier_load_sags_further() {
        let light = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, -2.0), 3.0, 200.0, 50.0, 0.9);
        let heavy = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, -2.0), 3.0, 200.0, 150.0, 0.9);
        assert!(heavy.carriage_y > light.carriage_y);
        assert!(light.carriage_y > 0.0);
    }

    #[test]
    fn carriage_outside_span_leaves_control_line_slack() {
        let solution = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, 0.0), 15.0, 100.0, 50.0, 1.0);
        assert_eq!(solution.tension_b, 0.0);
        assert!(solution.horizontal_imbalance < 0.0);
        assert!(solution.vertical_residual.abs() <= 1.0e-7);
    }

    #[test]
    fn unliftable_load_returns_maximum_sag() {
        let config = SkateBlockConfig {
            max_sag: 1.0e3,
            ..SkateBlockConfig::default()
        };
        let solution = solve_skate_block_with(
            vec2(-10.0, 0.0),
            vec2(10.0, 0.0),
            0.0,
            10.0,
            100.0,
            1.0,
            &config,
        )
        .expect("valid configuration");
        assert_relative_eq!(solution.carriage_y, 1.0e3);
        assert!(solution.vertical_residual < 0.0);
        assert!(solution.carriage_y.is_finite());
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        for config in [
            SkateBlockConfig {
                max_iterations: 0,
                ..SkateBlockConfig::default()
            },
            SkateBlockConfig {
                tolerance: f64::NAN,
                ..SkateBlockConfig::default()
            },
        ] {
            let result = solve_skate_block_with(
                vec2(-10.0, 0.0),
                vec2(10.0, 0.0),
                0.0,
                100.0,
                100.0,
                1.0,
                &config,
            );
            assert!(matches!(result, Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn weightless_load_rests_on_the_chord() {
        let solution = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, 0.0), 2.0, 50.0, 0.0, 1.0);
        assert!(solution.carriage_y.abs() < 1.0e-6);
    }

    #[test]
    fn negative_inputs_are_floored() {
        let solution = solve_skate_block(vec2(-10.0, 0.0), vec2(10.0, 0.0), 0.0, -5.0, -1.0, 1.0);
        assert_eq!(solution.tension_a, 0.0);
        assert_eq!(solution.tension_b, 0.0);
        assert_eq!(solution.tension_c, 0.0);
    }
}
