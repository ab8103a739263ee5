//! Assembly of the weighted linear system whose solution is the vector of
//! segment tensions.
//!
//! Columns follow segment order. Force balance rows come first, two per free
//! node in node order, followed by one continuity row per adjacent segment pair
//! of every rope.

use nalgebra::{DMatrix, DVector};

use crate::config::SolverConfig;
use crate::geometry::Vec2;
use crate::least_squares::solve_weighted_with;
use crate::linalg::GaussianSolution;
use crate::rig::Rig;

/// A single weighted equation over the segment tensions.
#[derive(Clone, Debug, PartialEq)]
struct Row {
    /// Sparse coefficients as `(segment column, value)`.
    coefficients: Vec<(usize, f64)>,
    /// Right-hand side.
    rhs: f64,
    /// Least-squares weight.
    weight: f64,
}

/// Dense weighted system `A x ≈ B` for the segment tensions of a rig.
#[derive(Clone, Debug, PartialEq)]
pub struct EquilibriumSystem {
    /// Coefficient matrix, one column per segment.
    pub matrix: DMatrix<f64>,
    /// Right-hand side, one entry per equation.
    pub rhs: DVector<f64>,
    /// Least-squares weight of each equation.
    pub weights: Vec<f64>,
    /// Number of force balance rows at the top of the system.
    pub force_balance_rows: usize,
}

impl EquilibriumSystem {
    /// Assemble the system for `rig` under the given load and efficiency.
    ///
    /// Each free node contributes an x and a y row whose coefficients are the
    /// unit directions toward the far end of every incident segment. Nodes whose
    /// kind carries the load see `load_weight` acting along [`Vec2::DOWN`], which
    /// moves to the right-hand side with its sign flipped. Every adjacent pair
    /// `(prev, next)` along a rope adds `next − efficiency · prev = 0`.
    ///
    /// # Examples
    /// ```
    /// use rigx::{vec2, EquilibriumSystem, Node, NodeKind, Rig, Rope, Segment, SolverConfig};
    ///
    /// let nodes = [
    ///     Node::new("anchor", NodeKind::Anchor, vec2(0.0, 0.0)),
    ///     Node::new("load", NodeKind::Load, vec2(0.0, 10.0)),
    /// ];
    /// let segments = [Segment::new("s1", "anchor", "load")];
    /// let rig = Rig::from_parts(&nodes, &segments, &[Rope::new(["s1"])]).expect("valid rig");
    /// let system = EquilibriumSystem::build(&rig, 100.0, 1.0, &SolverConfig::default());
    /// assert_eq!(system.matrix.shape(), (2, 1));
    /// assert_eq!(system.rhs[1], -100.0);
    /// ```
    #[must_use]
    pub fn build(rig: &Rig, load_weight: f64, efficiency: f64, config: &SolverConfig) -> Self {
        let mut rows = Vec::new();

        for node_index in rig.node_indices() {
            let node = rig.node_at(node_index);
            if !node.kind.is_free() {
                continue;
            }
            let external = external_load(node.kind.carries_load(), load_weight);
            let mut x_row = Row {
                coefficients: Vec::new(),
                rhs: -external.x,
                weight: config.force_balance_weight,
            };
            let mut y_row = Row {
                coefficients: Vec::new(),
                rhs: -external.y,
                weight: config.force_balance_weight,
            };
            for (segment, direction) in rig.incident(node_index) {
                x_row.coefficients.push((segment.index(), direction.x));
                y_row.coefficients.push((segment.index(), direction.y));
            }
            rows.push(x_row);
            rows.push(y_row);
        }
        let force_balance_rows = rows.len();

        for rope in rig.ropes() {
            for pair in rope.windows(2) {
                rows.push(Row {
                    coefficients: vec![(pair[1].index(), 1.0), (pair[0].index(), -efficiency)],
                    rhs: 0.0,
                    weight: config.continuity_weight,
                });
            }
        }

        let columns = rig.segment_count();
        let mut matrix = DMatrix::zeros(rows.len(), columns);
        let mut rhs = DVector::zeros(rows.len());
        let mut weights = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.into_iter().enumerate() {
            for (column, value) in row.coefficients {
                matrix[(row_index, column)] += value;
            }
            rhs[row_index] = row.rhs;
            weights.push(row.weight);
        }

        Self {
            matrix,
            rhs,
            weights,
            force_balance_rows,
        }
    }

    /// Number of unknowns (segments).
    #[must_use]
    pub fn unknowns(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of equations.
    #[must_use]
    pub fn equations(&self) -> usize {
        self.matrix.nrows()
    }

    /// Solve the system in the weighted least-squares sense.
    #[must_use]
    pub fn solve(&self, pivot_tolerance: f64) -> GaussianSolution {
        solve_weighted_with(&self.matrix, &self.rhs, &self.weights, pivot_tolerance)
    }
}

/// External force acting on a node.
pub(crate) fn external_load(carries_load: bool, load_weight: f64) -> Vec2 {
    if carries_load {
        Vec2::DOWN.scale(load_weight)
    } else {
        Vec2::ZERO
    }
}
