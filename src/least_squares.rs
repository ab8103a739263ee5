//! Weighted least-squares solve through the normal equations.

use nalgebra::{DMatrix, DVector};

use crate::linalg::{
    multiply_matrices, multiply_matrix_vector, solve_gaussian_with, transpose, GaussianSolution,
    DEFAULT_PIVOT_TOLERANCE,
};

/// Solve `a · x ≈ b` in the weighted least-squares sense with the default pivot
/// tolerance.
///
/// See [`solve_weighted_with`].
#[must_use]
pub fn solve_weighted(a: &DMatrix<f64>, b: &DVector<f64>, weights: &[f64]) -> GaussianSolution {
    solve_weighted_with(a, b, weights, DEFAULT_PIVOT_TOLERANCE)
}

/// Solve `a · x ≈ b` in the weighted least-squares sense.
///
/// Row `i` of `a` and entry `i` of `b` are multiplied by `weights[i]` itself, not
/// its square root, so a weight acts quadratically in the normal equations
/// `(WA)ᵀ(WA) x = (WA)ᵀ(WB)`. A system without unknowns returns immediately.
///
/// # Panics
///
/// Panics when `weights` or `b` do not have one entry per row of `a`.
///
/// # Examples
/// ```
/// use nalgebra::{DMatrix, DVector};
/// use rigx::least_squares::solve_weighted;
///
/// // Two conflicting measurements of one unknown; the heavier one wins.
/// let a = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
/// let b = DVector::from_vec(vec![0.0, 10.0]);
/// let x = solve_weighted(&a, &b, &[1.0, 1000.0]).solution;
/// assert!((x[0] - 10.0).abs() < 1.0e-4);
/// ```
#[must_use]
pub fn solve_weighted_with(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    weights: &[f64],
    pivot_tolerance: f64,
) -> GaussianSolution {
    if a.ncols() == 0 {
        return GaussianSolution::empty();
    }
    assert_eq!(a.nrows(), weights.len(), "one weight per equation is required");
    assert_eq!(a.nrows(), b.len(), "one right-hand side entry per equation is required");

    let mut weighted_a = a.clone();
    let mut weighted_b = b.clone();
    for (row, &weight) in weights.iter().enumerate() {
        weighted_a.row_mut(row).scale_mut(weight);
        weighted_b[row] *= weight;
    }

    let weighted_a_t = transpose(&weighted_a);
    let normal_matrix = multiply_matrices(&weighted_a_t, &weighted_a);
    let normal_rhs = multiply_matrix_vector(&weighted_a_t, &weighted_b);
    solve_gaussian_with(&normal_matrix, &normal_rhs, pivot_tolerance)
}
