//! Dense linear algebra kernel.
//!
//! Matrices are owned, contiguous [`DMatrix`] buffers. The Gaussian eliminator is
//! deliberately lenient: rank-deficient systems produce a best-effort solution
//! rather than an error, with zeros along unconstrained directions.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Pivots smaller than this magnitude are treated as zero.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1.0e-10;

/// Solution of a square linear system together with elimination diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianSolution {
    /// Solved unknowns; entries along singular directions are zero.
    pub solution: DVector<f64>,
    /// Number of columns whose pivot fell below the tolerance.
    pub skipped_pivots: usize,
}

impl GaussianSolution {
    /// An empty solution for a system with no unknowns.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            solution: DVector::zeros(0),
            skipped_pivots: 0,
        }
    }

    /// Whether elimination met at least one near-zero pivot.
    #[must_use]
    pub fn is_rank_deficient(&self) -> bool {
        self.skipped_pivots > 0
    }
}

/// Return the transpose of `m`.
#[must_use]
pub fn transpose(m: &DMatrix<f64>) -> DMatrix<f64> {
    m.transpose()
}

/// Multiply two conforming matrices.
///
/// # Panics
///
/// Panics when `a.ncols() != b.nrows()`; conformance is a caller precondition.
#[must_use]
pub fn multiply_matrices(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    assert_eq!(
        a.ncols(),
        b.nrows(),
        "matrix product requires a.ncols() == b.nrows()"
    );
    a * b
}

/// Multiply a matrix by a conforming vector.
///
/// # Panics
///
/// Panics when `m.ncols() != v.len()`.
#[must_use]
pub fn multiply_matrix_vector(m: &DMatrix<f64>, v: &DVector<f64>) -> DVector<f64> {
    assert_eq!(
        m.ncols(),
        v.len(),
        "matrix-vector product requires m.ncols() == v.len()"
    );
    m * v
}

/// Solve the square system `a · x = b` with the default pivot tolerance.
///
/// # Examples
/// ```
/// use nalgebra::{DMatrix, DVector};
/// use rigx::linalg::solve_gaussian;
///
/// let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
/// let b = DVector::from_vec(vec![3.0, 5.0]);
/// let x = solve_gaussian(&a, &b);
/// assert!((x[0] - 0.8).abs() < 1.0e-12);
/// assert!((x[1] - 1.4).abs() < 1.0e-12);
/// ```
#[must_use]
pub fn solve_gaussian(a: &DMatrix<f64>, b: &DVector<f64>) -> DVector<f64> {
    solve_gaussian_with(a, b, DEFAULT_PIVOT_TOLERANCE).solution
}

/// Solve the square system `a · x = b` by Gaussian elimination with partial
/// pivoting.
///
/// A column whose best pivot is below `pivot_tolerance` is left uneliminated and
/// counted in [`GaussianSolution::skipped_pivots`]; back substitution writes zero
/// for any near-zero diagonal entry. Singular input never fails.
///
/// # Panics
///
/// Panics when `a` is not square or `b` does not match its dimension.
#[must_use]
pub fn solve_gaussian_with(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    pivot_tolerance: f64,
) -> GaussianSolution {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "gaussian elimination requires a square matrix");
    assert_eq!(n, b.len(), "right-hand side length must match the matrix");

    let mut m = a.clone();
    let mut rhs = b.clone();
    let mut skipped_pivots = 0;

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_magnitude = m[(col, col)].abs();
        for row in (col + 1)..n {
            let candidate = m[(row, col)].abs();
            if candidate > pivot_magnitude {
                pivot_row = row;
                pivot_magnitude = candidate;
            }
        }

        if pivot_magnitude < pivot_tolerance {
            skipped_pivots += 1;
            continue;
        }

        if pivot_row != col {
            m.swap_rows(col, pivot_row);
            rhs.swap_rows(col, pivot_row);
        }

        let pivot = m[(col, col)];
        for row in (col + 1)..n {
            let factor = m[(row, col)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let upper = m[(col, k)];
                m[(row, k)] -= factor * upper;
            }
            let upper_rhs = rhs[col];
            rhs[row] -= factor * upper_rhs;
        }
    }

    let mut solution = DVector::zeros(n);
    for row in (0..n).rev() {
        let diagonal = m[(row, row)];
        if diagonal.abs() < pivot_tolerance {
            solution[row] = 0.0;
            continue;
        }
        let mut sum = rhs[row];
        for k in (row + 1)..n {
            sum -= m[(row, k)] * solution[k];
        }
        solution[row] = sum / diagonal;
    }

    if skipped_pivots > 0 {
        debug!(
            unknowns = n,
            skipped_pivots, "Gaussian elimination met a rank-deficient system"
        );
    }

    GaussianSolution {
        solution,
        skipped_pivots,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn transpose_swaps_dimensions() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = transpose(&m);
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t[(2, 1)], 6.0);
        assert_eq!(t[(0, 1)], 4.0);
    }

    #[test]
    fn products_match_hand_calculation() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = DMatrix::from_row_slice(2, 1, &[5.0, 6.0]);
        let product = multiply_matrices(&a, &b);
        assert_eq!(product[(0, 0)], 17.0);
        assert_eq!(product[(1, 0)], 39.0);

        let v = DVector::from_vec(vec![1.0, -1.0]);
        let mv = multiply_matrix_vector(&a, &v);
        assert_eq!(mv, DVector::from_vec(vec![-1.0, -1.0]));
    }

    #[test]
    #[should_panic(expected = "a.ncols() == b.nrows()")]
    fn nonconforming_product_panics() {
        let a = DMatrix::<f64>::zeros(2, 3);
        let b = DMatrix::<f64>::zeros(2, 2);
        let _ = multiply_matrices(&a, &b);
    }

    #[test]
    fn partial_pivoting_handles_zero_leading_entry() {
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let expected = DVector::from_vec(vec![1.0, -2.0, 3.0]);
        let b = &a * &expected;
        let result = solve_gaussian_with(&a, &b, DEFAULT_PIVOT_TOLERANCE);
        assert_eq!(result.skipped_pivots, 0);
        for (solved, wanted) in result.solution.iter().zip(expected.iter()) {
            assert_relative_eq!(*solved, *wanted, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn singular_system_degrades_without_nan() {
        // Second column is a multiple of the first.
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![3.0, 6.0]);
        let result = solve_gaussian_with(&a, &b, DEFAULT_PIVOT_TOLERANCE);
        assert!(result.is_rank_deficient());
        assert!(result.solution.iter().all(|value| value.is_finite()));
        assert_eq!(result.solution[1], 0.0);
        assert_relative_eq!(result.solution[0], 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn all_zero_system_returns_zeros() {
        let a = DMatrix::<f64>::zeros(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let result = solve_gaussian_with(&a, &b, DEFAULT_PIVOT_TOLERANCE);
        assert_eq!(result.skipped_pivots, 3);
        assert_eq!(result.solution, DVector::zeros(3));
    }

    #[test]
    fn empty_system_is_empty() {
        let a = DMatrix::<f64>::zeros(0, 0);
        let b = DVector::<f64>::zeros(0);
        assert_eq!(solve_gaussian(&a, &b).len(), 0);
    }
}
