//! Dense symmetric-matrix helpers.
//!
//! The estimator layer leans on a small set of guarded operations: PSD
//! projection by eigenvalue flooring, condition-number checks, jittered
//! Cholesky factorization, and the spectral radius of (generally
//! non-symmetric) companion matrices.

use nalgebra::{DMatrix, DVector};

/// Returns the symmetric part `(A + Aᵗ) / 2`.
pub fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    (matrix + matrix.transpose()) * 0.5
}

/// Smallest eigenvalue of a symmetric matrix.
///
/// The input is symmetrized first; callers pass covariance-like matrices
/// that may carry small asymmetries from floating-point accumulation.
pub fn min_symmetric_eigenvalue(matrix: &DMatrix<f64>) -> f64 {
    let eig = symmetrize(matrix).symmetric_eigen();
    eig.eigenvalues
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min)
}

/// True when every eigenvalue of the symmetrized input is at least `-tol`.
pub fn is_psd(matrix: &DMatrix<f64>, tol: f64) -> bool {
    min_symmetric_eigenvalue(matrix) >= -tol
}

/// Condition number of a symmetric matrix (ratio of extreme absolute
/// eigenvalues).
///
/// Returns `f64::INFINITY` for a numerically singular input.
pub fn condition_number_sym(matrix: &DMatrix<f64>) -> f64 {
    let eig = symmetrize(matrix).symmetric_eigen();
    let mut max_abs = 0.0f64;
    let mut min_abs = f64::INFINITY;
    for value in eig.eigenvalues.iter() {
        let a = value.abs();
        max_abs = max_abs.max(a);
        min_abs = min_abs.min(a);
    }
    if min_abs <= f64::MIN_POSITIVE {
        f64::INFINITY
    } else {
        max_abs / min_abs
    }
}

/// Projects a symmetric matrix onto the PSD cone by eigenvalue flooring.
///
/// Eigen-decomposes the symmetrized input, floors every eigenvalue at
/// `floor`, and reconstructs. The result is re-symmetrized to clear
/// round-off from the reconstruction product.
pub fn project_psd(matrix: &DMatrix<f64>, floor: f64) -> DMatrix<f64> {
    let eig = symmetrize(matrix).symmetric_eigen();
    let floored = DVector::from_iterator(
        eig.eigenvalues.len(),
        eig.eigenvalues.iter().map(|&v| v.max(floor)),
    );
    let q = &eig.eigenvectors;
    symmetrize(&(q * DMatrix::from_diagonal(&floored) * q.transpose()))
}

/// Lower Cholesky factor of `matrix + jitter·I`, if it exists.
pub fn safe_cholesky(matrix: &DMatrix<f64>, jitter: f64) -> Option<DMatrix<f64>> {
    let n = matrix.nrows();
    let jittered = matrix + DMatrix::<f64>::identity(n, n) * jitter;
    nalgebra::Cholesky::new(jittered).map(|c| c.l())
}

/// Solves `A x = b` for symmetric positive-definite `A` via Cholesky.
pub fn solve_spd(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    nalgebra::Cholesky::new(a.clone()).map(|c| c.solve(b))
}

/// Inverse of a symmetric positive-definite matrix via Cholesky.
pub fn inv_spd(a: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    nalgebra::Cholesky::new(a.clone()).map(|c| c.inverse())
}

/// Spectral radius: the largest eigenvalue modulus of a square matrix.
///
/// Works on general (non-symmetric) matrices; companion matrices of lag
/// polynomials routinely have complex eigenvalue pairs.
pub fn spectral_radius(matrix: &DMatrix<f64>) -> f64 {
    matrix
        .clone_owned()
        .complex_eigenvalues()
        .iter()
        .map(|c| c.norm())
        .fold(0.0f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_symmetrize() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 4.0, 3.0]);
        let s = symmetrize(&m);
        assert_relative_eq!(s[(0, 1)], 3.0, epsilon = 1e-12);
        assert_relative_eq!(s[(1, 0)], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_psd_floors_negative_eigenvalue() {
        // Indefinite: eigenvalues 3 and -1.
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(!is_psd(&m, 1e-9));

        let projected = project_psd(&m, 1e-8);
        assert!(is_psd(&projected, 1e-9));
        assert!(min_symmetric_eigenvalue(&projected) >= 1e-8 - 1e-12);
    }

    #[test]
    fn test_project_psd_leaves_psd_input_unchanged() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let projected = project_psd(&m, 1e-8);
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(projected[(i, j)], m[(i, j)], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_condition_number() {
        let m = DMatrix::from_row_slice(2, 2, &[100.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(condition_number_sym(&m), 100.0, epsilon = 1e-9);

        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(condition_number_sym(&singular) > 1e12);
    }

    #[test]
    fn test_safe_cholesky_identity() {
        let m = DMatrix::<f64>::identity(3, 3);
        let l = safe_cholesky(&m, 0.0).unwrap();
        for i in 0..3 {
            assert_relative_eq!(l[(i, i)], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_safe_cholesky_rejects_indefinite_without_jitter() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(safe_cholesky(&m, 0.0).is_none());
    }

    #[test]
    fn test_solve_and_inverse_spd() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        let x = solve_spd(&a, &b).unwrap();
        let back = &a * &x;
        assert_relative_eq!(back[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(back[1], 2.0, epsilon = 1e-10);

        let inv = inv_spd(&a).unwrap();
        let prod = &a * &inv;
        assert_relative_eq!(prod[(0, 0)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(prod[(0, 1)], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_spectral_radius_diagonal() {
        let m = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, -0.2]);
        assert_relative_eq!(spectral_radius(&m), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_spectral_radius_complex_pair() {
        // Rotation matrix: eigenvalues +/- i, modulus 1.
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        assert_relative_eq!(spectral_radius(&m), 1.0, epsilon = 1e-9);
    }
}
