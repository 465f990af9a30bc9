//! Shared test utilities for shor-rs integration tests.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Real-valued matrix from nested rows.
#[allow(dead_code)]
pub fn real_matrix(rows: &[&[f64]]) -> Array2<Complex64> {
    let n = rows.len();
    Array2::from_shape_fn((n, rows[0].len()), |(i, j)| c(rows[i][j], 0.0))
}

/// Diagonal matrix with real entries.
#[allow(dead_code)]
pub fn diag(entries: &[f64]) -> Array2<Complex64> {
    let n = entries.len();
    let mut m = Array2::zeros((n, n));
    for (i, &e) in entries.iter().enumerate() {
        m[[i, i]] = c(e, 0.0);
    }
    m
}

/// Permutation matrix sending basis state `i` to `perm[i]`.
#[allow(dead_code)]
pub fn permutation(perm: &[usize]) -> Array2<Complex64> {
    let n = perm.len();
    let mut m = Array2::zeros((n, n));
    for (col, &row) in perm.iter().enumerate() {
        m[[row, col]] = c(1.0, 0.0);
    }
    m
}

#[allow(dead_code)]
pub fn assert_states_close(a: &Array1<Complex64>, b: &Array1<Complex64>) {
    const ATOL: f64 = 1e-10;
    assert_eq!(
        a.len(),
        b.len(),
        "State vectors have different lengths: {} vs {}",
        a.len(),
        b.len()
    );
    for (i, (av, bv)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (av - bv).norm();
        assert!(
            diff < ATOL,
            "States differ at index {}: {} vs {} (diff={})",
            i,
            av,
            bv,
            diff
        );
    }
}

#[allow(dead_code)]
pub fn assert_matrices_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64, msg: &str) {
    assert_eq!(
        a.dim(),
        b.dim(),
        "{}: matrices have different dimensions",
        msg
    );
    let (rows, cols) = a.dim();
    for i in 0..rows {
        for j in 0..cols {
            let diff = (a[[i, j]] - b[[i, j]]).norm();
            assert!(
                diff < tol,
                "{}: element [{}, {}] differs: {} vs {} (diff={})",
                msg,
                i,
                j,
                a[[i, j]],
                b[[i, j]],
                diff
            );
        }
    }
}
