//! Dense complex linear algebra over `ndarray`.
//!
//! Vectors and matrices are plain `ndarray` arrays of `Complex64`; the
//! functions here add the quantum-specific operations on top: Kronecker
//! products in big-endian order, daggers, traces, Gauss-Jordan inversion and
//! tolerance-based predicates.
//!
//! Shape mismatches are programmer errors and panic. Tolerance checks never
//! panic, they return `false`.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::LinalgError;

/// A complex column vector.
pub type Vector = Array1<Complex64>;

/// A dense complex matrix, row-major.
pub type Matrix = Array2<Complex64>;

/// Default tolerance for entrywise comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-13;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Build a matrix from literal rows.
///
/// # Panics
/// Panics if the rows do not all have the same length.
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use shor_rs::linalg::from_rows;
/// let one = Complex64::new(1.0, 0.0);
/// let zero = Complex64::new(0.0, 0.0);
/// let x = from_rows(&[vec![zero, one], vec![one, zero]]);
/// assert_eq!(x.dim(), (2, 2));
/// ```
pub fn from_rows(rows: &[Vec<Complex64>]) -> Matrix {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(
            row.len(),
            ncols,
            "row {} has {} entries, expected {}",
            i,
            row.len(),
            ncols
        );
    }
    Array2::from_shape_fn((nrows, ncols), |(i, j)| rows[i][j])
}

/// The `dim`×`dim` identity matrix.
pub fn identity(dim: usize) -> Matrix {
    Array2::from_shape_fn((dim, dim), |(i, j)| if i == j { ONE } else { ZERO })
}

/// Whether `n` is a positive power of two.
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Number of qubits spanned by a dimension `dim = 2^n`.
///
/// # Panics
/// Panics if `dim` is not a power of two.
pub fn num_qubits_of(dim: usize) -> usize {
    assert!(
        is_power_of_two(dim),
        "dimension {} is not a power of two",
        dim
    );
    dim.trailing_zeros() as usize
}

/// Kronecker product `a ⊗ b`. The first operand occupies the most
/// significant positions of the product index.
pub fn kron(a: &Matrix, b: &Matrix) -> Matrix {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(i, j)| {
        a[[i / br, j / bc]] * b[[i % br, j % bc]]
    })
}

/// Kronecker product of two vectors: `out[i * b.len() + j] = a[i] * b[j]`.
pub fn kron_vec(a: &Vector, b: &Vector) -> Vector {
    let bl = b.len();
    Array1::from_shape_fn(a.len() * bl, |i| a[i / bl] * b[i % bl])
}

/// Kronecker product of a sequence of matrices, left to right.
///
/// An empty slice yields the 1×1 identity.
pub fn kron_all(factors: &[Matrix]) -> Matrix {
    factors
        .iter()
        .fold(identity(1), |acc, factor| kron(&acc, factor))
}

/// `m ⊗ m ⊗ ... ⊗ m` with `n` factors.
pub fn tensor_power(m: &Matrix, n: usize) -> Matrix {
    (0..n).fold(identity(1), |acc, _| kron(&acc, m))
}

/// Conjugate transpose.
pub fn dagger(m: &Matrix) -> Matrix {
    let (rows, cols) = m.dim();
    Array2::from_shape_fn((cols, rows), |(i, j)| m[[j, i]].conj())
}

/// Sum of the diagonal.
///
/// # Panics
/// Panics if `m` is not square.
pub fn trace(m: &Matrix) -> Complex64 {
    assert_eq!(m.nrows(), m.ncols(), "trace requires a square matrix, got {:?}", m.dim());
    m.diag().iter().sum()
}

/// Matrix inverse by Gauss-Jordan elimination with partial pivoting.
///
/// # Errors
/// Returns [`LinalgError::Singular`] when a pivot column has no entry with
/// magnitude above [`DEFAULT_TOLERANCE`].
///
/// # Panics
/// Panics if `m` is not square.
pub fn inverse(m: &Matrix) -> Result<Matrix, LinalgError> {
    let n = m.nrows();
    assert_eq!(n, m.ncols(), "inverse requires a square matrix, got {:?}", m.dim());

    let mut a = m.clone();
    let mut inv = identity(n);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[[x, col]].norm().total_cmp(&a[[y, col]].norm()))
            .unwrap_or(col);
        if a[[pivot, col]].norm() < DEFAULT_TOLERANCE {
            return Err(LinalgError::Singular { column: col });
        }
        if pivot != col {
            for j in 0..n {
                a.swap([pivot, j], [col, j]);
                inv.swap([pivot, j], [col, j]);
            }
        }

        let p = a[[col, col]];
        for j in 0..n {
            a[[col, j]] /= p;
            inv[[col, j]] /= p;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == ZERO {
                continue;
            }
            for j in 0..n {
                let da = factor * a[[col, j]];
                let di = factor * inv[[col, j]];
                a[[row, j]] -= da;
                inv[[row, j]] -= di;
            }
        }
    }

    Ok(inv)
}

/// Entrywise comparison: every `|a_ij - b_ij|` is at most `tol`.
///
/// Matrices of different shapes are never equal.
pub fn approx_eq(a: &Matrix, b: &Matrix, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol)
}

/// Entrywise comparison of two vectors.
pub fn vec_approx_eq(a: &Vector, b: &Vector, tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol)
}

/// `m · m† ≈ I` within `tol`.
pub fn is_unitary(m: &Matrix, tol: f64) -> bool {
    m.nrows() == m.ncols() && approx_eq(&m.dot(&dagger(m)), &identity(m.nrows()), tol)
}

/// `m ≈ m†` within `tol`.
pub fn is_hermitian(m: &Matrix, tol: f64) -> bool {
    m.nrows() == m.ncols() && approx_eq(m, &dagger(m), tol)
}

/// `⟨a|b⟩`, conjugate-linear in the first argument.
///
/// # Panics
/// Panics if the lengths differ.
pub fn inner_product(a: &Vector, b: &Vector) -> Complex64 {
    assert_eq!(
        a.len(),
        b.len(),
        "inner product of vectors with lengths {} and {}",
        a.len(),
        b.len()
    );
    a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
}

/// `|a⟩⟨b|`.
pub fn outer_product(a: &Vector, b: &Vector) -> Matrix {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j].conj())
}

/// Euclidean norm.
pub fn norm(v: &Vector) -> f64 {
    v.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt()
}

/// Unit norm within `tol`.
pub fn is_unit(v: &Vector, tol: f64) -> bool {
    (norm(v) - 1.0).abs() <= tol
}

/// `⟨a|b⟩ ≈ 0` within `tol`.
pub fn is_orthogonal(a: &Vector, b: &Vector, tol: f64) -> bool {
    inner_product(a, b).norm() <= tol
}

/// Fidelity of two pure states, `|⟨a|b⟩|`.
pub fn fidelity(a: &Vector, b: &Vector) -> f64 {
    inner_product(a, b).norm()
}

/// Trace distance of two pure states, `sqrt(1 - |⟨a|b⟩|^2)`.
pub fn trace_distance(a: &Vector, b: &Vector) -> f64 {
    let f = fidelity(a, b);
    (1.0 - f * f).max(0.0).sqrt()
}
