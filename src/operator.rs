use std::fmt;

use ndarray::array;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::linalg::{Matrix, identity, kron_all};

/// Single-qubit operator (Pauli basis + projectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    I,  // Identity
    X,  // Pauli X
    Y,  // Pauli Y
    Z,  // Pauli Z
    P0, // |0><0| projector
    P1, // |1><1| projector
}

impl Op {
    /// 2x2 matrix of the operator.
    pub fn matrix(&self) -> Matrix {
        let c = |r: f64, i: f64| Complex64::new(r, i);
        match self {
            Op::I => identity(2),
            Op::X => array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]],
            Op::Y => array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]],
            Op::Z => array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]],
            Op::P0 => array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.0, 0.0)]],
            Op::P1 => array![[c(0.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(1.0, 0.0)]],
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::I => "I",
            Op::X => "X",
            Op::Y => "Y",
            Op::Z => "Z",
            Op::P0 => "P0",
            Op::P1 => "P1",
        };
        write!(f, "{}", s)
    }
}

/// Product of operators on different qubits: Z(0)Z(1)
///
/// Every factor is hermitian and factors on distinct qubits commute, so an
/// operator string is a hermitian observable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorString {
    /// (qubit, operator) pairs, sorted by qubit
    ops: Vec<(usize, Op)>,
}

impl OperatorString {
    /// # Panics
    /// Panics if a qubit carries more than one operator.
    pub fn new(mut ops: Vec<(usize, Op)>) -> Self {
        ops.sort_by_key(|(site, _)| *site);
        for pair in ops.windows(2) {
            assert!(
                pair[0].0 != pair[1].0,
                "qubit {} carries more than one operator",
                pair[0].0
            );
        }
        ops.retain(|(_, op)| *op != Op::I);
        Self { ops }
    }

    pub fn identity() -> Self {
        Self { ops: vec![] }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[(usize, Op)] {
        &self.ops
    }

    /// Full `2^n x 2^n` matrix, identity on unlisted qubits.
    ///
    /// # Panics
    /// Panics if an operator sits on a qubit `>= n`.
    ///
    /// # Example
    /// ```
    /// use shor_rs::operator::{Op, OperatorString};
    /// let zz = OperatorString::new(vec![(0, Op::Z), (1, Op::Z)]).matrix(2);
    /// assert_eq!(zz[[1, 1]].re, -1.0);
    /// ```
    pub fn matrix(&self, n: usize) -> Matrix {
        let mut factors = vec![Op::I; n];
        for &(site, op) in &self.ops {
            assert!(site < n, "operator on qubit {} of a {}-qubit register", site, n);
            factors[site] = op;
        }
        let matrices: Vec<Matrix> = factors.iter().map(Op::matrix).collect();
        kron_all(&matrices)
    }
}

impl fmt::Display for OperatorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "I");
        }
        let parts: Vec<String> = self
            .ops
            .iter()
            .map(|(site, op)| format!("{}({})", op, site))
            .collect();
        write!(f, "{}", parts.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{DEFAULT_TOLERANCE, is_hermitian};

    #[test]
    fn test_identity_ops_are_dropped() {
        let s = OperatorString::new(vec![(2, Op::Z), (0, Op::I), (1, Op::X)]);
        assert_eq!(s.ops(), &[(1, Op::X), (2, Op::Z)]);
        assert_eq!(s.to_string(), "X(1)Z(2)");
    }

    #[test]
    fn test_matrices_are_hermitian() {
        let s = OperatorString::new(vec![(0, Op::Y), (2, Op::P1)]);
        assert!(is_hermitian(&s.matrix(3), DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_projectors_sum_to_identity() {
        let sum = Op::P0.matrix() + Op::P1.matrix();
        assert_eq!(sum, identity(2));
    }

    #[test]
    #[should_panic(expected = "more than one operator")]
    fn test_rejects_duplicate_qubit() {
        OperatorString::new(vec![(0, Op::X), (0, Op::Z)]);
    }
}
