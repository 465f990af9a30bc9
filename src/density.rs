//! Density matrices of mixed states.

use ndarray::Array2;
use num_complex::Complex64;

use crate::linalg::{Matrix, Vector, num_qubits_of, outer_product, trace};

/// A mixed state `ρ = Σ p_i |ψ_i⟩⟨ψ_i|` over `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    rho: Matrix,
}

impl DensityMatrix {
    /// The zero operator, ready to accumulate weighted pure states.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        DensityMatrix {
            rho: Array2::zeros((dim, dim)),
        }
    }

    /// `|ψ⟩⟨ψ|`.
    ///
    /// # Panics
    /// Panics if the length of `state` is not a power of two.
    pub fn pure(state: &Vector) -> Self {
        let mut rho = DensityMatrix::new(num_qubits_of(state.len()));
        rho.add(1.0, state);
        rho
    }

    /// Add the pure state `state` with weight `p`.
    ///
    /// # Panics
    /// Panics if `p` lies outside `[0, 1]` or `state` has the wrong length.
    pub fn add(&mut self, p: f64, state: &Vector) -> &mut Self {
        assert!((0.0..=1.0).contains(&p), "weight {} is not a probability", p);
        assert_eq!(
            state.len(),
            self.rho.nrows(),
            "state of length {} in a density matrix of dimension {}",
            state.len(),
            self.rho.nrows()
        );
        let weighted = outer_product(state, state).mapv(|z| z * p);
        self.rho += &weighted;
        self
    }

    pub fn num_qubits(&self) -> usize {
        num_qubits_of(self.rho.nrows())
    }

    pub fn matrix(&self) -> &Matrix {
        &self.rho
    }

    /// `tr(ρ)`, one for a complete mixture.
    pub fn trace(&self) -> Complex64 {
        trace(&self.rho)
    }

    /// `tr(ρ²)`, the purity of the state.
    pub fn squared_trace(&self) -> Complex64 {
        trace(&self.rho.dot(&self.rho))
    }

    /// `tr(ρ M)`.
    ///
    /// # Panics
    /// Panics if `observable` has a different dimension.
    pub fn expectation_value(&self, observable: &Matrix) -> Complex64 {
        assert_eq!(
            observable.dim(),
            self.rho.dim(),
            "observable of shape {:?} on a density matrix of shape {:?}",
            observable.dim(),
            self.rho.dim()
        );
        trace(&self.rho.dot(observable))
    }

    /// Trace out `qubit`, leaving a state on the remaining qubits in their
    /// original order.
    ///
    /// # Panics
    /// Panics if `qubit` is out of range.
    pub fn partial_trace(&self, qubit: usize) -> DensityMatrix {
        let n = self.num_qubits();
        assert!(qubit < n, "qubit {} is out of range for {} qubits", qubit, n);

        let low_bits = n - 1 - qubit;
        let expand = |i: usize, b: usize| {
            let high = i >> low_bits;
            let low = i & ((1 << low_bits) - 1);
            (high << (low_bits + 1)) | (b << low_bits) | low
        };

        let dim = 1usize << (n - 1);
        let rho = Array2::from_shape_fn((dim, dim), |(i, j)| {
            (0..2)
                .map(|b| self.rho[[expand(i, b), expand(j, b)]])
                .sum::<Complex64>()
        });
        DensityMatrix { rho }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;
    use crate::linalg::{DEFAULT_TOLERANCE, approx_eq, identity};
    use ndarray::array;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_mixture_of_basis_states() {
        let mut rho = DensityMatrix::new(1);
        rho.add(0.1, &array![c(1.0), c(0.0)]).add(0.9, &array![c(0.0), c(1.0)]);

        assert!((rho.trace() - c(1.0)).norm() < DEFAULT_TOLERANCE);
        assert!((rho.squared_trace() - c(0.82)).norm() < DEFAULT_TOLERANCE);
        assert!(rho.expectation_value(&Gate::X.matrix()).norm() < DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_mixture_with_plus_state() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let mut rho = DensityMatrix::new(1);
        rho.add(0.1, &array![c(1.0), c(0.0)]).add(0.9, &array![c(s), c(s)]);

        assert!((rho.trace() - c(1.0)).norm() < DEFAULT_TOLERANCE);
        assert!((rho.squared_trace() - c(0.91)).norm() < DEFAULT_TOLERANCE);
        assert!((rho.expectation_value(&Gate::X.matrix()) - c(0.9)).norm() < DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_partial_trace_of_bell_pair_is_maximally_mixed() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let bell = array![c(s), c(0.0), c(0.0), c(s)];
        let rho = DensityMatrix::pure(&bell);
        for q in 0..2 {
            let reduced = rho.partial_trace(q);
            assert_eq!(reduced.num_qubits(), 1);
            assert!(approx_eq(reduced.matrix(), &identity(2).mapv(|z| z * 0.5), 1e-12));
        }
    }

    #[test]
    fn test_partial_trace_keeps_remaining_order() {
        // |0⟩ ⊗ |1⟩ ⊗ |+⟩, trace out the middle qubit: |0⟩⟨0| ⊗ |+⟩⟨+|
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let mut psi = Vector::zeros(8);
        psi[0b010] = c(s);
        psi[0b011] = c(s);
        let reduced = DensityMatrix::pure(&psi).partial_trace(1);
        let expected = DensityMatrix::pure(&array![c(s), c(s), c(0.0), c(0.0)]);
        assert!(approx_eq(reduced.matrix(), expected.matrix(), 1e-12));
    }
}
