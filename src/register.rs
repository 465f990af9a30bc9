//! State-vector register.
//!
//! A [`Register`] owns the joint amplitude vector of every qubit allocated on
//! it. Qubit `k` is the `k`-th allocated qubit and the most significant bit
//! of the basis index among the qubits after it; allocation grows the vector
//! by a tensor product on the right.
//!
//! Gates are applied in place with the kernels of [`crate::instruct`], which
//! is equivalent to lifting the gate with identities on the untouched qubits
//! and left-multiplying the whole vector.

use std::collections::HashSet;
use std::fmt;

use ndarray::array;
use num_complex::Complex64;
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::circuit::{Circuit, PositionedGate, control, put};
use crate::easybuild::{inverse_qft_on, qft_on};
use crate::error::RegisterError;
use crate::gate::Gate;
use crate::index::{bit, register_value};
use crate::instruct::instruct;
use crate::linalg::{DEFAULT_TOLERANCE, Matrix, Vector, inner_product, is_hermitian, kron_vec};
use crate::modexp::mod_exp2_circuit;
use crate::random::{self, RandomSource};

/// Handle to one qubit of the register that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qubit(usize);

impl Qubit {
    /// Position of the qubit in the register's bit order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Positions of `qubits`, in the given order.
pub fn indices(qubits: &[Qubit]) -> Vec<usize> {
    qubits.iter().map(|q| q.0).collect()
}

#[derive(Debug, Clone)]
pub struct Register {
    amplitudes: Vector,
    rng: Box<dyn RandomSource>,
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

impl Register {
    /// An empty register measuring with an entropy-seeded source.
    pub fn new() -> Self {
        Self::with_random_source(random::entropy())
    }

    /// An empty register whose measurements replay for the same seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_random_source(random::seeded(seed))
    }

    pub fn with_random_source(rng: Box<dyn RandomSource>) -> Self {
        Register {
            amplitudes: array![Complex64::new(1.0, 0.0)],
            rng,
        }
    }

    /// Replace the random source, e.g. to give a cloned shot its own stream.
    pub fn set_random_source(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.set_random_source(random::seeded(seed));
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a qubit in the state `z0|0⟩ + z1|1⟩`.
    ///
    /// # Errors
    /// Returns [`RegisterError::NotNormalized`] unless
    /// `|z0|^2 + |z1|^2 = 1` within [`DEFAULT_TOLERANCE`].
    pub fn allocate(&mut self, z0: Complex64, z1: Complex64) -> Result<Qubit, RegisterError> {
        let norm_sqr = z0.norm_sqr() + z1.norm_sqr();
        if (norm_sqr - 1.0).abs() > DEFAULT_TOLERANCE {
            return Err(RegisterError::NotNormalized { norm_sqr });
        }
        Ok(self.push(z0, z1))
    }

    fn push(&mut self, z0: Complex64, z1: Complex64) -> Qubit {
        let index = self.num_qubits();
        self.amplitudes = kron_vec(&self.amplitudes, &array![z0, z1]);
        Qubit(index)
    }

    pub fn zero(&mut self) -> Qubit {
        self.push(Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0))
    }

    pub fn one(&mut self) -> Qubit {
        self.push(Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0))
    }

    pub fn zeros(&mut self, count: usize) -> Vec<Qubit> {
        (0..count).map(|_| self.zero()).collect()
    }

    pub fn ones(&mut self, count: usize) -> Vec<Qubit> {
        (0..count).map(|_| self.one()).collect()
    }

    /// `floor(log2(modulus)) + 1` zero qubits, enough to hold any value
    /// below `modulus`.
    ///
    /// # Panics
    /// Panics if `modulus` is zero.
    pub fn zeros_for(&mut self, modulus: u64) -> Vec<Qubit> {
        assert!(modulus > 0, "modulus must be positive");
        self.zeros((u64::BITS - modulus.leading_zeros()) as usize)
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    pub fn num_qubits(&self) -> usize {
        self.amplitudes.len().trailing_zeros() as usize
    }

    pub fn amplitudes(&self) -> &Vector {
        &self.amplitudes
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Unit norm within `tol`.
    pub fn is_normalized(&self, tol: f64) -> bool {
        (self.probabilities().iter().sum::<f64>() - 1.0).abs() <= tol
    }

    /// `⟨ψ|M|ψ⟩` of a hermitian observable on the whole register.
    ///
    /// # Errors
    /// Returns [`RegisterError::NotHermitian`] if `observable` is not
    /// hermitian within `1e-10`.
    ///
    /// # Panics
    /// Panics if the observable does not match the register dimension.
    pub fn expectation(&self, observable: &Matrix) -> Result<f64, RegisterError> {
        assert_eq!(
            observable.nrows(),
            self.amplitudes.len(),
            "observable of dimension {} on a register of dimension {}",
            observable.nrows(),
            self.amplitudes.len()
        );
        if !is_hermitian(observable, 1e-10) {
            return Err(RegisterError::NotHermitian);
        }
        let image = observable.dot(&self.amplitudes);
        Ok(inner_product(&self.amplitudes, &image).re)
    }

    // =========================================================================
    // Gate application
    // =========================================================================

    fn locs(&self, qubits: &[Qubit]) -> Vec<usize> {
        let n = self.num_qubits();
        let mut seen = HashSet::new();
        for q in qubits {
            assert!(
                q.0 < n,
                "qubit {} is out of range for a register of {} qubits",
                q.0,
                n
            );
            assert!(seen.insert(q.0), "qubit {} is addressed more than once", q.0);
        }
        indices(qubits)
    }

    fn run(&mut self, pg: &PositionedGate) {
        let n = self.num_qubits();
        instruct(&mut self.amplitudes, n, pg);
    }

    /// Apply a `2^k x 2^k` gate to `k` qubits. The gate's most significant
    /// qubit is the addressed qubit with the lowest index, whatever the
    /// order of `qubits`.
    ///
    /// # Panics
    /// Panics if the gate dimension is not `2^qubits.len()`, or if a qubit is
    /// repeated or out of range.
    pub fn apply(&mut self, gate: &Matrix, qubits: &[Qubit]) -> &mut Self {
        let mut locs = self.locs(qubits);
        assert!(!locs.is_empty(), "at least one qubit is required");
        assert!(
            gate.nrows() == 1 << locs.len() && gate.ncols() == gate.nrows(),
            "gate of dimension {:?} cannot act on {} qubits",
            gate.dim(),
            locs.len()
        );
        locs.sort_unstable();
        self.run(&put(locs, Gate::custom(gate.clone(), "U")));
        self
    }

    /// Left-multiply the amplitude vector by a full-register matrix.
    ///
    /// # Panics
    /// Panics if the matrix does not match the register dimension.
    pub fn apply_full(&mut self, unitary: &Matrix) -> &mut Self {
        assert_eq!(
            unitary.dim(),
            (self.amplitudes.len(), self.amplitudes.len()),
            "matrix does not match a register of {} qubits",
            self.num_qubits()
        );
        self.amplitudes = unitary.dot(&self.amplitudes);
        self
    }

    /// Run a circuit on the whole register.
    ///
    /// # Errors
    /// Returns [`RegisterError::WidthMismatch`] if the circuit is built for
    /// a different number of qubits.
    pub fn apply_circuit(&mut self, circuit: &Circuit) -> Result<&mut Self, RegisterError> {
        if circuit.num_qubits != self.num_qubits() {
            return Err(RegisterError::WidthMismatch {
                circuit: circuit.num_qubits,
                register: self.num_qubits(),
            });
        }
        circuit.apply_to(&mut self.amplitudes);
        Ok(self)
    }

    /// Apply a single-qubit gate to each of `qubits`.
    fn each(&mut self, gate: Gate, qubits: &[Qubit]) -> &mut Self {
        for loc in self.locs(qubits) {
            self.run(&put(vec![loc], gate.clone()));
        }
        self
    }

    pub fn i(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::I, qubits)
    }

    pub fn h(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::H, qubits)
    }

    pub fn x(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::X, qubits)
    }

    pub fn y(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::Y, qubits)
    }

    pub fn z(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::Z, qubits)
    }

    pub fn s(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::S, qubits)
    }

    pub fn t(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::T, qubits)
    }

    pub fn u(
        &mut self,
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
        qubits: &[Qubit],
    ) -> &mut Self {
        self.each(
            Gate::U {
                alpha,
                beta,
                gamma,
                delta,
            },
            qubits,
        )
    }

    pub fn rx(&mut self, theta: f64, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::Rx(theta), qubits)
    }

    pub fn ry(&mut self, theta: f64, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::Ry(theta), qubits)
    }

    pub fn rz(&mut self, theta: f64, qubits: &[Qubit]) -> &mut Self {
        self.each(Gate::Rz(theta), qubits)
    }

    /// X on `qubits` iff `condition`, for classically controlled corrections.
    pub fn condition_x(&mut self, condition: bool, qubits: &[Qubit]) -> &mut Self {
        if condition {
            self.x(qubits);
        }
        self
    }

    pub fn condition_z(&mut self, condition: bool, qubits: &[Qubit]) -> &mut Self {
        if condition {
            self.z(qubits);
        }
        self
    }

    fn controlled(&mut self, gate: Gate, controls: &[Qubit], target: Qubit) -> &mut Self {
        let mut all = controls.to_vec();
        all.push(target);
        self.locs(&all);
        self.run(&control(indices(controls), vec![target.0], gate));
        self
    }

    pub fn controlled_not(&mut self, controls: &[Qubit], target: Qubit) -> &mut Self {
        self.controlled(Gate::X, controls, target)
    }

    pub fn cnot(&mut self, control: Qubit, target: Qubit) -> &mut Self {
        self.controlled_not(&[control], target)
    }

    pub fn ccnot(&mut self, control0: Qubit, control1: Qubit, target: Qubit) -> &mut Self {
        self.controlled_not(&[control0, control1], target)
    }

    pub fn toffoli(&mut self, control0: Qubit, control1: Qubit, target: Qubit) -> &mut Self {
        self.ccnot(control0, control1, target)
    }

    pub fn controlled_z(&mut self, controls: &[Qubit], target: Qubit) -> &mut Self {
        self.controlled(Gate::Z, controls, target)
    }

    pub fn cz(&mut self, control: Qubit, target: Qubit) -> &mut Self {
        self.controlled_z(&[control], target)
    }

    pub fn controlled_r(&mut self, controls: &[Qubit], target: Qubit, k: u32) -> &mut Self {
        self.controlled(Gate::R(k), controls, target)
    }

    pub fn cr(&mut self, control: Qubit, target: Qubit, k: u32) -> &mut Self {
        self.controlled_r(&[control], target, k)
    }

    /// Reverse the order of `qubits` by swapping the outermost pairs.
    pub fn swap(&mut self, qubits: &[Qubit]) -> &mut Self {
        self.locs(qubits);
        let l = qubits.len();
        for i in 0..l / 2 {
            self.run(&put(vec![qubits[i].0, qubits[l - 1 - i].0], Gate::Swap));
        }
        self
    }

    /// QFT on `qubits`, `qubits[0]` being the most significant bit.
    pub fn qft(&mut self, qubits: &[Qubit]) -> &mut Self {
        let circuit = qft_on(self.num_qubits(), &self.locs(qubits));
        circuit.apply_to(&mut self.amplitudes);
        self
    }

    pub fn inverse_qft(&mut self, qubits: &[Qubit]) -> &mut Self {
        let circuit = inverse_qft_on(self.num_qubits(), &self.locs(qubits));
        circuit.apply_to(&mut self.amplitudes);
        self
    }

    /// Multiply the target register by `a^(2^j) mod modulus` iff `control`
    /// is |1⟩.
    ///
    /// # Panics
    /// See [`mod_exp2_circuit`].
    pub fn controlled_mod_exp2(
        &mut self,
        a: u64,
        j: u32,
        modulus: u64,
        control: Qubit,
        targets: &[Qubit],
    ) -> &mut Self {
        let mut all = vec![control];
        all.extend_from_slice(targets);
        self.locs(&all);
        let circuit = mod_exp2_circuit(
            self.num_qubits(),
            a,
            j,
            modulus,
            control.0,
            &indices(targets),
        );
        circuit.apply_to(&mut self.amplitudes);
        self
    }

    /// Controlled modular exponentiation |x⟩|y⟩ -> |x⟩|a^x · y mod N⟩,
    /// where `controls` holds `x` most significant bit first.
    pub fn cmod_exp2(
        &mut self,
        a: u64,
        modulus: u64,
        controls: &[Qubit],
        targets: &[Qubit],
    ) -> &mut Self {
        let t = controls.len();
        for (i, &c) in controls.iter().enumerate() {
            self.controlled_mod_exp2(a, (t - 1 - i) as u32, modulus, c, targets);
        }
        self
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Measure one qubit in the computational basis and collapse.
    ///
    /// Draws once from the random source unless the outcome is already
    /// certain. The surviving amplitudes are divided by `sqrt(p_outcome)`.
    ///
    /// # Panics
    /// Panics if the qubit is out of range.
    pub fn measure(&mut self, qubit: Qubit) -> u8 {
        let n = self.num_qubits();
        let loc = self.locs(&[qubit])[0];

        let (mut p0, mut p1) = (0.0, 0.0);
        for (i, amp) in self.amplitudes.iter().enumerate() {
            if bit(i, loc, n) == 0 {
                p0 += amp.norm_sqr();
            } else {
                p1 += amp.norm_sqr();
            }
        }

        let outcome = if p0 == 0.0 {
            1
        } else if p1 == 0.0 {
            0
        } else if self.rng.next_f64() < p0 {
            0
        } else {
            1
        };

        let norm = (if outcome == 0 { p0 } else { p1 }).sqrt();
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if bit(i, loc, n) as u8 == outcome {
                *amp /= norm;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }

        trace!(qubit = loc, p0, outcome, "measured qubit");
        outcome
    }

    /// Measure each of `qubits` in order.
    pub fn measure_bits(&mut self, qubits: &[Qubit]) -> Vec<u8> {
        qubits.iter().map(|&q| self.measure(q)).collect()
    }

    /// Measure every qubit of the register.
    pub fn measure_all(&mut self) -> Vec<u8> {
        let all: Vec<Qubit> = (0..self.num_qubits()).map(Qubit).collect();
        self.measure_bits(&all)
    }

    /// Measure `qubits` and read them as an integer, most significant first.
    pub fn measure_as_int(&mut self, qubits: &[Qubit]) -> usize {
        self.measure_bits(qubits)
            .iter()
            .fold(0, |acc, &b| (acc << 1) | b as usize)
    }

    /// Measure `qubits` and render the outcome as a string of 0s and 1s.
    pub fn binary_string(&mut self, qubits: &[Qubit]) -> String {
        self.measure_bits(qubits)
            .iter()
            .map(|b| if *b == 0 { '0' } else { '1' })
            .collect()
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Non-zero basis states, each labelled by the value of every
    /// sub-register in `registers`. An empty selection labels by the whole
    /// register.
    pub fn states(&self, registers: &[&[Qubit]]) -> Vec<BasisState> {
        let n = self.num_qubits();
        let all: Vec<Qubit> = (0..n).map(Qubit).collect();
        let registers: Vec<&[Qubit]> = if registers.is_empty() {
            vec![all.as_slice()]
        } else {
            registers.to_vec()
        };
        for reg in &registers {
            self.locs(reg);
        }

        let mut out = Vec::new();
        for (i, &a) in self.amplitudes.iter().enumerate() {
            if a == Complex64::new(0.0, 0.0) {
                continue;
            }
            let mut amplitude = a;
            if amplitude.re.abs() < DEFAULT_TOLERANCE {
                amplitude.re = 0.0;
            }
            if amplitude.im.abs() < DEFAULT_TOLERANCE {
                amplitude.im = 0.0;
            }

            let mut index = Vec::with_capacity(registers.len());
            let mut binary = Vec::with_capacity(registers.len());
            for reg in &registers {
                let locs = indices(reg);
                index.push(register_value(i, &locs, n));
                binary.push(
                    locs.iter()
                        .map(|&l| if bit(i, l, n) == 1 { '1' } else { '0' })
                        .collect(),
                );
            }

            out.push(BasisState {
                amplitude,
                probability: a.norm_sqr(),
                index,
                binary,
            });
        }
        out
    }
}

/// One basis state of a register snapshot, labelled per sub-register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasisState {
    #[serde(serialize_with = "serialize_complex")]
    pub amplitude: Complex64,
    pub probability: f64,
    pub index: Vec<usize>,
    pub binary: Vec<String>,
}

fn serialize_complex<S: Serializer>(z: &Complex64, serializer: S) -> Result<S::Ok, S::Error> {
    [z.re, z.im].serialize(serializer)
}

fn signed(x: f64) -> String {
    if x < 0.0 {
        format!("{:.4}", x)
    } else {
        format!(" {:.4}", x.abs())
    }
}

impl fmt::Display for BasisState {
    /// `[0001 0011][  1   3]( 0.2500 0.0000i): 0.0625`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index: Vec<String> = self.index.iter().map(|i| format!("{:>3}", i)).collect();
        write!(
            f,
            "[{}][{}]({}{}i): {:.4}",
            self.binary.join(" "),
            index.join(" "),
            signed(self.amplitude.re),
            signed(self.amplitude.im),
            self.probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lift::embed;
    use crate::linalg::vec_approx_eq;
    use crate::random::Sequence;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_allocate_grows_big_endian() {
        let mut reg = Register::with_seed(0);
        reg.one();
        reg.zero();
        // |10⟩ = index 2
        assert_eq!(reg.amplitudes()[2], c(1.0, 0.0));
        assert_eq!(reg.num_qubits(), 2);
    }

    #[test]
    fn test_allocate_rejects_unnormalized() {
        let mut reg = Register::with_seed(0);
        assert_eq!(
            reg.allocate(c(1.0, 0.0), c(1.0, 0.0)),
            Err(RegisterError::NotNormalized { norm_sqr: 2.0 })
        );
        assert_eq!(reg.num_qubits(), 0);
    }

    #[test]
    fn test_zeros_for_modulus() {
        let mut reg = Register::with_seed(0);
        assert_eq!(reg.zeros_for(15).len(), 4);
        assert_eq!(reg.zeros_for(16).len(), 5);
        assert_eq!(reg.zeros_for(21).len(), 5);
    }

    #[test]
    fn test_apply_matches_lifted_product_in_any_call_order() {
        let cnot = crate::lift::cnot(2, 0, 1);
        let mut reg = Register::with_seed(0);
        let q = reg.zeros(3);
        reg.h(&[q[0], q[2]]);
        let before = reg.amplitudes().clone();

        reg.apply(&cnot, &[q[2], q[0]]);
        let expected = embed(&cnot, 3, &[0, 2]).dot(&before);
        assert!(vec_approx_eq(reg.amplitudes(), &expected, 1e-12));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_foreign_qubit_rejected() {
        let mut big = Register::with_seed(0);
        let q = big.zeros(3);
        let mut small = Register::with_seed(0);
        small.zero();
        small.h(&[q[2]]);
    }

    #[test]
    #[should_panic(expected = "cannot act on")]
    fn test_apply_rejects_wrong_dimension() {
        let mut reg = Register::with_seed(0);
        let q = reg.zeros(2);
        reg.apply(&Gate::H.matrix(), &q);
    }

    #[test]
    fn test_determined_qubit_draws_nothing() {
        let mut reg = Register::with_random_source(Box::new(Sequence::new(vec![])));
        let q0 = reg.one();
        let q1 = reg.zero();
        assert_eq!(reg.measure(q0), 1);
        assert_eq!(reg.measure(q1), 0);
    }

    #[test]
    fn test_measure_uses_threshold() {
        let mut reg = Register::with_random_source(Box::new(Sequence::new(vec![0.49, 0.51])));
        let q = reg.zeros(2);
        reg.h(&q);
        // p0 = 0.5 for both qubits
        assert_eq!(reg.measure(q[0]), 0);
        assert_eq!(reg.measure(q[1]), 1);
        assert!(vec_approx_eq(
            reg.amplitudes(),
            &array![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
            1e-12
        ));
    }

    #[test]
    fn test_expectation_rejects_non_hermitian() {
        let mut reg = Register::with_seed(0);
        reg.zero();
        assert_eq!(reg.expectation(&Gate::S.matrix()), Err(RegisterError::NotHermitian));
        assert_eq!(reg.expectation(&Gate::Z.matrix()), Ok(1.0));
    }

    #[test]
    fn test_basis_state_display() {
        let s = BasisState {
            amplitude: c(0.25, 0.0),
            probability: 0.0625,
            index: vec![1, 3],
            binary: vec!["0001".into(), "0011".into()],
        };
        assert_eq!(s.to_string(), "[0001 0011][  1   3]( 0.2500 0.0000i): 0.0625");
    }

    #[test]
    fn test_basis_state_json() {
        let s = BasisState {
            amplitude: c(0.5, -0.5),
            probability: 0.5,
            index: vec![2],
            binary: vec!["10".into()],
        };
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(
            json,
            r#"{"amplitude":[0.5,-0.5],"probability":0.5,"index":[2],"binary":["10"]}"#
        );
    }
}
