//! Primitive amplitude operations for state vector simulation.
//!
//! These kernels update an amplitude vector in place, touching only the
//! amplitudes a gate mixes, so one gate costs `O(2^n)` instead of the
//! `O(4^n)` of a dense lifted matrix.

use ndarray::Array2;
use num_complex::Complex64;

use crate::circuit::PositionedGate;
use crate::index::{mask, matches, register_value, with_register_value};
use crate::linalg::Vector;

/// Apply a 2x2 gate to the amplitude pair at indices i and j.
///
/// The gate matrix is [[a, b], [c, d]] and transforms:
/// - new_i = a * state[i] + b * state[j]
/// - new_j = c * state[i] + d * state[j]
///
/// # Example
/// ```
/// use ndarray::array;
/// use num_complex::Complex64;
/// use shor_rs::instruct::u1rows;
///
/// let zero = Complex64::new(0.0, 0.0);
/// let one = Complex64::new(1.0, 0.0);
/// let mut state = array![one, zero];
/// let x_gate = array![[zero, one], [one, zero]];
/// u1rows(&mut state, 0, 1, &x_gate);
/// assert!((state[1].norm() - 1.0).abs() < 1e-10);
/// ```
pub fn u1rows(state: &mut Vector, i: usize, j: usize, gate: &Array2<Complex64>) {
    debug_assert_eq!(gate.dim(), (2, 2));

    let old_i = state[i];
    let old_j = state[j];

    state[i] = gate[[0, 0]] * old_i + gate[[0, 1]] * old_j;
    state[j] = gate[[1, 0]] * old_i + gate[[1, 1]] * old_j;
}

/// Apply a d x d gate to the d amplitudes at `indices`.
///
/// `indices[l]` is the amplitude the gate sees as its local basis state `l`.
pub fn udrows(state: &mut Vector, indices: &[usize], gate: &Array2<Complex64>) {
    let d = indices.len();
    debug_assert_eq!(gate.dim(), (d, d));

    let old_amps: Vec<Complex64> = indices.iter().map(|&idx| state[idx]).collect();

    for (i, &out_idx) in indices.iter().enumerate() {
        let mut new_amp = Complex64::new(0.0, 0.0);
        for (j, &old_amp) in old_amps.iter().enumerate() {
            new_amp += gate[[i, j]] * old_amp;
        }
        state[out_idx] = new_amp;
    }
}

/// Multiply the amplitude at index i by a scalar factor.
pub fn mulrow(state: &mut Vector, i: usize, factor: Complex64) {
    state[i] *= factor;
}

/// Apply a positioned (possibly controlled) gate to an `n`-qubit state.
///
/// Diagonal gates only rescale amplitudes; others mix each group of `2^k`
/// amplitudes that differ in the target qubits, for every basis state where
/// the controls hold their trigger values.
pub fn instruct(state: &mut Vector, n: usize, pg: &PositionedGate) {
    let gate = pg.gate.matrix();
    let k = pg.targets.len();
    debug_assert_eq!(gate.nrows(), 1 << k);
    debug_assert_eq!(state.len(), 1 << n);

    if pg.gate.is_diagonal() {
        let phases = gate.diag().to_vec();
        for i in 0..1usize << n {
            if matches(i, &pg.controls, &pg.control_configs, n) {
                mulrow(state, i, phases[register_value(i, &pg.targets, n)]);
            }
        }
        return;
    }

    let target_mask = pg.targets.iter().fold(0, |m, &t| m | mask(t, n));
    for base in 0..1usize << n {
        if base & target_mask != 0 || !matches(base, &pg.controls, &pg.control_configs, n) {
            continue;
        }
        if k == 1 {
            u1rows(state, base, base | target_mask, &gate);
        } else {
            let indices: Vec<usize> = (0..1usize << k)
                .map(|local| with_register_value(base, &pg.targets, n, local))
                .collect();
            udrows(state, &indices, &gate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{control, put};
    use crate::gate::Gate;
    use ndarray::array;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn basis(n: usize, index: usize) -> Vector {
        let mut v = Vector::zeros(1 << n);
        v[index] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_u1rows_hadamard_on_one() {
        // H|1⟩ = (|0⟩ - |1⟩) / √2
        let mut state = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];
        let s = Complex64::new(FRAC_1_SQRT_2, 0.0);

        u1rows(&mut state, 0, 1, &Gate::H.matrix());

        assert!(approx_eq(state[0], s));
        assert!(approx_eq(state[1], -s));
    }

    #[test]
    fn test_udrows_cyclic_permutation() {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let mut state = array![one, zero, zero];
        // P|k⟩ = |k+1 mod 3⟩
        let perm = array![[zero, zero, one], [one, zero, zero], [zero, one, zero]];

        udrows(&mut state, &[0, 1, 2], &perm);

        assert!(approx_eq(state[0], zero));
        assert!(approx_eq(state[1], one));
        assert!(approx_eq(state[2], zero));
    }

    #[test]
    fn test_instruct_x_on_msb() {
        // X on qubit 0 of |00⟩ gives |10⟩ = index 2
        let mut state = basis(2, 0);
        instruct(&mut state, 2, &put(vec![0], Gate::X));
        assert!(approx_eq(state[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_instruct_cnot_respects_control() {
        let mut off = basis(2, 0b01);
        instruct(&mut off, 2, &control(vec![0], vec![1], Gate::X));
        assert!(approx_eq(off[0b01], Complex64::new(1.0, 0.0)));

        let mut on = basis(2, 0b10);
        instruct(&mut on, 2, &control(vec![0], vec![1], Gate::X));
        assert!(approx_eq(on[0b11], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_instruct_swap_non_adjacent() {
        // SWAP(0, 2) on |100⟩ gives |001⟩
        let mut state = basis(3, 0b100);
        instruct(&mut state, 3, &put(vec![0, 2], Gate::Swap));
        assert!(approx_eq(state[0b001], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_instruct_diagonal_controlled_phase() {
        let mut state = basis(2, 0b11);
        instruct(&mut state, 2, &control(vec![0], vec![1], Gate::Z));
        assert!(approx_eq(state[0b11], Complex64::new(-1.0, 0.0)));

        let mut untouched = basis(2, 0b01);
        instruct(&mut untouched, 2, &control(vec![0], vec![1], Gate::Z));
        assert!(approx_eq(untouched[0b01], Complex64::new(1.0, 0.0)));
    }
}
