//! Lifting elementary gates to the full `2^n`-dimensional space.
//!
//! All builders return dense matrices in the big-endian convention of
//! [`crate::index`]: qubit 0 is the most significant tensor factor.
//!
//! The controlled lifter is a single parametrized construction for any
//! number of controls:
//!
//! ```text
//! C(G) = I + |c…c⟩⟨c…c| ⊗ (G - I)
//! ```
//!
//! i.e. the identity on the full space plus a correction term confined to
//! the subspace where every control holds its trigger value.

use std::collections::HashSet;

use ndarray::Array2;
use num_complex::Complex64;

use crate::gate::Gate;
use crate::index::{matches, register_value, with_register_value};
use crate::linalg::{Matrix, identity};

fn check_locs(n: usize, controls: &[usize], targets: &[usize]) {
    assert!(!targets.is_empty(), "at least one target qubit is required");
    let mut seen = HashSet::new();
    for &loc in controls.iter().chain(targets.iter()) {
        assert!(loc < n, "qubit {} is out of range for {} qubits", loc, n);
        assert!(
            seen.insert(loc),
            "qubit {} is addressed more than once (controls {:?}, targets {:?})",
            loc,
            controls,
            targets
        );
    }
}

/// Embed a `2^k`×`2^k` gate acting on qubits `locs` into an `n`-qubit space,
/// with identity on every other qubit. `locs[0]` is the gate's most
/// significant qubit.
///
/// For a single qubit this is `I ⊗ … ⊗ G ⊗ … ⊗ I`.
///
/// # Panics
/// Panics if the gate dimension is not `2^locs.len()`, or if `locs` repeats a
/// qubit or leaves `[0, n)`.
pub fn embed(gate: &Matrix, n: usize, locs: &[usize]) -> Matrix {
    check_locs(n, &[], locs);
    let k = locs.len();
    assert_eq!(
        gate.nrows(),
        1 << k,
        "gate of dimension {} cannot act on {} qubits",
        gate.nrows(),
        k
    );
    assert_eq!(gate.nrows(), gate.ncols(), "gate matrix must be square");

    let dim = 1usize << n;
    let mut full = Array2::zeros((dim, dim));
    for col in 0..dim {
        let local_col = register_value(col, locs, n);
        for local_row in 0..1usize << k {
            let row = with_register_value(col, locs, n, local_row);
            full[[row, col]] = gate[[local_row, local_col]];
        }
    }
    full
}

/// Lift `gate` (on `targets`) to an `n`-qubit space, active when each
/// control qubit equals its entry in `configs` (`true` = |1⟩).
///
/// # Panics
/// Panics on overlapping or out-of-range indices, a `configs` length that
/// differs from `controls`, or a gate whose size is not `2^targets.len()`.
pub fn controlled_with_configs(
    gate: &Matrix,
    n: usize,
    controls: &[usize],
    configs: &[bool],
    targets: &[usize],
) -> Matrix {
    check_locs(n, controls, targets);
    assert_eq!(
        controls.len(),
        configs.len(),
        "control configs ({}) must match controls ({})",
        configs.len(),
        controls.len()
    );

    let delta = gate - &identity(gate.nrows());
    let mut correction = embed(&delta, n, targets);
    for (row, mut values) in correction.rows_mut().into_iter().enumerate() {
        if !matches(row, controls, configs, n) {
            values.fill(Complex64::new(0.0, 0.0));
        }
    }
    correction + identity(1 << n)
}

/// Lift `gate` to act on `target` iff every qubit in `controls` is |1⟩.
///
/// # Example
/// ```
/// use shor_rs::gate::Gate;
/// use shor_rs::lift::controlled;
/// use shor_rs::linalg::{is_unitary, DEFAULT_TOLERANCE};
/// let toffoli = controlled(&Gate::X.matrix(), 3, &[0, 1], 2);
/// assert!(is_unitary(&toffoli, DEFAULT_TOLERANCE));
/// ```
pub fn controlled(gate: &Matrix, n: usize, controls: &[usize], target: usize) -> Matrix {
    controlled_with_configs(gate, n, controls, &vec![true; controls.len()], &[target])
}

/// Multi-controlled NOT.
pub fn controlled_not(n: usize, controls: &[usize], target: usize) -> Matrix {
    controlled(&Gate::X.matrix(), n, controls, target)
}

pub fn cnot(n: usize, control: usize, target: usize) -> Matrix {
    controlled_not(n, &[control], target)
}

pub fn ccnot(n: usize, control0: usize, control1: usize, target: usize) -> Matrix {
    controlled_not(n, &[control0, control1], target)
}

/// Toffoli gate, an alias of [`ccnot`].
pub fn toffoli(n: usize, control0: usize, control1: usize, target: usize) -> Matrix {
    ccnot(n, control0, control1, target)
}

/// Multi-controlled Z.
pub fn controlled_z(n: usize, controls: &[usize], target: usize) -> Matrix {
    controlled(&Gate::Z.matrix(), n, controls, target)
}

pub fn cz(n: usize, control: usize, target: usize) -> Matrix {
    controlled_z(n, &[control], target)
}

/// Multi-controlled R_k = diag(1, e^(2πi/2^k)).
pub fn controlled_r(n: usize, controls: &[usize], target: usize, k: u32) -> Matrix {
    controlled(&Gate::R(k).matrix(), n, controls, target)
}

pub fn cr(n: usize, control: usize, target: usize, k: u32) -> Matrix {
    controlled_r(n, &[control], target, k)
}

/// Swap two arbitrary qubits.
///
/// # Panics
/// Panics if `q0 == q1` or either is out of range.
pub fn swap(n: usize, q0: usize, q1: usize) -> Matrix {
    embed(&Gate::Swap.matrix(), n, &[q0, q1])
}

/// Swap `q0` and `q1` iff every qubit in `controls` is |1⟩.
pub fn controlled_swap(n: usize, controls: &[usize], q0: usize, q1: usize) -> Matrix {
    controlled_with_configs(
        &Gate::Swap.matrix(),
        n,
        controls,
        &vec![true; controls.len()],
        &[q0, q1],
    )
}

/// Fredkin gate: a swap with one control.
pub fn fredkin(n: usize, control: usize, q0: usize, q1: usize) -> Matrix {
    controlled_swap(n, &[control], q0, q1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{DEFAULT_TOLERANCE, approx_eq, kron, kron_all};

    #[test]
    fn test_embed_single_qubit_is_kron() {
        let h = Gate::H.matrix();
        let expected = kron_all(&[identity(2), h.clone(), identity(2)]);
        assert!(approx_eq(&embed(&h, 3, &[1]), &expected, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_embed_reversed_locs_swaps_gate_qubits() {
        // CNOT with control as the gate's second qubit
        let cnot01 = cnot(2, 0, 1);
        let on_reversed = embed(&cnot01, 2, &[1, 0]);
        assert!(approx_eq(&on_reversed, &cnot(2, 1, 0), DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_controlled_closed_form_matches_projector_sum() {
        // |0⟩⟨0| ⊗ I + |1⟩⟨1| ⊗ X
        let mut p0 = Array2::zeros((2, 2));
        p0[[0, 0]] = Complex64::new(1.0, 0.0);
        let mut p1 = Array2::zeros((2, 2));
        p1[[1, 1]] = Complex64::new(1.0, 0.0);
        let expected = kron(&p0, &identity(2)) + kron(&p1, &Gate::X.matrix());
        assert!(approx_eq(&cnot(2, 0, 1), &expected, DEFAULT_TOLERANCE));
    }

    #[test]
    #[should_panic(expected = "addressed more than once")]
    fn test_controlled_rejects_overlap() {
        controlled_not(3, &[0, 2], 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_controlled_rejects_out_of_range() {
        cnot(2, 0, 2);
    }
}
