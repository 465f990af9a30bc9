use crate::circuit::{Circuit, PositionedGate, control, put};
use crate::gate::Gate;
use crate::linalg::Matrix;

// =============================================================================
// Fourier Transform
// =============================================================================

/// QFT on the qubits `locs` of an `n`-qubit register, `locs[0]` being the
/// most significant bit of the transformed value.
///
/// For each position i: H, then for every later position j a controlled
/// R_(j-i+1) with control `locs[j]` and target `locs[i]`. Finally SWAP pairs
/// reverse the bit order, so the circuit maps |x⟩ to Σ_y ω^(xy) |y⟩ / √2^k.
///
/// # Panics
/// Panics if `locs` repeats a qubit or leaves `[0, n)`.
pub fn qft_on(n: usize, locs: &[usize]) -> Circuit {
    let k = locs.len();
    let mut gates: Vec<PositionedGate> = Vec::new();

    for i in 0..k {
        gates.push(put(vec![locs[i]], Gate::H));
        for j in (i + 1)..k {
            gates.push(control(vec![locs[j]], vec![locs[i]], Gate::R((j - i + 1) as u32)));
        }
    }

    for i in 0..(k / 2) {
        gates.push(put(vec![locs[i], locs[k - 1 - i]], Gate::Swap));
    }

    match Circuit::new(n, gates) {
        Ok(circuit) => circuit,
        Err(e) => panic!("invalid QFT locations {:?} on {} qubits: {}", locs, n, e),
    }
}

/// Inverse QFT on the qubits `locs` of an `n`-qubit register.
pub fn inverse_qft_on(n: usize, locs: &[usize]) -> Circuit {
    qft_on(n, locs).dagger()
}

/// Build an n-qubit QFT circuit.
pub fn qft_circuit(n: usize) -> Circuit {
    qft_on(n, &(0..n).collect::<Vec<_>>())
}

/// Build an n-qubit inverse QFT circuit.
pub fn inverse_qft_circuit(n: usize) -> Circuit {
    qft_circuit(n).dagger()
}

/// The 2^n x 2^n QFT matrix.
///
/// # Example
/// ```
/// use shor_rs::easybuild::qft;
/// use shor_rs::linalg::{is_unitary, DEFAULT_TOLERANCE};
/// assert!(is_unitary(&qft(3), 1e-12));
/// ```
pub fn qft(n: usize) -> Matrix {
    qft_circuit(n).unitary()
}

/// The inverse QFT matrix, `qft(n)†`.
pub fn inverse_qft(n: usize) -> Matrix {
    inverse_qft_circuit(n).unitary()
}

// =============================================================================
// Small Circuits
// =============================================================================

/// H on qubit 0 followed by CNOT(0, 1): |00⟩ -> (|00⟩ + |11⟩) / √2.
pub fn bell_circuit() -> Circuit {
    Circuit {
        num_qubits: 2,
        gates: vec![put(vec![0], Gate::H), control(vec![0], vec![1], Gate::X)],
    }
}

/// Phase estimation circuit. n_reg + n_b qubits.
///
/// Structure:
/// - H on register qubits 0..n_reg
/// - For i in 0..n_reg: controlled-U^(2^(n_reg-1-i)) with control=qubit i,
///   targets=n_reg..n_reg+n_b
/// - Inverse QFT on register
///
/// With the target prepared in an eigenstate of eigenvalue e^(2πiφ), the
/// register reads φ·2^n_reg most significant bit first.
///
/// # Panics
/// Panics if `unitary` is not `2^n_b` square.
pub fn phase_estimation_circuit(unitary: &Matrix, n_reg: usize, n_b: usize) -> Circuit {
    assert_eq!(
        unitary.nrows(),
        1 << n_b,
        "unitary of dimension {} cannot act on {} qubits",
        unitary.nrows(),
        n_b
    );
    let n_total = n_reg + n_b;
    let register: Vec<usize> = (0..n_reg).collect();
    let target_locs: Vec<usize> = (n_reg..n_total).collect();

    let mut gates: Vec<PositionedGate> = register.iter().map(|&i| put(vec![i], Gate::H)).collect();

    // U^(2^p) by repeated squaring, least significant register qubit first
    let mut power = unitary.clone();
    for p in 0..n_reg {
        let gate = Gate::custom(power.clone(), format!("U^{}", 1u64 << p));
        gates.push(control(vec![n_reg - 1 - p], target_locs.clone(), gate));
        power = power.dot(&power);
    }

    let mut circuit = Circuit {
        num_qubits: n_total,
        gates,
    };
    circuit.extend(inverse_qft_on(n_total, &register));
    circuit
}
