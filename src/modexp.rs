//! Controlled modular exponentiation.
//!
//! For a base `a`, modulus `N` and exponent bit `j`, the controlled unitary
//! `CU_j` maps |1⟩|x⟩ to |1⟩|c·x mod N⟩ with `c = a^(2^j) mod N` for every
//! `x < N`, and fixes |0⟩|x⟩ as well as every target value `x >= N`.
//!
//! Multiplication by `c` is a permutation of `[0, N)` when `gcd(a, N) = 1`.
//! The synthesizer walks its cycles, splits each cycle into transpositions,
//! and each transposition into multi-controlled NOTs along a Gray-code path
//! between the two basis states. Every elementary gate flips one target bit
//! and is controlled by the control qubit plus all other target bits, so the
//! folded matrix is an exact permutation.
//!
//! A cycle of length `l` costs `l - 1` transpositions and a transposition at
//! most `2b - 1` gates on a `b`-qubit target register, so a multiplier has at
//! most `(N - 2)(2b - 1)` gates. That is linear in `N` and therefore
//! exponential in `b`. Adder-based multipliers are polynomial in `b` but need
//! about `b + 2` ancillas, more than the register budget leaves.

use tracing::debug;

use crate::circuit::{Circuit, PositionedGate, control_with};
use crate::gate::Gate;
use crate::linalg::Matrix;
use crate::number::{gcd, mod_exp2};

/// Image of every `width`-bit value under multiplication by `c` modulo
/// `modulus`, with values `>= modulus` fixed.
pub fn multiplier_permutation(c: u64, modulus: u64, width: usize) -> Vec<usize> {
    (0..1usize << width)
        .map(|x| {
            if (x as u64) < modulus {
                ((c as u128 * x as u128) % modulus as u128) as usize
            } else {
                x
            }
        })
        .collect()
}

/// Cycles of length at least two of `x -> c·x mod modulus` on
/// `[0, modulus)`, each listed as `x0 -> x1 -> ...`.
fn multiplier_cycles(c: u64, modulus: u64) -> Vec<Vec<usize>> {
    let step = |x: usize| ((c as u128 * x as u128) % modulus as u128) as usize;
    let mut visited = vec![false; modulus as usize];
    let mut out = Vec::new();
    for start in 0..modulus as usize {
        if visited[start] || step(start) == start {
            continue;
        }
        let mut cycle = Vec::new();
        let mut x = start;
        while !visited[x] {
            visited[x] = true;
            cycle.push(x);
            x = step(x);
        }
        out.push(cycle);
    }
    out
}

/// Values visited flipping the differing bits of `u` and `v` from the most
/// significant down, `u` first and `v` last.
fn gray_path(u: usize, v: usize, width: usize) -> Vec<usize> {
    let mut path = vec![u];
    let mut cur = u;
    for bit in (0..width).rev() {
        if (cur ^ v) >> bit & 1 == 1 {
            cur ^= 1 << bit;
            path.push(cur);
        }
    }
    path
}

/// Flip the single bit where `p` and `q` differ, conditioned on `control`
/// and on every other target qubit holding its value in `p`.
fn flip(p: usize, q: usize, control: usize, targets: &[usize]) -> PositionedGate {
    let width = targets.len();
    let diff = p ^ q;
    debug_assert_eq!(diff.count_ones(), 1);

    let mut controls = vec![control];
    let mut configs = vec![true];
    let mut target = control;
    for (i, &t) in targets.iter().enumerate() {
        let bit = width - 1 - i;
        if diff >> bit & 1 == 1 {
            target = t;
        } else {
            controls.push(t);
            configs.push(p >> bit & 1 == 1);
        }
    }
    control_with(controls, configs, vec![target], Gate::X)
}

/// Controlled swap of basis values `u` and `v` of the target register.
fn transposition(u: usize, v: usize, control: usize, targets: &[usize]) -> Vec<PositionedGate> {
    let path = gray_path(u, v, targets.len());
    let m = path.len() - 1;
    let steps: Vec<PositionedGate> = path
        .windows(2)
        .map(|w| flip(w[0], w[1], control, targets))
        .collect();

    let mut gates = steps[..m - 1].to_vec();
    gates.push(steps[m - 1].clone());
    gates.extend(steps[..m - 1].iter().rev().cloned());
    gates
}

/// Circuit of `CU_j` on an `n`-qubit register.
///
/// `targets[0]` is the most significant bit of `x`.
///
/// # Panics
/// Panics if `gcd(a, modulus) != 1`, if the target register cannot hold
/// `modulus - 1`, or if the qubit indices overlap or leave `[0, n)`.
pub fn mod_exp2_circuit(
    n: usize,
    a: u64,
    j: u32,
    modulus: u64,
    control: usize,
    targets: &[usize],
) -> Circuit {
    assert!(modulus >= 2, "modulus must be at least 2, got {}", modulus);
    assert_eq!(
        gcd(a, modulus),
        1,
        "a={} is not coprime to N={}",
        a,
        modulus
    );
    let width = targets.len();
    assert!(
        width < usize::BITS as usize && (1u128 << width) >= modulus as u128,
        "{} target qubits cannot hold values below {}",
        width,
        modulus
    );

    let c = mod_exp2(a, j, modulus);

    let mut gates = Vec::new();
    for cycle in multiplier_cycles(c, modulus) {
        let x0 = cycle[0];
        for &xi in &cycle[1..] {
            gates.extend(transposition(x0, xi, control, targets));
        }
    }

    debug!(
        a,
        j,
        modulus,
        multiplier = c,
        gates = gates.len(),
        "synthesized controlled modular multiplier"
    );

    match Circuit::new(n, gates) {
        Ok(circuit) => circuit,
        Err(e) => panic!(
            "invalid modular exponentiation layout (control {}, targets {:?}, {} qubits): {}",
            control, targets, n, e
        ),
    }
}

/// The `2^n x 2^n` unitary of `CU_j`.
///
/// # Example
/// ```
/// use shor_rs::modexp::controlled_mod_exp2;
/// use shor_rs::linalg::{is_unitary, DEFAULT_TOLERANCE};
/// let u = controlled_mod_exp2(5, 7, 0, 15, 0, &[1, 2, 3, 4]);
/// assert!(is_unitary(&u, DEFAULT_TOLERANCE));
/// ```
pub fn controlled_mod_exp2(
    n: usize,
    a: u64,
    j: u32,
    modulus: u64,
    control: usize,
    targets: &[usize],
) -> Matrix {
    mod_exp2_circuit(n, a, j, modulus, control, targets).unitary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{register_value, with_register_value};
    use crate::linalg::{DEFAULT_TOLERANCE, is_unitary};

    #[test]
    fn test_gray_path_endpoints() {
        let path = gray_path(0b0101, 0b1010, 4);
        assert_eq!(path.first(), Some(&0b0101));
        assert_eq!(path.last(), Some(&0b1010));
        assert_eq!(path.len(), 5);
        for w in path.windows(2) {
            assert_eq!((w[0] ^ w[1]).count_ones(), 1);
        }
    }

    #[test]
    fn test_cycles_of_times_seven_mod_fifteen() {
        let cs = multiplier_cycles(7, 15);
        // 1 -> 7 -> 4 -> 13 -> 1
        assert!(cs.contains(&vec![1, 7, 4, 13]));
        // 0 and 15 are fixed
        assert!(cs.iter().all(|c| !c.contains(&0) && !c.contains(&15)));
    }

    #[test]
    fn test_transposition_swaps_only_pair() {
        let targets = [1, 2, 3];
        let circuit = Circuit::new(4, transposition(0b001, 0b110, 0, &targets)).unwrap();
        let u = circuit.unitary();
        for x in 0..8usize {
            let col = with_register_value(0b1000, &targets, 4, x);
            let row = (0..16).find(|&r| u[[r, col]].norm() > 0.5).unwrap();
            let expected = match x {
                0b001 => 0b110,
                0b110 => 0b001,
                other => other,
            };
            assert_eq!(register_value(row, &targets, 4), expected);
            assert_eq!(row & 0b1000, 0b1000);
        }
    }

    #[test]
    fn test_gate_count_is_linear_in_modulus() {
        for (a, modulus, width) in [(7u64, 15u64, 4usize), (2, 21, 5), (5, 33, 6), (3, 35, 6)] {
            for j in 0..3 {
                let targets: Vec<usize> = (1..=width).collect();
                let circuit = mod_exp2_circuit(width + 1, a, j, modulus, 0, &targets);
                let bound = (modulus as usize - 2) * (2 * width - 1);
                assert!(
                    circuit.len() <= bound,
                    "a={} N={} j={}: {} gates",
                    a,
                    modulus,
                    j,
                    circuit.len()
                );
            }
        }
    }

    #[test]
    fn test_unitary_small() {
        let u = controlled_mod_exp2(5, 2, 1, 15, 0, &[1, 2, 3, 4]);
        assert!(is_unitary(&u, DEFAULT_TOLERANCE));
    }

    #[test]
    #[should_panic(expected = "not coprime")]
    fn test_rejects_shared_factor() {
        mod_exp2_circuit(5, 6, 0, 15, 0, &[1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn test_rejects_narrow_register() {
        mod_exp2_circuit(4, 7, 0, 15, 0, &[1, 2, 3]);
    }
}
