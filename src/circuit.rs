use std::collections::HashSet;
use std::fmt;

use crate::error::CircuitError;
use crate::gate::Gate;
use crate::instruct::instruct;
use crate::linalg::{Matrix, Vector, identity};

/// A gate placed at specific qubits in a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGate {
    pub gate: Gate,
    pub targets: Vec<usize>,
    pub controls: Vec<usize>,
    /// Trigger value of each control (`true` = |1⟩).
    pub control_configs: Vec<bool>,
}

impl PositionedGate {
    pub fn new(
        gate: Gate,
        targets: Vec<usize>,
        controls: Vec<usize>,
        control_configs: Vec<bool>,
    ) -> Self {
        PositionedGate {
            gate,
            targets,
            controls,
            control_configs,
        }
    }

    /// Returns all locations (controls followed by targets).
    pub fn all_locs(&self) -> Vec<usize> {
        let mut locs = self.controls.clone();
        locs.extend(&self.targets);
        locs
    }

    /// The full-space matrix of this gate in an `n`-qubit register.
    pub fn matrix(&self, n: usize) -> Matrix {
        crate::lift::controlled_with_configs(
            &self.gate.matrix(),
            n,
            &self.controls,
            &self.control_configs,
            &self.targets,
        )
    }

    fn dagger(&self) -> Self {
        PositionedGate {
            gate: self.gate.dagger(),
            ..self.clone()
        }
    }
}

/// A validated sequence of positioned gates on `num_qubits` qubits.
///
/// Gates are applied in order: the circuit's unitary is
/// `G_{m-1} · … · G_1 · G_0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub num_qubits: usize,
    pub gates: Vec<PositionedGate>,
}

impl Circuit {
    /// Creates a new Circuit with validation.
    ///
    /// # Errors
    /// Returns a `CircuitError` if any gate addresses a qubit outside the
    /// register, addresses a qubit twice, has mismatched control configs, or
    /// has a matrix that does not fit its targets.
    pub fn new(num_qubits: usize, gates: Vec<PositionedGate>) -> Result<Self, CircuitError> {
        for pg in &gates {
            if pg.control_configs.len() != pg.controls.len() {
                return Err(CircuitError::ControlConfigLengthMismatch {
                    controls: pg.controls.len(),
                    configs: pg.control_configs.len(),
                });
            }

            for &loc in pg.targets.iter().chain(pg.controls.iter()) {
                if loc >= num_qubits {
                    return Err(CircuitError::LocOutOfRange { loc, num_qubits });
                }
            }

            let mut seen = HashSet::new();
            let overlapping: Vec<usize> = pg
                .all_locs()
                .into_iter()
                .filter(|&loc| !seen.insert(loc))
                .collect();
            if !overlapping.is_empty() {
                return Err(CircuitError::OverlappingLocs { overlapping });
            }

            let expected = 1usize << pg.targets.len();
            let actual = pg.gate.matrix().nrows();
            if pg.targets.is_empty() || actual != expected {
                return Err(CircuitError::MatrixSizeMismatch { expected, actual });
            }
        }

        Ok(Circuit { num_qubits, gates })
    }

    /// An empty circuit (the identity) on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Circuit {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Returns the total Hilbert space dimension.
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append the gates of `other`, which must act on the same register.
    ///
    /// # Panics
    /// Panics if the widths differ.
    pub fn extend(&mut self, other: Circuit) {
        assert_eq!(
            self.num_qubits, other.num_qubits,
            "cannot concatenate circuits on {} and {} qubits",
            self.num_qubits, other.num_qubits
        );
        self.gates.extend(other.gates);
    }

    /// Return the adjoint circuit U†: gates reversed, each daggered.
    pub fn dagger(&self) -> Self {
        Circuit {
            num_qubits: self.num_qubits,
            gates: self.gates.iter().rev().map(PositionedGate::dagger).collect(),
        }
    }

    /// Apply the circuit to an amplitude vector in place.
    ///
    /// # Panics
    /// Panics if `state.len() != 2^num_qubits`.
    pub fn apply_to(&self, state: &mut Vector) {
        assert_eq!(
            state.len(),
            self.dim(),
            "state of length {} does not fit a {}-qubit circuit",
            state.len(),
            self.num_qubits
        );
        for pg in &self.gates {
            instruct(state, self.num_qubits, pg);
        }
    }

    /// The full unitary of the circuit.
    ///
    /// Each column is the image of a basis state under the in-place gate
    /// kernels, so folding costs `O(gates · 4^n)` rather than a dense matrix
    /// product per gate.
    pub fn unitary(&self) -> Matrix {
        let mut m = identity(self.dim());
        for mut column in m.columns_mut() {
            let mut v = column.to_owned();
            self.apply_to(&mut v);
            column.assign(&v);
        }
        m
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nqubits: {}", self.num_qubits)?;
        for pg in &self.gates {
            if pg.controls.is_empty() {
                writeln!(f, "  {} @ q[{}]", pg.gate, format_locs(&pg.targets))?;
            } else {
                let controls: Vec<String> = pg
                    .controls
                    .iter()
                    .zip(pg.control_configs.iter())
                    .map(|(c, &on)| if on { c.to_string() } else { format!("¬{}", c) })
                    .collect();
                writeln!(
                    f,
                    "  C(q[{}]) {} @ q[{}]",
                    controls.join(", "),
                    pg.gate,
                    format_locs(&pg.targets)
                )?;
            }
        }
        Ok(())
    }
}

fn format_locs(locs: &[usize]) -> String {
    locs.iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Place a gate on target qubits (no controls).
///
/// # Example
/// ```
/// use shor_rs::circuit::put;
/// use shor_rs::gate::Gate;
/// let pg = put(vec![0], Gate::H);
/// assert_eq!(pg.targets, vec![0]);
/// assert!(pg.controls.is_empty());
/// ```
pub fn put(targets: Vec<usize>, gate: Gate) -> PositionedGate {
    PositionedGate::new(gate, targets, vec![], vec![])
}

/// Place a controlled gate triggering when every control is |1⟩.
///
/// # Example
/// ```
/// use shor_rs::circuit::control;
/// use shor_rs::gate::Gate;
/// let cnot = control(vec![0], vec![1], Gate::X);
/// assert_eq!(cnot.controls, vec![0]);
/// assert_eq!(cnot.control_configs, vec![true]);
/// ```
pub fn control(controls: Vec<usize>, targets: Vec<usize>, gate: Gate) -> PositionedGate {
    let configs = vec![true; controls.len()];
    PositionedGate::new(gate, targets, controls, configs)
}

/// Place a controlled gate with explicit trigger values per control.
pub fn control_with(
    controls: Vec<usize>,
    configs: Vec<bool>,
    targets: Vec<usize>,
    gate: Gate,
) -> PositionedGate {
    PositionedGate::new(gate, targets, controls, configs)
}
