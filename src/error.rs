//! Error types for recoverable failures.
//!
//! Programmer errors (dimension mismatches, out-of-range qubits, overlapping
//! control/target sets) panic instead; see the `# Panics` sections of the
//! individual functions.

use thiserror::Error;

/// Errors raised by the linear algebra layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// Gaussian elimination found no usable pivot in `column`.
    #[error("matrix is singular (no pivot in column {column})")]
    Singular { column: usize },
}

/// Errors raised when validating a circuit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircuitError {
    /// `control_configs` length does not match `controls` length.
    #[error("control_configs length ({configs}) does not match controls length ({controls})")]
    ControlConfigLengthMismatch { controls: usize, configs: usize },

    /// A qubit index is out of range.
    #[error("qubit {loc} is out of range (num_qubits = {num_qubits})")]
    LocOutOfRange { loc: usize, num_qubits: usize },

    /// A qubit is addressed twice by the same gate.
    #[error("qubits overlap at locations: {overlapping:?}")]
    OverlappingLocs { overlapping: Vec<usize> },

    /// Gate matrix size does not match 2^(number of targets).
    #[error("gate matrix size {actual} does not match 2^targets = {expected}")]
    MatrixSizeMismatch { expected: usize, actual: usize },
}

/// Errors raised by the register.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegisterError {
    /// The amplitude pair handed to `allocate` is not unit-normalized.
    #[error("amplitude pair is not normalized: |z0|^2 + |z1|^2 = {norm_sqr}")]
    NotNormalized { norm_sqr: f64 },

    /// A circuit was run on a register of a different width.
    #[error("circuit acts on {circuit} qubits but the register holds {register}")]
    WidthMismatch { circuit: usize, register: usize },

    /// An observable is not hermitian.
    #[error("observable is not hermitian")]
    NotHermitian,
}

/// Errors raised by the Shor driver for configurations it cannot run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShorError {
    #[error("N={0}. N must be greater than 1")]
    ModulusTooSmall(u64),

    #[error("N={modulus}, a={base}. a must satisfy 1 < a < N")]
    BaseOutOfRange { modulus: u64, base: u64 },

    #[error("precision must be at least one qubit")]
    ZeroPrecision,

    #[error("at least one shot is required")]
    ZeroShots,

    #[error("continued fraction epsilon must lie in (0, 1), got {0}")]
    InvalidEpsilon(f64),

    #[error("run needs {required} qubits, the dense simulator allows at most {limit}")]
    TooManyQubits { required: usize, limit: usize },
}
