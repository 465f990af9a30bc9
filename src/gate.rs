use ndarray::{Array2, array};
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4, PI};

use crate::linalg::{Matrix, dagger, identity, num_qubits_of};

/// Elementary gates. Every variant is an immutable unitary value acting on
/// one qubit, except `Swap` (two qubits) and `Custom` (any power of two).
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    T,
    /// Phase gate: diag(1, e^(iθ)).
    Phase(f64),
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// R_k = diag(1, e^(2πi/2^k)), the QFT rotation.
    R(u32),
    /// General single-qubit unitary e^(iα) Rz(β) Ry(γ) Rz(δ).
    U {
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
    },
    Swap,
    Custom {
        matrix: Matrix,
        label: String,
    },
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::I => write!(f, "I"),
            Gate::X => write!(f, "X"),
            Gate::Y => write!(f, "Y"),
            Gate::Z => write!(f, "Z"),
            Gate::H => write!(f, "H"),
            Gate::S => write!(f, "S"),
            Gate::T => write!(f, "T"),
            Gate::Swap => write!(f, "SWAP"),
            Gate::Phase(theta) => write!(f, "Phase({:.4})", theta),
            Gate::Rx(theta) => write!(f, "Rx({:.4})", theta),
            Gate::Ry(theta) => write!(f, "Ry({:.4})", theta),
            Gate::Rz(theta) => write!(f, "Rz({:.4})", theta),
            Gate::R(k) => write!(f, "R{}", k),
            Gate::U {
                alpha,
                beta,
                gamma,
                delta,
            } => write!(
                f,
                "U({:.4}, {:.4}, {:.4}, {:.4})",
                alpha, beta, gamma, delta
            ),
            Gate::Custom { label, .. } => write!(f, "{}", label),
        }
    }
}

/// Phase angle `2π / 2^k` of `R_k`, vanishing once `2^-k` underflows.
fn r_angle(k: u32) -> f64 {
    2.0 * PI * 0.5f64.powi(k.min(i32::MAX as u32) as i32)
}

impl Gate {
    /// Wrap an arbitrary matrix as a gate.
    ///
    /// # Panics
    /// Panics if `matrix` is not square with a power-of-two dimension.
    pub fn custom(matrix: Matrix, label: impl Into<String>) -> Self {
        assert_eq!(
            matrix.nrows(),
            matrix.ncols(),
            "Custom gate matrix must be square, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        );
        num_qubits_of(matrix.nrows());
        Gate::Custom {
            matrix,
            label: label.into(),
        }
    }

    /// The unitary matrix of this gate.
    pub fn matrix(&self) -> Matrix {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);

        match self {
            Gate::I => identity(2),
            Gate::X => array![[zero, one], [one, zero]],
            Gate::Y => array![[zero, -i], [i, zero]],
            Gate::Z => array![[one, zero], [zero, -one]],
            Gate::H => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                array![[s, s], [s, -s]]
            }
            Gate::S => array![[one, zero], [zero, i]],
            Gate::T => array![[one, zero], [zero, Complex64::from_polar(1.0, FRAC_PI_4)]],
            Gate::Phase(theta) => array![[one, zero], [zero, Complex64::from_polar(1.0, *theta)]],
            Gate::R(k) => array![[one, zero], [zero, Complex64::from_polar(1.0, r_angle(*k))]],
            Gate::Rx(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let neg_i_sin = Complex64::new(0.0, -(theta / 2.0).sin());
                array![[cos, neg_i_sin], [neg_i_sin, cos]]
            }
            Gate::Ry(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new((theta / 2.0).sin(), 0.0);
                array![[cos, -sin], [sin, cos]]
            }
            Gate::Rz(theta) => array![
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)]
            ],
            Gate::U {
                alpha,
                beta,
                gamma,
                delta,
            } => {
                let global = Complex64::from_polar(1.0, *alpha);
                let m = Gate::Rz(*beta)
                    .matrix()
                    .dot(&Gate::Ry(*gamma).matrix())
                    .dot(&Gate::Rz(*delta).matrix());
                m.mapv(|z| global * z)
            }
            Gate::Swap => {
                // |00>->|00>, |01>->|10>, |10>->|01>, |11>->|11>
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = one;
                m[[1, 2]] = one;
                m[[2, 1]] = one;
                m[[3, 3]] = one;
                m
            }
            Gate::Custom { matrix, .. } => matrix.clone(),
        }
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::Swap => 2,
            Gate::Custom { matrix, .. } => num_qubits_of(matrix.nrows()),
            _ => 1,
        }
    }

    /// Whether the matrix is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        match self {
            Gate::I | Gate::Z | Gate::S | Gate::T | Gate::Phase(_) | Gate::R(_) | Gate::Rz(_) => {
                true
            }
            Gate::Custom { matrix, .. } => matrix
                .indexed_iter()
                .all(|((r, c), z)| r == c || *z == Complex64::new(0.0, 0.0)),
            _ => false,
        }
    }

    /// Adjoint of this gate. For unitaries this is also the inverse.
    pub fn dagger(&self) -> Self {
        match self {
            Gate::I | Gate::H | Gate::X | Gate::Y | Gate::Z | Gate::Swap => self.clone(),
            Gate::S => Gate::Phase(-std::f64::consts::FRAC_PI_2),
            Gate::T => Gate::Phase(-FRAC_PI_4),
            Gate::R(k) => Gate::Phase(-r_angle(*k)),
            Gate::Phase(theta) => Gate::Phase(-theta),
            Gate::Rx(theta) => Gate::Rx(-theta),
            Gate::Ry(theta) => Gate::Ry(-theta),
            Gate::Rz(theta) => Gate::Rz(-theta),
            // (e^(iα) Rz(β) Ry(γ) Rz(δ))† = e^(-iα) Rz(-δ) Ry(-γ) Rz(-β)
            Gate::U {
                alpha,
                beta,
                gamma,
                delta,
            } => Gate::U {
                alpha: -alpha,
                beta: -delta,
                gamma: -gamma,
                delta: -beta,
            },
            Gate::Custom { matrix, label } => Gate::Custom {
                matrix: dagger(matrix),
                label: format!("{}†", label),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{DEFAULT_TOLERANCE, approx_eq};

    #[test]
    fn test_u_dagger_matches_matrix_dagger() {
        let u = Gate::U {
            alpha: 1.0,
            beta: 1.1,
            gamma: 1.2,
            delta: 1.3,
        };
        assert!(approx_eq(
            &u.dagger().matrix(),
            &dagger(&u.matrix()),
            DEFAULT_TOLERANCE
        ));
    }

    #[test]
    fn test_r_gate_matches_phase() {
        for k in 1..6 {
            let theta = 2.0 * PI / (1u64 << k) as f64;
            assert!(approx_eq(
                &Gate::R(k).matrix(),
                &Gate::Phase(theta).matrix(),
                DEFAULT_TOLERANCE
            ));
        }
    }

    #[test]
    fn test_r_gate_for_large_k() {
        assert_eq!(r_angle(64), 2.0 * PI * 0.5f64.powi(64));
        assert!(approx_eq(&Gate::R(200).matrix(), &identity(2), DEFAULT_TOLERANCE));
        assert!(approx_eq(&Gate::R(u32::MAX).matrix(), &identity(2), DEFAULT_TOLERANCE));
        assert!(approx_eq(
            &Gate::R(70).dagger().matrix(),
            &dagger(&Gate::R(70).matrix()),
            DEFAULT_TOLERANCE
        ));
    }

    #[test]
    fn test_custom_diagonal_detection() {
        assert!(Gate::custom(Gate::Z.matrix(), "z").is_diagonal());
        assert!(!Gate::custom(Gate::H.matrix(), "h").is_diagonal());
    }
}
