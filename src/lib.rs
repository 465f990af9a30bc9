pub mod error;
pub mod linalg;
pub mod index;
pub mod gate;
pub mod lift;
pub mod circuit;
pub mod instruct;
pub mod easybuild;
pub mod modexp;
pub mod random;
pub mod register;
pub mod operator;
pub mod density;
pub mod number;
pub mod shor;

pub use gate::Gate;
pub use circuit::{Circuit, PositionedGate, put, control, control_with};
pub use error::{CircuitError, LinalgError, RegisterError, ShorError};
pub use linalg::{Matrix, Vector};
pub use register::{BasisState, Qubit, Register};
pub use density::DensityMatrix;
pub use operator::{Op, OperatorString};
pub use shor::{ShorConfig, ShorOutcome, factorize};
