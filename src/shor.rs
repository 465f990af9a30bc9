//! Shor's factoring algorithm on the state-vector register.
//!
//! [`factorize`] first disposes of inputs with a classical answer (primes,
//! even numbers, perfect powers, bases sharing a factor with `N`). Otherwise
//! it runs order finding once:
//!
//! 1. `t` precision qubits in |0⟩ and `floor(log2 N) + 1` work qubits in |1⟩
//! 2. H on the precision register
//! 3. |x⟩|1⟩ -> |x⟩|a^x mod N⟩
//! 4. inverse QFT on the precision register
//! 5. measure the work register
//!
//! and takes every shot from a clone of that state, turning the measured
//! phase into a period candidate `r` with continued fractions and checking
//! `gcd(a^(r/2) ± 1, N)`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ShorError;
use crate::number::{
    DEFAULT_EPSILON, base_exp, binary_fraction, continued_fraction, convergent, coprime, gcd,
    is_even, is_odd, is_prime, mod_pow,
};
use crate::register::{BasisState, Register};
use crate::random;

/// Largest register the driver will simulate.
pub const MAX_QUBITS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShorConfig {
    /// The number to factor.
    pub modulus: u64,
    /// Base `a`; drawn at random among the coprimes of `N` when absent.
    pub base: Option<u64>,
    /// Number of precision qubits `t`.
    pub precision: usize,
    pub shots: usize,
    /// Seed for base selection and every measurement.
    pub seed: Option<u64>,
    /// Early-termination threshold of the continued-fraction expansion.
    pub epsilon: f64,
}

impl Default for ShorConfig {
    fn default() -> Self {
        ShorConfig {
            modulus: 21,
            base: None,
            precision: 4,
            shots: 10,
            seed: None,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ShorConfig {
    /// # Errors
    /// Returns the first [`ShorError`] the configuration violates.
    pub fn validate(&self) -> Result<(), ShorError> {
        if self.modulus < 2 {
            return Err(ShorError::ModulusTooSmall(self.modulus));
        }
        if let Some(base) = self.base {
            if base < 2 || base >= self.modulus {
                return Err(ShorError::BaseOutOfRange {
                    modulus: self.modulus,
                    base,
                });
            }
        }
        if self.precision == 0 {
            return Err(ShorError::ZeroPrecision);
        }
        if self.shots == 0 {
            return Err(ShorError::ZeroShots);
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(ShorError::InvalidEpsilon(self.epsilon));
        }
        Ok(())
    }

    /// Qubits the quantum run needs: `t + floor(log2 N) + 1`.
    pub fn required_qubits(&self) -> usize {
        self.precision + (u64::BITS - self.modulus.leading_zeros()) as usize
    }
}

/// One measurement of the precision register and its classical follow-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shot {
    pub index: usize,
    /// Measured precision bits, most significant first.
    pub bits: Vec<u8>,
    /// `0.b0 b1 ...` as a binary fraction.
    pub phase: f64,
    pub numerator: u64,
    /// Period candidate `r`, the denominator of the convergent.
    pub period: u64,
    /// `(gcd(a^(r/2) - 1, N), gcd(a^(r/2) + 1, N))`, absent when `r` is odd
    /// or `a^(r/2) ≡ -1 (mod N)`.
    pub candidates: Option<(u64, u64)>,
    /// A non-trivial factor among the candidates.
    pub factor: Option<u64>,
}

/// Register snapshot after one stage of the circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub name: String,
    /// Basis states labelled by (precision, work) register values.
    pub states: Vec<BasisState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantumRun {
    pub modulus: u64,
    pub base: u64,
    pub precision: usize,
    pub stages: Vec<Stage>,
    pub shots: Vec<Shot>,
}

impl QuantumRun {
    /// First non-trivial factor found by any shot.
    pub fn factor(&self) -> Option<u64> {
        self.shots.iter().find_map(|s| s.factor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShorOutcome {
    Prime { modulus: u64 },
    Even { modulus: u64 },
    PerfectPower { modulus: u64, base: u64, exponent: u32 },
    /// The chosen base already shares `factor` with `N`.
    SharedFactor { modulus: u64, base: u64, factor: u64 },
    Quantum(QuantumRun),
}

impl ShorOutcome {
    /// A factor pair `(p, N / p)` with `1 < p < N`, if one was found.
    pub fn factors(&self) -> Option<(u64, u64)> {
        let (modulus, p) = match self {
            ShorOutcome::Prime { .. } => return None,
            ShorOutcome::Even { modulus } => (*modulus, 2),
            ShorOutcome::PerfectPower { modulus, base, .. } => (*modulus, *base),
            ShorOutcome::SharedFactor { modulus, factor, .. } => (*modulus, *factor),
            ShorOutcome::Quantum(run) => (run.modulus, run.factor()?),
        };
        Some((p, modulus / p))
    }
}

/// Factor `config.modulus`.
///
/// # Errors
/// Returns a [`ShorError`] for invalid configurations and for quantum runs
/// wider than [`MAX_QUBITS`].
pub fn factorize(config: &ShorConfig) -> Result<ShorOutcome, ShorError> {
    config.validate()?;
    let n = config.modulus;

    if is_prime(n) {
        info!(modulus = n, "modulus is prime");
        return Ok(ShorOutcome::Prime { modulus: n });
    }
    if is_even(n) {
        info!(modulus = n, "modulus is even");
        return Ok(ShorOutcome::Even { modulus: n });
    }
    if let Some((base, exponent)) = base_exp(n) {
        info!(modulus = n, base, exponent, "modulus is a perfect power");
        return Ok(ShorOutcome::PerfectPower {
            modulus: n,
            base,
            exponent,
        });
    }

    let a = match config.base {
        Some(a) => a,
        None => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            coprime(&mut rng, n).ok_or(ShorError::ModulusTooSmall(n))?
        }
    };

    let shared = gcd(n, a);
    if shared != 1 {
        info!(modulus = n, base = a, factor = shared, "base shares a factor with the modulus");
        return Ok(ShorOutcome::SharedFactor {
            modulus: n,
            base: a,
            factor: shared,
        });
    }

    let required = config.required_qubits();
    if required > MAX_QUBITS {
        return Err(ShorError::TooManyQubits {
            required,
            limit: MAX_QUBITS,
        });
    }

    Ok(ShorOutcome::Quantum(find_order(config, a)))
}

fn find_order(config: &ShorConfig, a: u64) -> QuantumRun {
    let n = config.modulus;
    let t = config.precision;
    info!(
        modulus = n,
        base = a,
        precision = t,
        shots = config.shots,
        seed = ?config.seed,
        "starting order finding"
    );

    let mut register = match config.seed {
        Some(seed) => Register::with_seed(seed),
        None => Register::new(),
    };
    let r0 = register.zeros(t);
    let r1 = register.zeros_for(n);

    let mut stages = Vec::new();
    let mut snapshot = |name: &str, register: &Register| {
        stages.push(Stage {
            name: name.to_string(),
            states: register.states(&[r0.as_slice(), r1.as_slice()]),
        });
    };

    if let Some(&last) = r1.last() {
        register.x(&[last]);
    }
    snapshot("initial state", &register);

    register.h(&r0);
    snapshot("create superposition", &register);

    register.cmod_exp2(a, n, &r0, &r1);
    snapshot("apply controlled-U", &register);

    register.inverse_qft(&r0);
    snapshot("apply inverse QFT", &register);

    let work = register.measure_as_int(&r1);
    debug!(work, "measured work register");
    snapshot("measure reg1", &register);

    let shots = (0..config.shots)
        .map(|i| {
            let mut copy = register.clone();
            match config.seed {
                Some(seed) => copy.reseed(seed.wrapping_add(i as u64 + 1)),
                None => copy.set_random_source(random::entropy()),
            }
            let bits = copy.measure_bits(&r0);
            evaluate(i, bits, a, n, config.epsilon)
        })
        .collect::<Vec<_>>();

    let run = QuantumRun {
        modulus: n,
        base: a,
        precision: t,
        stages,
        shots,
    };
    info!(modulus = n, base = a, factor = ?run.factor(), "order finding finished");
    run
}

fn evaluate(index: usize, bits: Vec<u8>, a: u64, n: u64, eps: f64) -> Shot {
    let phase = binary_fraction(&bits);
    let (numerator, period, _) = convergent(&continued_fraction(phase, eps));

    let mut shot = Shot {
        index,
        bits,
        phase,
        numerator,
        period,
        candidates: None,
        factor: None,
    };

    let x = mod_pow(a, period / 2, n);
    if is_odd(period) || x == n - 1 {
        debug!(index, period, "period candidate rejected");
        return shot;
    }

    let p0 = gcd((x + n - 1) % n, n);
    let p1 = gcd((x + 1) % n, n);
    shot.candidates = Some((p0, p1));
    shot.factor = [p0, p1]
        .into_iter()
        .find(|&p| 1 < p && p < n && n % p == 0);
    debug!(index, period, p0, p1, factor = ?shot.factor, "period candidate checked");
    shot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_configs() {
        let base = ShorConfig::default();
        assert_eq!(base.validate(), Ok(()));

        let small = ShorConfig { modulus: 1, ..base.clone() };
        assert_eq!(small.validate(), Err(ShorError::ModulusTooSmall(1)));

        let bad_base = ShorConfig { base: Some(21), ..base.clone() };
        assert_eq!(
            bad_base.validate(),
            Err(ShorError::BaseOutOfRange { modulus: 21, base: 21 })
        );

        let bad_eps = ShorConfig { epsilon: 0.0, ..base.clone() };
        assert_eq!(bad_eps.validate(), Err(ShorError::InvalidEpsilon(0.0)));

        let no_shots = ShorConfig { shots: 0, ..base };
        assert_eq!(no_shots.validate(), Err(ShorError::ZeroShots));
    }

    #[test]
    fn test_evaluate_quarter_phase() {
        // 0.0100 -> 1/4, 7^2 = 49 = 4 (mod 15), gcd(3, 15) = 3
        let shot = evaluate(0, vec![0, 1, 0, 0], 7, 15, DEFAULT_EPSILON);
        assert_eq!(shot.period, 4);
        assert_eq!(shot.candidates, Some((3, 5)));
        assert_eq!(shot.factor, Some(3));
    }

    #[test]
    fn test_evaluate_zero_phase_is_rejected() {
        let shot = evaluate(0, vec![0, 0, 0, 0], 7, 15, DEFAULT_EPSILON);
        assert_eq!(shot.period, 1);
        assert_eq!(shot.candidates, None);
        assert_eq!(shot.factor, None);
    }

    #[test]
    fn test_evaluate_minus_one_root_is_rejected() {
        // 0.1000 -> 1/2, and 14^1 = -1 (mod 15)
        let shot = evaluate(0, vec![1, 0, 0, 0], 14, 15, DEFAULT_EPSILON);
        assert_eq!(shot.period, 2);
        assert_eq!(shot.candidates, None);
    }

    #[test]
    fn test_required_qubits() {
        let config = ShorConfig { modulus: 15, precision: 4, ..ShorConfig::default() };
        assert_eq!(config.required_qubits(), 8);
    }
}
