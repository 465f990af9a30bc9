//! Classical number theory: period extraction from measured phases and the
//! integer helpers the factoring driver uses to dispose of easy inputs.

use rand::Rng;
use tracing::debug;

/// Default early-termination threshold of [`continued_fraction`].
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// 2^64, the first float past every `u64`.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Miller-Rabin witnesses that decide primality for every `u64`.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Interpret `bits` (most significant first) as the binary fraction
/// `0.b0 b1 b2 ...` = Σ b_i · 2^-(i+1).
///
/// # Panics
/// Panics if any entry is not 0 or 1.
///
/// # Example
/// ```
/// use shor_rs::number::binary_fraction;
/// assert_eq!(binary_fraction(&[1, 0, 1]), 0.625);
/// ```
pub fn binary_fraction(bits: &[u8]) -> f64 {
    let mut d = 0.0;
    for (i, &b) in bits.iter().enumerate() {
        assert!(b <= 1, "invalid bit {} in {:?}", b, bits);
        if b == 1 {
            d += 0.5f64.powi(i as i32 + 1);
        }
    }
    d
}

/// Running convergents `h/k` of a continued fraction, by the forward
/// recurrence `h_n = q_n·h_{n-1} + h_{n-2}`.
#[derive(Debug, Clone, Copy)]
struct Convergents {
    h: (u64, u64),
    k: (u64, u64),
}

impl Convergents {
    fn new() -> Self {
        Self { h: (1, 0), k: (0, 1) }
    }

    /// Append quotient `q`. Returns `false`, leaving the state untouched,
    /// when the next numerator or denominator overflows `u64`.
    fn push(&mut self, q: u64) -> bool {
        let next = |(cur, prev): (u64, u64)| q.checked_mul(cur)?.checked_add(prev);
        match (next(self.h), next(self.k)) {
            (Some(h), Some(k)) => {
                self.h = (h, self.h.0);
                self.k = (k, self.k.0);
                true
            }
            _ => false,
        }
    }

    fn value(&self) -> f64 {
        self.h.0 as f64 / self.k.0 as f64
    }
}

/// Partial quotients of `f`.
///
/// Takes the integer part as the next quotient and continues with the
/// reciprocal of the remainder until the remainder drops below `eps`.
/// Inputs below `eps` expand to `[0]`.
///
/// The expansion also stops once the convergent reproduces `f` to machine
/// precision, or when the next convergent would overflow `u64`, so it
/// terminates for any positive `eps`.
///
/// # Panics
/// Panics if `f` is negative, not finite or at least 2^64, or if `eps` is
/// not positive.
///
/// # Example
/// ```
/// use shor_rs::number::{continued_fraction, DEFAULT_EPSILON};
/// assert_eq!(continued_fraction(0.8125, DEFAULT_EPSILON), vec![0, 1, 4, 3]);
/// ```
pub fn continued_fraction(f: f64, eps: f64) -> Vec<u64> {
    assert!(
        f.is_finite() && f >= 0.0 && f < U64_BOUND,
        "cannot expand {}",
        f
    );
    assert!(eps > 0.0, "epsilon must be positive, got {}", eps);

    if f < eps {
        return vec![0];
    }

    let resolution = f64::EPSILON * f.max(1.0);
    let mut convergents = Convergents::new();
    let mut list = Vec::new();
    let mut r = f;
    loop {
        let t = r.trunc();
        if t >= U64_BOUND {
            break;
        }
        let q = t as u64;
        if !convergents.push(q) {
            break;
        }
        list.push(q);

        let diff = r - t;
        if diff < eps || (convergents.value() - f).abs() <= resolution {
            break;
        }
        r = 1.0 / diff;
    }
    list
}

/// The rational value `(numerator, denominator, numerator / denominator)`
/// of a continued fraction.
///
/// Expansions whose full convergent overflows `u64` evaluate to the last
/// convergent that fits.
///
/// # Panics
/// Panics on an empty expansion.
pub fn convergent(cf: &[u64]) -> (u64, u64, f64) {
    assert!(!cf.is_empty(), "empty continued fraction");

    let mut convergents = Convergents::new();
    for (i, &q) in cf.iter().enumerate() {
        if !convergents.push(q) {
            debug!(kept = i, len = cf.len(), "convergent truncated on overflow");
            break;
        }
    }

    let (s, r) = (convergents.h.0, convergents.k.0);
    (s, r, convergents.value())
}

/// Floating-point value of a continued fraction.
///
/// # Panics
/// Panics on an empty expansion.
pub fn approximated_continued_fraction(cf: &[u64]) -> f64 {
    let Some((last, rest)) = cf.split_last() else {
        panic!("empty continued fraction");
    };
    rest.iter()
        .rev()
        .fold(*last as f64, |f, &q| q as f64 + 1.0 / f)
}

/// Greatest common divisor.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Primality by deterministic Miller-Rabin.
///
/// # Example
/// ```
/// use shor_rs::number::is_prime;
/// assert!(is_prime(18_446_744_073_709_551_557));
/// assert!(!is_prime(561));
/// ```
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0;
    while is_even(d) {
        d /= 2;
        s += 1;
    }

    'witness: for &a in &WITNESSES {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mod_pow(x, 2, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

pub fn is_even(n: u64) -> bool {
    n % 2 == 0
}

pub fn is_odd(n: u64) -> bool {
    !is_even(n)
}

/// `base^exp`, or `None` on overflow.
pub fn pow(base: u64, exp: u32) -> Option<u64> {
    base.checked_pow(exp)
}

/// `base^exp mod modulus` by square-and-multiply.
///
/// # Panics
/// Panics if `modulus` is zero.
pub fn mod_pow(base: u64, exp: u64, modulus: u64) -> u64 {
    assert!(modulus != 0, "modulus must be positive");
    let m = modulus as u128;
    let mut result = 1 % m;
    let mut b = base as u128 % m;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        e >>= 1;
    }
    result as u64
}

/// `a^(2^j) mod modulus` by `j` successive squarings.
///
/// # Example
/// ```
/// use shor_rs::number::mod_exp2;
/// // 7^4 mod 15 = 1
/// assert_eq!(mod_exp2(7, 2, 15), 1);
/// ```
pub fn mod_exp2(a: u64, j: u32, modulus: u64) -> u64 {
    assert!(modulus != 0, "modulus must be positive");
    let m = modulus as u128;
    let mut p = a as u128 % m;
    for _ in 0..j {
        p = p * p % m;
    }
    p as u64
}

/// Decompose `n` as `a^b` with `b >= 2`, preferring the largest exponent.
///
/// # Example
/// ```
/// use shor_rs::number::base_exp;
/// assert_eq!(base_exp(27), Some((3, 3)));
/// assert_eq!(base_exp(15), None);
/// ```
pub fn base_exp(n: u64) -> Option<(u64, u32)> {
    if n < 4 {
        return None;
    }
    let max_exp = 63 - n.leading_zeros();
    for b in (2..=max_exp).rev() {
        let guess = (n as f64).powf(1.0 / b as f64).round() as u64;
        for a in guess.saturating_sub(1).max(2)..=guess + 1 {
            if pow(a, b) == Some(n) {
                return Some((a, b));
            }
        }
    }
    None
}

/// A uniformly drawn base `a` in `[2, n)` coprime to `n`, or `None` when
/// no such base exists.
pub fn coprime<R: Rng + ?Sized>(rng: &mut R, n: u64) -> Option<u64> {
    if n < 3 {
        return None;
    }
    loop {
        let a = rng.gen_range(2..n);
        if gcd(a, n) == 1 {
            return Some(a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_continued_fraction_cases() {
        let cases: [(f64, &[u64], u64, u64); 6] = [
            (0.42857, &[0, 2, 2, 1], 3, 7),
            (1.0 / 16.0, &[0, 16], 1, 16),
            (4.0 / 16.0, &[0, 4], 1, 4),
            (0.0, &[0], 0, 1),
            (1.0, &[1], 1, 1),
            (0.166656494140625, &[0, 6], 1, 6),
        ];
        for (input, cf, s, r) in cases {
            let expansion = continued_fraction(input, DEFAULT_EPSILON);
            assert_eq!(expansion, cf, "expansion of {}", input);
            let (num, den, _) = convergent(&expansion);
            assert_eq!((num, den), (s, r), "convergent of {}", input);
        }
    }

    #[test]
    fn test_convergent_recovers_sixteenths() {
        for (p, q) in [(7u64, 16u64), (13, 16), (3, 16)] {
            let cf = continued_fraction(p as f64 / q as f64, DEFAULT_EPSILON);
            let (s, r, d) = convergent(&cf);
            assert_eq!((s, r), (p, q));
            assert_eq!(d, p as f64 / q as f64);
        }
    }

    #[test]
    fn test_convergent_long_expansion() {
        let f = binary_fraction(&[0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);
        assert_eq!(f, 0.16650390625);
        let (s, r, _) = convergent(&continued_fraction(f, DEFAULT_EPSILON));
        assert_eq!((s, r), (341, 2048));
    }

    #[test]
    fn test_coarser_epsilon_truncates() {
        let f = binary_fraction(&[0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);
        let (s, r, _) = convergent(&continued_fraction(f, 1e-2));
        assert_eq!((s, r), (1, 6));
    }

    #[test]
    fn test_approximated_continued_fraction() {
        assert!((approximated_continued_fraction(&[0, 1, 4, 3]) - 0.8125).abs() < 1e-12);
        assert_eq!(approximated_continued_fraction(&[0]), 0.0);
    }

    #[test]
    #[should_panic(expected = "invalid bit")]
    fn test_binary_fraction_rejects_non_bit() {
        binary_fraction(&[0, 2, 1]);
    }

    #[test]
    #[should_panic(expected = "empty continued fraction")]
    fn test_convergent_rejects_empty() {
        convergent(&[]);
    }

    #[test]
    fn test_primes_and_parity() {
        let primes: Vec<u64> = (0..60).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]
        );
        assert!(is_even(14) && is_odd(15));
    }

    #[test]
    fn test_is_prime_near_u64_max() {
        assert!(is_prime(18_446_744_073_709_551_557));
        assert!(is_prime(4_294_967_291));
        assert!(!is_prime(u64::MAX));
        // product of the two largest primes below 2^32
        assert!(!is_prime(4_294_967_291 * 4_294_967_279));
        // Carmichael numbers
        for n in [561, 1105, 1729, 41041] {
            assert!(!is_prime(n), "{}", n);
        }
    }

    #[test]
    fn test_tiny_epsilon_terminates() {
        assert_eq!(continued_fraction(0.8125, 1e-17), vec![0, 1, 4, 3]);
        assert_eq!(continued_fraction(0.8125, f64::MIN_POSITIVE), vec![0, 1, 4, 3]);

        let f = std::f64::consts::PI - 3.0;
        let cf = continued_fraction(f, 1e-300);
        assert_eq!(&cf[..4], &[0, 7, 15, 1]);
        let (_, r, value) = convergent(&cf);
        assert!(r > 1);
        assert!((value - f).abs() < 1e-12);
    }

    #[test]
    fn test_convergent_stops_before_overflow() {
        let cf = [0, 3, u64::MAX, 2];
        assert_eq!(convergent(&cf), (1, 3, 1.0 / 3.0));
        let (s, r, _) = convergent(&[1, u64::MAX / 2, 5]);
        assert_eq!((s, r), (u64::MAX / 2 + 1, u64::MAX / 2));
    }

    #[test]
    #[should_panic(expected = "cannot expand")]
    fn test_continued_fraction_rejects_huge_input() {
        continued_fraction(1e20, DEFAULT_EPSILON);
    }

    #[test]
    fn test_mod_pow_matches_mod_exp2() {
        for j in 0..6 {
            assert_eq!(mod_exp2(7, j, 15), mod_pow(7, 1 << j, 15));
            assert_eq!(mod_exp2(4, j, 21), mod_pow(4, 1 << j, 21));
        }
    }

    #[test]
    fn test_base_exp() {
        assert_eq!(base_exp(8), Some((2, 3)));
        assert_eq!(base_exp(9), Some((3, 2)));
        assert_eq!(base_exp(64), Some((2, 6)));
        assert_eq!(base_exp(21), None);
    }

    #[test]
    fn test_coprime_draws_valid_base() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let a = coprime(&mut rng, 21).unwrap();
            assert!((2..21).contains(&a));
            assert_eq!(gcd(a, 21), 1);
        }
        assert_eq!(coprime(&mut rng, 2), None);
    }
}
