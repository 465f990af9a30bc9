//! Big-endian bit indexing for qubit registers.
//!
//! Qubit 0 is the most significant bit of a basis-state index: in an
//! `n`-qubit register, qubit `loc` contributes `2^(n-1-loc)`. Sub-registers
//! given as a list of qubit locations are read most-significant first.

/// Value (0 or 1) of qubit `loc` in basis state `index`.
///
/// # Example
/// ```
/// use shor_rs::index::bit;
/// // |101⟩ = 5: qubit 0 is 1, qubit 1 is 0, qubit 2 is 1
/// assert_eq!(bit(5, 0, 3), 1);
/// assert_eq!(bit(5, 1, 3), 0);
/// assert_eq!(bit(5, 2, 3), 1);
/// ```
#[inline]
pub fn bit(index: usize, loc: usize, n: usize) -> usize {
    debug_assert!(loc < n, "qubit {} out of range for {} qubits", loc, n);
    (index >> (n - 1 - loc)) & 1
}

/// Mask with only qubit `loc` set.
#[inline]
pub fn mask(loc: usize, n: usize) -> usize {
    debug_assert!(loc < n, "qubit {} out of range for {} qubits", loc, n);
    1 << (n - 1 - loc)
}

/// `index` with qubit `loc` forced to `val`.
#[inline]
pub fn set_bit(index: usize, loc: usize, n: usize, val: usize) -> usize {
    if val == 0 {
        index & !mask(loc, n)
    } else {
        index | mask(loc, n)
    }
}

/// Bits of `index` over `n` qubits, most significant first.
///
/// # Example
/// ```
/// use shor_rs::index::to_bits;
/// assert_eq!(to_bits(6, 4), vec![0, 1, 1, 0]);
/// ```
pub fn to_bits(index: usize, n: usize) -> Vec<u8> {
    (0..n).map(|loc| bit(index, loc, n) as u8).collect()
}

/// Integer value of a most-significant-first bit sequence.
///
/// # Panics
/// Panics if any entry is not 0 or 1.
pub fn from_bits(bits: &[u8]) -> usize {
    bits.iter().fold(0, |acc, &b| {
        assert!(b <= 1, "invalid bit {} in {:?}", b, bits);
        (acc << 1) | b as usize
    })
}

/// Value of the sub-register `locs` within basis state `index`.
///
/// # Example
/// ```
/// use shor_rs::index::register_value;
/// // |0110⟩: qubits [1, 2] read "11" = 3, qubits [2, 0] read "10" = 2
/// assert_eq!(register_value(0b0110, &[1, 2], 4), 3);
/// assert_eq!(register_value(0b0110, &[2, 0], 4), 2);
/// ```
pub fn register_value(index: usize, locs: &[usize], n: usize) -> usize {
    locs.iter().fold(0, |acc, &loc| (acc << 1) | bit(index, loc, n))
}

/// `index` with the sub-register `locs` overwritten by `value`.
pub fn with_register_value(index: usize, locs: &[usize], n: usize, value: usize) -> usize {
    let k = locs.len();
    locs.iter().enumerate().fold(index, |acc, (i, &loc)| {
        set_bit(acc, loc, n, (value >> (k - 1 - i)) & 1)
    })
}

/// Whether the qubits `locs` of `index` hold the corresponding `vals`.
#[inline]
pub fn matches(index: usize, locs: &[usize], vals: &[bool], n: usize) -> bool {
    locs.iter()
        .zip(vals.iter())
        .all(|(&loc, &val)| (bit(index, loc, n) == 1) == val)
}

/// Iterate over basis states whose qubits `fixed_locs` hold `fixed_vals`.
///
/// # Example
/// ```
/// use shor_rs::index::iter_basis_fixed;
/// // 2 qubits, qubit 0 fixed to 1: |10⟩ and |11⟩
/// let indices: Vec<_> = iter_basis_fixed(2, &[0], &[true]).collect();
/// assert_eq!(indices, vec![2, 3]);
/// ```
pub fn iter_basis_fixed<'a>(
    n: usize,
    fixed_locs: &'a [usize],
    fixed_vals: &'a [bool],
) -> impl Iterator<Item = usize> + 'a {
    debug_assert_eq!(
        fixed_locs.len(),
        fixed_vals.len(),
        "fixed_locs and fixed_vals must have the same length"
    );
    (0..1usize << n).filter(move |&i| matches(i, fixed_locs, fixed_vals, n))
}
