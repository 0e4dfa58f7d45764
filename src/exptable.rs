//! Fixed-base exponentiation tables.
//!
//! For a fixed base and modulus, `base^(j·2^(w·i))` is precomputed for every
//! window position `i` and window value `j`, turning an exponentiation into
//! one modular multiplication per nonzero window. The group uses width 7 for
//! its two generators.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

pub const WINDOW_WIDTH: u32 = 7;

#[derive(Clone, Debug)]
pub struct ExpTable {
    modulus: BigInt,
    width: u32,
    covered_bits: u64,
    // rows[i][j-1] = base^(j << (width*i)) mod modulus, j in 1..2^width
    rows: Vec<Vec<BigInt>>,
}

impl ExpTable {
    /// Precomputes the table for exponents up to the bit length of
    /// `modulus`.
    pub fn new(base: &BigInt, modulus: &BigInt, width: u32) -> Self {
        let covered_bits = modulus.bits();
        let window_count = (covered_bits + u64::from(width) - 1) / u64::from(width);
        let entries = (1usize << width) - 1;

        let base = base.mod_floor(modulus);
        let mut rows = Vec::with_capacity(window_count as usize);
        let mut window_base = base;
        for _ in 0..window_count {
            let mut row = Vec::with_capacity(entries);
            let mut acc = BigInt::one();
            for _ in 0..entries {
                acc = (&acc * &window_base).mod_floor(modulus);
                row.push(acc.clone());
            }
            // First entry of the next window: base^(2^width) of this one.
            window_base = (&row[entries - 1] * &row[0]).mod_floor(modulus);
            rows.push(row);
        }

        ExpTable {
            modulus: modulus.clone(),
            width,
            covered_bits,
            rows,
        }
    }

    /// `base^exp mod modulus` for `0 <= exp`. Exponents beyond the covered
    /// range fall back to a plain modpow.
    pub fn exp(&self, exp: &BigInt) -> BigInt {
        debug_assert!(!exp.is_negative());
        if exp.bits() > self.covered_bits {
            let base = &self.rows[0][0];
            return base.modpow(exp, &self.modulus);
        }
        if exp.is_zero() {
            return BigInt::one();
        }

        let digits = exp.magnitude().to_u64_digits();
        let mut result = BigInt::one();
        for (i, row) in self.rows.iter().enumerate() {
            let j = extract_window(&digits, u64::from(self.width) * i as u64, self.width);
            if j > 0 {
                result = (result * &row[j - 1]).mod_floor(&self.modulus);
            }
        }
        result
    }
}

/// Reads `width` bits of a little-endian limb array starting at `bit`.
fn extract_window(digits: &[u64], bit: u64, width: u32) -> usize {
    let limb = (bit / 64) as usize;
    let offset = bit % 64;
    if limb >= digits.len() {
        return 0;
    }
    let mut window = digits[limb] >> offset;
    if offset + u64::from(width) > 64 && limb + 1 < digits.len() {
        window |= digits[limb + 1] << (64 - offset);
    }
    (window & ((1u64 << width) - 1)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_modpow() {
        let modulus = BigInt::from(26903);
        let base = BigInt::from(1234);
        let table = ExpTable::new(&base, &modulus, WINDOW_WIDTH);
        for e in [0u32, 1, 2, 7, 127, 128, 129, 255, 12345, 26901] {
            let exp = BigInt::from(e);
            assert_eq!(table.exp(&exp), base.modpow(&exp, &modulus), "exp {e}");
        }
    }

    #[test]
    fn wide_exponents_cross_limb_boundaries() {
        let modulus = (BigInt::one() << 130) + 67; // odd 131-bit modulus
        let base = BigInt::from(3);
        let table = ExpTable::new(&base, &modulus, WINDOW_WIDTH);
        let exp = (BigInt::one() << 129) + (BigInt::one() << 64) + BigInt::from(89);
        assert_eq!(table.exp(&exp), base.modpow(&exp, &modulus));
    }
}
