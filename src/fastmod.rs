//! Barrett reduction with cached constants.
//!
//! Repeated reductions against a fixed modulus avoid a full division: for
//! operands below `modulus²` one multiplication by the precomputed
//! reciprocal and at most two corrective subtractions suffice.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;

#[derive(Clone, Debug)]
pub struct FastMod {
    modulus: BigInt,
    shift: u64,
    mu: BigInt,
    limit: BigInt,
}

impl FastMod {
    pub fn new(modulus: &BigInt) -> Self {
        assert!(modulus.is_positive(), "modulus must be positive");
        let shift = modulus.bits();
        let mu = (BigInt::from(1) << (2 * shift)) / modulus;
        let limit = BigInt::from(1) << (2 * shift);
        FastMod {
            modulus: modulus.clone(),
            shift,
            mu,
            limit,
        }
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    /// Reduces `x` into `[0, modulus)`. Negative or oversized operands fall
    /// back to plain flooring division.
    pub fn reduce(&self, x: &BigInt) -> BigInt {
        if x.is_negative() || *x >= self.limit {
            return x.mod_floor(&self.modulus);
        }
        if *x < self.modulus {
            return x.clone();
        }
        let q = ((x >> (self.shift - 1)) * &self.mu) >> (self.shift + 1);
        let mut r = x - q * &self.modulus;
        while r >= self.modulus {
            r -= &self.modulus;
        }
        r
    }
}
