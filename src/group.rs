//! The prime-order group all sigma statements live in.
//!
//! A group is described by a safe prime `P = 2q + 1`; statements work in the
//! order-`q` subgroup of `Z_P*` generated by two independent bases `g` and
//! `h`. The generator constants are fixed so independently built groups over
//! the same prime are bit-identical, which verifier interoperability
//! requires.

use crate::exptable::{ExpTable, WINDOW_WIDTH};
use crate::fastmod::FastMod;
use crate::lookup::BaseLookup;
use crate::math;
use num_bigint::BigInt;
use num_traits::Signed;

pub struct Group {
    modulus: BigInt,
    order: BigInt,
    g: BigInt,
    h: BigInt,

    g_table: ExpTable,
    h_table: ExpTable,

    modulus_mod: FastMod,
    order_mod: FastMod,
}

/// Builds the group over `prime`. Succeeds iff both `prime` and
/// `(prime-1)/2` are probable primes.
pub fn build_group(prime: &BigInt) -> Option<Group> {
    if !math::probably_prime(prime) {
        return None;
    }

    let order: BigInt = prime >> 1;
    if !math::probably_prime(&order) {
        return None;
    }

    let g = BigInt::from(0x41424344u64).modpow(&BigInt::from(0x45464748u64), prime);
    let h = BigInt::from(0x494A4B4Cu64).modpow(&BigInt::from(0x4D4E4F50u64), prime);

    let g_table = ExpTable::new(&g, prime, WINDOW_WIDTH);
    let h_table = ExpTable::new(&h, prime, WINDOW_WIDTH);

    let modulus_mod = FastMod::new(prime);
    let order_mod = FastMod::new(&order);

    Some(Group {
        modulus: prime.clone(),
        order,
        g,
        h,
        g_table,
        h_table,
        modulus_mod,
        order_mod,
    })
}

impl Group {
    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    pub fn order(&self) -> &BigInt {
        &self.order
    }

    /// Reduction mod `P` through the cached Barrett constants.
    pub fn mod_p(&self, x: &BigInt) -> BigInt {
        self.modulus_mod.reduce(x)
    }

    /// Reduction mod the group order.
    pub fn mod_order(&self, x: &BigInt) -> BigInt {
        self.order_mod.reduce(x)
    }

    /// Brings an exponent into `[0, order)`; a negative exponent gains the
    /// order once before any residual reduction.
    fn clamp_exponent(&self, exp: &BigInt) -> BigInt {
        let mut exp = exp.clone();
        if exp.is_negative() {
            exp += &self.order;
        }
        if exp.is_negative() || exp >= self.order {
            exp = self.order_mod.reduce(&exp);
        }
        exp
    }
}

impl BaseLookup for Group {
    fn base(&self, name: &str) -> Option<&BigInt> {
        match name {
            "g" => Some(&self.g),
            "h" => Some(&self.h),
            _ => None,
        }
    }

    fn base_names(&self) -> Vec<&str> {
        vec!["g", "h"]
    }

    fn exp(&self, name: &str, exp: &BigInt, _modulus: &BigInt) -> Option<BigInt> {
        let table = match name {
            "g" => &self.g_table,
            "h" => &self.h_table,
            _ => return None,
        };
        Some(table.exp(&self.clamp_exponent(exp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn accepts_safe_prime() {
        let g = build_group(&BigInt::from(26903)).expect("26903 is a safe prime");
        assert_eq!(g.order(), &BigInt::from(13451));
        assert!(g.base("g").is_some());
        assert!(g.base("h").is_some());
        assert!(g.base("x").is_none());
    }

    #[test]
    fn rejects_non_safe_prime() {
        assert!(build_group(&BigInt::from(10009)).is_none());
    }

    #[test]
    fn rejects_composite() {
        assert!(build_group(&BigInt::from(20015)).is_none());
    }

    #[test]
    fn generators_are_reproducible() {
        let p = BigInt::from(26903);
        let g = build_group(&p).unwrap();
        let expected_g = BigInt::from(0x41424344u64).modpow(&BigInt::from(0x45464748u64), &p);
        let expected_h = BigInt::from(0x494A4B4Cu64).modpow(&BigInt::from(0x4D4E4F50u64), &p);
        assert_eq!(g.base("g"), Some(&expected_g));
        assert_eq!(g.base("h"), Some(&expected_h));
    }

    #[test]
    fn table_exp_matches_modpow() {
        let p = BigInt::from(26903);
        let g = build_group(&p).unwrap();
        let base = g.base("g").unwrap().clone();
        for e in [0i64, 1, 2, 100, 13449, 13450] {
            let exp = BigInt::from(e);
            assert_eq!(
                g.exp("g", &exp, &p).unwrap(),
                base.modpow(&exp, &p),
                "exponent {e}"
            );
        }
    }

    #[test]
    fn negative_exponents_gain_the_order() {
        let p = BigInt::from(26903);
        let g = build_group(&p).unwrap();
        let minus_one = BigInt::from(-1);
        let direct = g.exp("h", &minus_one, &p).unwrap();
        let via_order = g.exp("h", &(g.order() - BigInt::one()), &p).unwrap();
        assert_eq!(direct, via_order);
    }
}
