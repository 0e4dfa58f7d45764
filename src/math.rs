//! Number-theoretic utilities shared by the proof machinery: Legendre
//! symbols, Chinese remaindering, modular square roots, primality and
//! safe-prime generation.

use crate::cprng;
use crate::error::ProofError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_prime::nt_funcs::is_prime;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;

/// Legendre symbol `(a/p)` by the quadratic-reciprocity rules, without
/// exponentiation. Also accepts odd composite moduli, in which case it
/// computes the Jacobi symbol.
pub fn legendre_symbol(a: &BigInt, p: &BigInt) -> i32 {
    let mut j = 1;

    // rule 5
    let mut n = a.mod_floor(p);
    let mut m = p.clone();

    while !n.is_zero() {
        // rules 3 and 4
        let mut t = 0;
        while !n.bit(0) {
            n >>= 1;
            t += 1;
        }
        let m8 = m.mod_floor(&BigInt::from(8));
        if t & 1 == 1 && (m8 == BigInt::from(3) || m8 == BigInt::from(5)) {
            j = -j;
        }

        // rule 6
        if m.mod_floor(&BigInt::from(4)) == BigInt::from(3)
            && n.mod_floor(&BigInt::from(4)) == BigInt::from(3)
        {
            j = -j;
        }

        // rules 5 and 6
        m = m.mod_floor(&n);
        std::mem::swap(&mut m, &mut n);
    }

    if m.is_one() {
        j
    } else {
        0
    }
}

/// Finds `x (mod pa·pb)` with `x ≡ a (mod pa)` and `x ≡ b (mod pb)`.
pub fn crt(a: &BigInt, pa: &BigInt, b: &BigInt, pb: &BigInt) -> Result<BigInt, ProofError> {
    let gcd = pa.extended_gcd(pb);
    if !gcd.gcd.is_one() {
        return Err(ProofError::NonCoprimeModuli);
    }
    // gcd.x * pa + gcd.y * pb == 1
    let n = pa * pb;
    let result = a * &gcd.y * pb + b * &gcd.x * pa;
    Ok(result.mod_floor(&n))
}

/// Modular inverse of `a` mod `m`, if it exists.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let gcd = a.mod_floor(m).extended_gcd(m);
    if gcd.gcd.is_one() {
        Some(gcd.x.mod_floor(m))
    } else {
        None
    }
}

/// Modular exponentiation accepting negative exponents.
///
/// A negative exponent inverts the base first. Adversarial bases without an
/// inverse map to zero, which no verification equation can satisfy.
pub fn mod_exp_signed(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> BigInt {
    let base = base.mod_floor(modulus);
    if exp.is_negative() {
        match mod_inverse(&base, modulus) {
            Some(inv) => inv.modpow(&-exp, modulus),
            None => BigInt::zero(),
        }
    } else {
        base.modpow(exp, modulus)
    }
}

/// Square root of `a` modulo a prime `pa`. Returns `None` for non-residues.
pub fn prime_sqrt(a: &BigInt, pa: &BigInt) -> Option<BigInt> {
    if a.is_zero() {
        return Some(BigInt::zero());
    }

    // Euler criterion
    let validation = a.modpow(&(pa >> 1), pa);
    if !validation.is_one() {
        return None;
    }

    // Shortcut when pa = 3 (mod 4)
    if pa.mod_floor(&BigInt::from(4)) == BigInt::from(3) {
        return Some(a.modpow(&((pa >> 2) + 1), pa));
    }

    // Tonelli-Shanks. Find a non-residue first.
    let mut z = BigInt::from(2);
    while legendre_symbol(&z, pa) != -1 {
        z += 1;
    }

    // Split pa-1 as 2^m * q
    let mut q: BigInt = pa - 1;
    let mut m = 0u32;
    while !q.bit(0) {
        q >>= 1;
        m += 1;
    }

    let mut c = z.modpow(&q, pa);
    let mut t = a.modpow(&q, pa);
    let mut r = a.modpow(&((&q >> 1) + 1), pa);

    while !t.is_one() {
        let mut tp = t.clone();
        let mut i = 0u32;
        while !tp.is_one() {
            tp = tp.modpow(&BigInt::from(2), pa);
            i += 1;
        }
        let b = c.modpow(&(BigInt::one() << (m - i - 1)), pa);
        m = i;
        c = b.modpow(&BigInt::from(2), pa);
        t = (t * &c).mod_floor(pa);
        r = (r * &b).mod_floor(pa);
    }

    Some(r)
}

/// Square root of `a` modulo a composite with known pairwise-coprime
/// `factors`. `4` is permitted as a factor, with bits 0 and 1 handled by
/// hand. Returns `Ok(None)` when `a` is a non-residue.
pub fn mod_sqrt(a: &BigInt, factors: &[BigInt]) -> Result<Option<BigInt>, ProofError> {
    let mut n = BigInt::one();
    let mut res = BigInt::zero();

    for (i, fac) in factors.iter().enumerate() {
        let loc_res;
        if *fac == BigInt::from(4) {
            if a.bit(1) {
                return Ok(None);
            }
            loc_res = if a.bit(0) {
                BigInt::one()
            } else {
                BigInt::from(2)
            };
        } else {
            match prime_sqrt(&a.mod_floor(fac), fac) {
                Some(root) => loc_res = root,
                None => return Ok(None),
            }
        }
        if i == 0 {
            res = loc_res;
        } else {
            res = crt(&res, &n, &loc_res, fac)?;
        }
        n *= fac;
    }
    Ok(Some(res))
}

/// Probable-primality test (BPSW; stronger than 80 rounds of Miller-Rabin
/// at the sizes involved here).
pub fn probably_prime(n: &BigInt) -> bool {
    if n.is_negative() || n.is_zero() || n.is_one() {
        return false;
    }
    is_prime(n.magnitude(), None).probably()
}

static SMALL_PRIMES: Lazy<Vec<u64>> = Lazy::new(|| {
    let limit = 10_000usize;
    let mut sieve = vec![true; limit];
    let mut primes = Vec::new();
    for i in 2..limit {
        if sieve[i] {
            primes.push(i as u64);
            let mut j = i * i;
            while j < limit {
                sieve[j] = false;
                j += i;
            }
        }
    }
    primes
});

fn passes_sieve(candidate: &BigInt, half: &BigInt) -> bool {
    for &p in SMALL_PRIMES.iter() {
        let p = BigInt::from(p);
        if &p >= half {
            break;
        }
        if candidate.mod_floor(&p).is_zero() || half.mod_floor(&p).is_zero() {
            return false;
        }
    }
    true
}

/// Generates a safe prime of exactly `bits` bits: both the result and its
/// half are probable primes. Candidates and their halves are sieved against
/// small primes before the expensive tests run.
pub fn generate_safe_prime(bits: u32) -> Result<BigInt, ProofError> {
    assert!(bits >= 4, "safe primes this small do not exist");

    // Candidate count is heuristically ~ln(2^bits)^2 / 4; give the search
    // generous headroom before declaring failure.
    let attempts = 4000u64.saturating_mul(u64::from(bits));
    for _ in 0..attempts {
        let mut candidate = cprng::random_big_int(&(BigInt::one() << bits));
        candidate.set_bit(u64::from(bits) - 1, true);
        candidate.set_bit(1, true);
        candidate.set_bit(0, true); // candidate = 3 (mod 4), so half is odd

        let half: BigInt = &candidate >> 1;
        if !passes_sieve(&candidate, &half) {
            continue;
        }
        if probably_prime(&half) && probably_prime(&candidate) {
            return Ok(candidate);
        }
    }
    Err(ProofError::GroupGeneration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legendre_matches_euler_criterion() {
        for p in [3i64, 5, 7, 11, 13, 17] {
            let prime = BigInt::from(p);
            for a in 0..p {
                let reference = BigInt::from(a).modpow(&(&prime >> 1), &prime);
                let mut rv = reference
                    .to_string()
                    .parse::<i64>()
                    .expect("small residue fits");
                if rv > 1 {
                    rv -= p;
                }
                assert_eq!(
                    legendre_symbol(&BigInt::from(a), &prime) as i64,
                    rv,
                    "({a}/{p})"
                );
            }
        }
    }

    #[test]
    fn crt_reconstructs_mod_20() {
        for i in 0..20i64 {
            let res = crt(
                &BigInt::from(i % 4),
                &BigInt::from(4),
                &BigInt::from(i % 5),
                &BigInt::from(5),
            )
            .unwrap();
            assert_eq!(res, BigInt::from(i));
        }
    }

    #[test]
    fn crt_reconstructs_mod_35() {
        for i in 0..35i64 {
            let res = crt(
                &BigInt::from(i % 5),
                &BigInt::from(5),
                &BigInt::from(i % 7),
                &BigInt::from(7),
            )
            .unwrap();
            assert_eq!(res, BigInt::from(i));
        }
    }

    #[test]
    fn crt_rejects_shared_factors() {
        assert!(crt(
            &BigInt::one(),
            &BigInt::from(5),
            &BigInt::one(),
            &BigInt::from(35)
        )
        .is_err());
    }

    #[test]
    fn prime_sqrt_finds_roots() {
        for p in [7i64, 13, 17] {
            for i in 0..p {
                let square = BigInt::from((i * i) % p);
                let root = prime_sqrt(&square, &BigInt::from(p))
                    .unwrap_or_else(|| panic!("{} rejected as non-square mod {p}", (i * i) % p));
                assert!(
                    root == BigInt::from(i) || root == BigInt::from(p - i),
                    "incorrect root {root} of {} mod {p}",
                    (i * i) % p
                );
            }
        }
    }

    #[test]
    fn prime_sqrt_rejects_non_residues() {
        let table = [(3, 7), (5, 7), (6, 7), (2, 13), (5, 13), (6, 13), (7, 13), (8, 13), (11, 13)];
        for (a, p) in table {
            assert!(
                prime_sqrt(&BigInt::from(a), &BigInt::from(p)).is_none(),
                "{a} accepted as square mod {p}"
            );
        }
    }

    #[test]
    fn mod_sqrt_handles_factor_four() {
        let factors = [BigInt::from(4), BigInt::from(5)];
        for i in 0..20i64 {
            let square = BigInt::from((i * i) % 20);
            let root = mod_sqrt(&square, &factors)
                .unwrap()
                .unwrap_or_else(|| panic!("{} rejected as non-square mod 20", (i * i) % 20));
            assert_eq!((&root * &root).mod_floor(&BigInt::from(20)), square);
        }
    }

    #[test]
    fn mod_sqrt_three_factors() {
        let factors = [BigInt::from(4), BigInt::from(5), BigInt::from(7)];
        for i in 0..140i64 {
            let square = BigInt::from((i * i) % 140);
            let root = mod_sqrt(&square, &factors)
                .unwrap()
                .unwrap_or_else(|| panic!("{} rejected as non-square mod 140", (i * i) % 140));
            assert_eq!((&root * &root).mod_floor(&BigInt::from(140)), square);
        }
    }

    #[test]
    fn mod_sqrt_rejects_non_residues() {
        let factors = [BigInt::from(4), BigInt::from(5)];
        for v in [2i64, 3, 6, 7, 8, 10, 11, 12, 13, 14, 15, 17, 18, 19] {
            assert!(
                mod_sqrt(&BigInt::from(v), &factors).unwrap().is_none(),
                "{v} accepted as square mod 20"
            );
        }
    }

    #[test]
    fn signed_exponent_inverts() {
        let m = BigInt::from(47);
        let base = BigInt::from(5);
        let inv2 = mod_exp_signed(&base, &BigInt::from(-2), &m);
        let sq = base.modpow(&BigInt::from(2), &m);
        assert_eq!((inv2 * sq).mod_floor(&m), BigInt::one());
    }

    #[test]
    fn generates_small_safe_primes() {
        let p = generate_safe_prime(32).unwrap();
        assert_eq!(p.bits(), 32);
        assert!(probably_prime(&p));
        assert!(probably_prime(&(&p >> 1)));
    }
}
