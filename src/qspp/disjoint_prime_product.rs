//! Two distinct `≡ 3 (mod 4)` prime factors.
//!
//! For such a modulus every quadratic residue has exactly one pair of
//! square roots `±r` with Jacobi symbol `+1` (the other pair differs by the
//! CRT unit `(1, -1)`, whose Jacobi symbol is `-1`). The prover answers each
//! hash-derived challenge with the Jacobi-positive root of whichever of
//! `±c, ±2c` is a residue, normalised below `N/2`; being able to control the
//! Jacobi symbol this way certifies the root-sign structure that the
//! square-free and prime-power tests leave open.

use crate::bigint_serde;
use crate::error::ProofError;
use crate::hashing;
use crate::math;
use crate::params::DISJOINT_PRIME_PRODUCT_ITERS;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisjointPrimeProductProof {
    #[serde(rename = "Responses", with = "bigint_serde::seq")]
    pub responses: Vec<BigInt>,
}

fn iteration_challenge(n: &BigInt, challenge: &BigInt, index: i64, i: i64) -> BigInt {
    hashing::get_hash_number(
        Some(challenge),
        Some(&BigInt::from(index)),
        i,
        n.bits() as u32,
    )
    .mod_floor(n)
}

fn tweaked(curc: &BigInt, n: &BigInt) -> [BigInt; 4] {
    [
        curc.clone(),
        (-curc).mod_floor(n),
        (curc << 1u32).mod_floor(n),
        (-(curc << 1u32)).mod_floor(n),
    ]
}

pub fn build_proof(
    p: &BigInt,
    q: &BigInt,
    challenge: &BigInt,
    index: i64,
) -> Result<DisjointPrimeProductProof, ProofError> {
    let n = p * q;
    let factors = [p.clone(), q.clone()];

    let mut responses = Vec::with_capacity(DISJOINT_PRIME_PRODUCT_ITERS);
    for i in 0..DISJOINT_PRIME_PRODUCT_ITERS {
        let curc = iteration_challenge(&n, challenge, index, i as i64);
        if !curc.gcd(&n).is_one() {
            return Err(ProofError::ChallengeOutsideGroup);
        }

        let mut response = None;
        for target in tweaked(&curc, &n) {
            let root = match math::mod_sqrt(&target, &factors)? {
                Some(root) => root,
                None => continue,
            };
            // The second root pair differs by the unit that is 1 mod p and
            // -1 mod q; exactly one pair has Jacobi symbol +1.
            let other = math::crt(&root.mod_floor(p), p, &(-&root).mod_floor(q), q)?;
            let positive = if math::legendre_symbol(&root, p) * math::legendre_symbol(&root, q) == 1
            {
                root
            } else {
                other
            };
            let normalised = positive.clone().min(&n - &positive);
            response = Some(normalised);
            break;
        }
        responses.push(response.ok_or(ProofError::NoSquareRoot)?);
    }

    Ok(DisjointPrimeProductProof { responses })
}

pub fn verify_structure(proof: &DisjointPrimeProductProof) -> bool {
    proof.responses.len() == DISJOINT_PRIME_PRODUCT_ITERS
}

pub fn verify_proof(
    n: &BigInt,
    challenge: &BigInt,
    index: i64,
    proof: &DisjointPrimeProductProof,
) -> bool {
    if !verify_structure(proof) {
        return false;
    }

    let half_n: BigInt = n >> 1;
    for (i, response) in proof.responses.iter().enumerate() {
        if response.sign() == num_bigint::Sign::Minus || *response > half_n {
            return false;
        }
        if math::legendre_symbol(response, n) != 1 {
            return false;
        }
        let curc = iteration_challenge(n, challenge, index, i as i64);
        let square = response.modpow(&BigInt::from(2), n);
        if !tweaked(&curc, n).iter().any(|t| square == *t) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: i64 = 2063;
    const Q: i64 = 1187;

    fn build() -> DisjointPrimeProductProof {
        build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), 2).unwrap()
    }

    #[test]
    fn cycle() {
        let proof = build();
        assert!(verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 2, &proof));
    }

    #[test]
    fn rejects_perturbed_response() {
        let mut proof = build();
        proof.responses[0] += 1;
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 2, &proof));
    }

    #[test]
    fn rejects_wrong_challenge() {
        let proof = build();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12346), 2, &proof));
    }

    #[test]
    fn rejects_wrong_index() {
        let proof = build();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_short_proof() {
        let mut proof = build();
        proof.responses.pop();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 2, &proof));
    }

    #[test]
    fn rejects_empty_proof() {
        let proof = DisjointPrimeProductProof { responses: vec![] };
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 2, &proof));
    }
}
