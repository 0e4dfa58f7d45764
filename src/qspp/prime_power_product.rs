//! At most two prime-power factors.
//!
//! For a modulus with two prime-power factors the cosets `{1, -1, 2, -2}`
//! cover every quadratic character class, so one of `±c, ±2c` always has a
//! square root. With three or more factors a random challenge only admits
//! one with probability at most 1/2 per iteration.

use crate::bigint_serde;
use crate::error::ProofError;
use crate::hashing;
use crate::math;
use crate::params::PRIME_POWER_PRODUCT_ITERS;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimePowerProductProof {
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

/// The challenge tweaks tried in order: `c, -c, 2c, -2c`.
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
) -> Result<PrimePowerProductProof, ProofError> {
    let n = p * q;
    let factors = [p.clone(), q.clone()];

    let mut responses = Vec::with_capacity(PRIME_POWER_PRODUCT_ITERS);
    for i in 0..PRIME_POWER_PRODUCT_ITERS {
        let curc = iteration_challenge(&n, challenge, index, i as i64);
        if !curc.gcd(&n).is_one() {
            return Err(ProofError::ChallengeOutsideGroup);
        }

        let mut root = None;
        for target in tweaked(&curc, &n) {
            if let Some(r) = math::mod_sqrt(&target, &factors)? {
                root = Some(r);
                break;
            }
        }
        responses.push(root.ok_or(ProofError::NoSquareRoot)?);
    }

    Ok(PrimePowerProductProof { responses })
}

pub fn verify_structure(proof: &PrimePowerProductProof) -> bool {
    proof.responses.len() == PRIME_POWER_PRODUCT_ITERS
}

pub fn verify_proof(
    n: &BigInt,
    challenge: &BigInt,
    index: i64,
    proof: &PrimePowerProductProof,
) -> bool {
    if !verify_structure(proof) {
        return false;
    }

    for (i, response) in proof.responses.iter().enumerate() {
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

    const P: i64 = 1031;
    const Q: i64 = 1061;

    fn build() -> PrimePowerProductProof {
        build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), 1).unwrap()
    }

    #[test]
    fn cycle() {
        let proof = build();
        assert!(verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 1, &proof));
    }

    #[test]
    fn rejects_perturbed_response() {
        let mut proof = build();
        proof.responses[0] += 1;
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 1, &proof));
    }

    #[test]
    fn rejects_wrong_challenge() {
        let proof = build();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12346), 1, &proof));
    }

    #[test]
    fn rejects_wrong_index() {
        let proof = build();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 2, &proof));
    }

    #[test]
    fn rejects_short_proof() {
        let mut proof = build();
        proof.responses.truncate(PRIME_POWER_PRODUCT_ITERS - 1);
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 1, &proof));
    }
}
