//! Square-freeness of the modulus.
//!
//! `N` is invertible mod `φ(N)` exactly when `N` is square-free, so
//! revealing `N`-th roots of hash-derived challenges proves the property:
//! `r = c^(N^-1 mod φ(N))` satisfies `r^N = c`.

use crate::bigint_serde;
use crate::error::ProofError;
use crate::hashing;
use crate::math;
use crate::params::SQUARE_FREE_ITERS;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SquareFreeProof {
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

pub fn build_proof(
    n: &BigInt,
    phi_n: &BigInt,
    challenge: &BigInt,
    index: i64,
) -> Result<SquareFreeProof, ProofError> {
    let m = math::mod_inverse(n, phi_n).ok_or(ProofError::NotSquareFree)?;

    let mut responses = Vec::with_capacity(SQUARE_FREE_ITERS);
    for i in 0..SQUARE_FREE_ITERS {
        let curc = iteration_challenge(n, challenge, index, i as i64);
        if !curc.gcd(n).is_one() {
            return Err(ProofError::ChallengeOutsideGroup);
        }
        responses.push(curc.modpow(&m, n));
    }

    Ok(SquareFreeProof { responses })
}

pub fn verify_structure(proof: &SquareFreeProof) -> bool {
    proof.responses.len() == SQUARE_FREE_ITERS
}

pub fn verify_proof(n: &BigInt, challenge: &BigInt, index: i64, proof: &SquareFreeProof) -> bool {
    if !verify_structure(proof) {
        return false;
    }

    for (i, response) in proof.responses.iter().enumerate() {
        let curc = iteration_challenge(n, challenge, index, i as i64);
        if response.modpow(n, n) != curc {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: i64 = 1031;
    const Q: i64 = 1063;

    fn build() -> SquareFreeProof {
        build_proof(
            &BigInt::from(P * Q),
            &BigInt::from((P - 1) * (Q - 1)),
            &BigInt::from(12345),
            0,
        )
        .unwrap()
    }

    #[test]
    fn cycle() {
        let proof = build();
        assert!(verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 0, &proof));
    }

    #[test]
    fn rejects_perturbed_response() {
        let mut proof = build();
        proof.responses[0] += 1;
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 0, &proof));
    }

    #[test]
    fn rejects_wrong_challenge() {
        let proof = build();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12346), 0, &proof));
    }

    #[test]
    fn rejects_wrong_index() {
        let proof = build();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 1, &proof));
    }

    #[test]
    fn rejects_short_proof() {
        let mut proof = build();
        proof.responses.pop();
        assert!(!verify_proof(&BigInt::from(P * Q), &BigInt::from(12345), 0, &proof));
    }

    #[test]
    fn rejects_square_modulus_premise() {
        // 1031^2 * 1063 is not square-free: N has no inverse mod phi.
        let n = BigInt::from(P * P * Q);
        let phi = BigInt::from(P) * BigInt::from(P - 1) * BigInt::from(Q - 1);
        assert!(build_proof(&n, &phi, &BigInt::from(12345), 0).is_err());
    }
}
