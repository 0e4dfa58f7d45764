//! Quasi-safe-prime-product proof.
//!
//! Four classical tests bundled: square-freeness, at most two prime-power
//! factors, two distinct `≡ 3 (mod 4)` prime factors, and the
//! almost-safe-prime structure of `φ(N)`. The bundle additionally requires
//! `N ≡ 5 (mod 8)` — the property that separates quasi from almost safe —
//! and that `N` shares no factor below the minimum-factor bound.

pub mod almost_safe_prime_product;
pub mod disjoint_prime_product;
pub mod prime_power_product;
pub mod square_free;

use crate::error::ProofError;
use crate::params::MINIMUM_FACTOR;
use almost_safe_prime_product::{AlmostSafePrimeProductCommit, AlmostSafePrimeProductProof};
use disjoint_prime_product::DisjointPrimeProductProof;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed};
use prime_power_product::PrimePowerProductProof;
use serde::{Deserialize, Serialize};
use square_free::SquareFreeProof;

const SQUARE_FREE_INDEX: i64 = 0;
const PRIME_POWER_PRODUCT_INDEX: i64 = 1;
const DISJOINT_PRIME_PRODUCT_INDEX: i64 = 2;
const ALMOST_SAFE_PRIME_PRODUCT_INDEX: i64 = 3;

pub struct QuasiSafePrimeProductCommit {
    aspp_commit: AlmostSafePrimeProductCommit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuasiSafePrimeProductProof {
    #[serde(rename = "SFproof")]
    pub sf_proof: SquareFreeProof,
    #[serde(rename = "PPPproof")]
    pub ppp_proof: PrimePowerProductProof,
    #[serde(rename = "DPPproof")]
    pub dpp_proof: DisjointPrimeProductProof,
    #[serde(rename = "ASPPproof")]
    pub aspp_proof: AlmostSafePrimeProductProof,
}

pub fn build_commitments(
    list: &mut Vec<BigInt>,
    pprime: &BigInt,
    qprime: &BigInt,
) -> Result<QuasiSafePrimeProductCommit, ProofError> {
    let aspp_commit = almost_safe_prime_product::build_commitments(list, pprime, qprime)?;
    Ok(QuasiSafePrimeProductCommit { aspp_commit })
}

pub fn build_proof(
    pprime: &BigInt,
    qprime: &BigInt,
    challenge: &BigInt,
    commit: QuasiSafePrimeProductCommit,
) -> Result<QuasiSafePrimeProductProof, ProofError> {
    let p: BigInt = (pprime << 1) + BigInt::one();
    let q: BigInt = (qprime << 1) + BigInt::one();
    let n = &p * &q;
    let phi_n: BigInt = (pprime * qprime) << 2;

    Ok(QuasiSafePrimeProductProof {
        sf_proof: square_free::build_proof(&n, &phi_n, challenge, SQUARE_FREE_INDEX)?,
        ppp_proof: prime_power_product::build_proof(
            &p,
            &q,
            challenge,
            PRIME_POWER_PRODUCT_INDEX,
        )?,
        dpp_proof: disjoint_prime_product::build_proof(
            &p,
            &q,
            challenge,
            DISJOINT_PRIME_PRODUCT_INDEX,
        )?,
        aspp_proof: almost_safe_prime_product::build_proof(
            pprime,
            qprime,
            challenge,
            ALMOST_SAFE_PRIME_PRODUCT_INDEX,
            commit.aspp_commit,
        ),
    })
}

pub fn verify_structure(proof: &QuasiSafePrimeProductProof) -> bool {
    square_free::verify_structure(&proof.sf_proof)
        && prime_power_product::verify_structure(&proof.ppp_proof)
        && disjoint_prime_product::verify_structure(&proof.dpp_proof)
        && almost_safe_prime_product::verify_structure(&proof.aspp_proof)
}

pub fn extract_commitments(list: &mut Vec<BigInt>, proof: &QuasiSafePrimeProductProof) {
    almost_safe_prime_product::extract_commitments(list, &proof.aspp_proof);
}

pub fn verify_proof(n: &BigInt, challenge: &BigInt, proof: &QuasiSafePrimeProductProof) -> bool {
    if !n.is_positive() {
        return false;
    }

    // What separates quasi from almost safe prime products.
    if n.mod_floor(&BigInt::from(8)) != BigInt::from(5) {
        return false;
    }

    // Minimum factor rule.
    for k in 2..MINIMUM_FACTOR {
        if !n.gcd(&BigInt::from(k)).is_one() {
            return false;
        }
    }

    square_free::verify_proof(n, challenge, SQUARE_FREE_INDEX, &proof.sf_proof)
        && prime_power_product::verify_proof(
            n,
            challenge,
            PRIME_POWER_PRODUCT_INDEX,
            &proof.ppp_proof,
        )
        && disjoint_prime_product::verify_proof(
            n,
            challenge,
            DISJOINT_PRIME_PRODUCT_INDEX,
            &proof.dpp_proof,
        )
        && almost_safe_prime_product::verify_proof(
            n,
            challenge,
            ALMOST_SAFE_PRIME_PRODUCT_INDEX,
            &proof.aspp_proof,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing;

    const P: i64 = 13451;
    const Q: i64 = 13901;

    fn n() -> BigInt {
        BigInt::from((2 * P + 1) * (2 * Q + 1))
    }

    #[test]
    fn cycle_with_fixed_challenge() {
        let mut list_before = Vec::new();
        let commit =
            build_commitments(&mut list_before, &BigInt::from(P), &BigInt::from(Q)).unwrap();
        let proof =
            build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), commit).unwrap();
        assert!(verify_structure(&proof));

        let mut list_after = Vec::new();
        extract_commitments(&mut list_after, &proof);
        assert_eq!(list_before, list_after);

        assert!(verify_proof(&n(), &BigInt::from(12345), &proof));
    }

    #[test]
    fn full_cycle_through_hash_and_json() {
        let mut list_before = Vec::new();
        let commit =
            build_commitments(&mut list_before, &BigInt::from(P), &BigInt::from(Q)).unwrap();
        let challenge_before = hashing::hash_commit(&list_before);
        let proof_before =
            build_proof(&BigInt::from(P), &BigInt::from(Q), &challenge_before, commit).unwrap();

        let json = serde_json::to_string(&proof_before).unwrap();
        let proof_after: QuasiSafePrimeProductProof = serde_json::from_str(&json).unwrap();

        let mut list_after = Vec::new();
        extract_commitments(&mut list_after, &proof_after);
        let challenge_after = hashing::hash_commit(&list_after);
        assert_eq!(challenge_before, challenge_after);

        assert!(verify_proof(&n(), &challenge_after, &proof_after));
    }

    #[test]
    fn rejects_wrong_modulus_class() {
        let mut list = Vec::new();
        let commit = build_commitments(&mut list, &BigInt::from(P), &BigInt::from(Q)).unwrap();
        let proof =
            build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), commit).unwrap();
        // 3 mod 8, so the quasi gate fails regardless of the sub-proofs.
        assert!(!verify_proof(&BigInt::from(3), &BigInt::from(12345), &proof));
    }

    #[test]
    fn rejects_small_factors() {
        let mut list = Vec::new();
        let commit = build_commitments(&mut list, &BigInt::from(P), &BigInt::from(Q)).unwrap();
        let proof =
            build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), commit).unwrap();
        // 21 = 3·7 is 5 mod 8 but trips the minimum-factor rule.
        assert!(!verify_proof(&BigInt::from(21), &BigInt::from(12345), &proof));
    }

    #[test]
    fn structure_rejects_truncation() {
        let mut list = Vec::new();
        let commit = build_commitments(&mut list, &BigInt::from(P), &BigInt::from(Q)).unwrap();
        let mut proof =
            build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), commit).unwrap();
        proof.sf_proof.responses.pop();
        assert!(!verify_structure(&proof));
    }
}
