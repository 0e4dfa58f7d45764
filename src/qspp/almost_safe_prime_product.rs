//! Almost-safe-prime structure of the modulus.
//!
//! A commit-and-respond proof of knowledge of `N - φ(N)`, which for
//! `N = (2p'+1)(2q'+1)` equals the short value `2(p'+q') + 1`. Bases are
//! derived from a fresh 256-bit nonce, commitments `a_i^{r_i}` enter the
//! Fiat-Shamir hash, and responses `r_i + c_i·(N - φ(N))` verify against
//! `a_i^{s_i} = C_i · (a_i^N)^{c_i}` since `a^(N-φ(N)) = a^N`. The
//! verifier's size bound on the responses pins `φ(N)` close to `N`, the
//! structure the other product tests cannot see.

use crate::bigint_serde;
use crate::cprng;
use crate::error::ProofError;
use crate::hashing;
use crate::params::{
    ALMOST_SAFE_PRIME_PRODUCT_ITERS, ALMOST_SAFE_PRIME_PRODUCT_NONCE_BITS, RANGE_PROOF_EPSILON,
};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed};
use serde::{Deserialize, Serialize};

pub struct AlmostSafePrimeProductCommit {
    nonce: BigInt,
    logs: Vec<BigInt>,
    commitments: Vec<BigInt>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlmostSafePrimeProductProof {
    #[serde(rename = "Nonce", with = "bigint_serde::int")]
    pub nonce: BigInt,
    #[serde(rename = "Commitments", with = "bigint_serde::seq")]
    pub commitments: Vec<BigInt>,
    #[serde(rename = "Responses", with = "bigint_serde::seq")]
    pub responses: Vec<BigInt>,
}

fn modulus_of(pprime: &BigInt, qprime: &BigInt) -> BigInt {
    ((pprime << 1) + BigInt::one()) * ((qprime << 1) + BigInt::one())
}

fn base(nonce: &BigInt, i: i64, n: &BigInt) -> BigInt {
    hashing::get_hash_number(Some(nonce), None, i, n.bits() as u32).mod_floor(n)
}

fn response_challenge(challenge: &BigInt, index: i64, i: i64) -> BigInt {
    hashing::get_hash_number(
        Some(challenge),
        Some(&BigInt::from(index)),
        i,
        RANGE_PROOF_EPSILON,
    )
}

/// Randomizers are `2^(2·epsilon)` wider than the largest `c_i·(N - φ(N))`.
fn randomizer_bits(n: &BigInt) -> u32 {
    n.bits() as u32 / 2 + 2 * RANGE_PROOF_EPSILON + 2
}

pub fn build_commitments(
    list: &mut Vec<BigInt>,
    pprime: &BigInt,
    qprime: &BigInt,
) -> Result<AlmostSafePrimeProductCommit, ProofError> {
    let n = modulus_of(pprime, qprime);
    let nonce = cprng::random_big_int(&(BigInt::one() << ALMOST_SAFE_PRIME_PRODUCT_NONCE_BITS));
    let log_limit = BigInt::one() << randomizer_bits(&n);

    let mut logs = Vec::with_capacity(ALMOST_SAFE_PRIME_PRODUCT_ITERS);
    let mut commitments = Vec::with_capacity(ALMOST_SAFE_PRIME_PRODUCT_ITERS);
    for i in 0..ALMOST_SAFE_PRIME_PRODUCT_ITERS {
        let base = base(&nonce, i as i64, &n);
        if !base.gcd(&n).is_one() {
            return Err(ProofError::ChallengeOutsideGroup);
        }
        let log = cprng::random_big_int(&log_limit);
        let commitment = base.modpow(&log, &n);
        list.push(commitment.clone());
        commitments.push(commitment);
        logs.push(log);
    }

    Ok(AlmostSafePrimeProductCommit {
        nonce,
        logs,
        commitments,
    })
}

pub fn build_proof(
    pprime: &BigInt,
    qprime: &BigInt,
    challenge: &BigInt,
    index: i64,
    commit: AlmostSafePrimeProductCommit,
) -> AlmostSafePrimeProductProof {
    let n = modulus_of(pprime, qprime);
    let phi_n: BigInt = (pprime * qprime) << 2;
    let witness = &n - phi_n;

    let responses = commit
        .logs
        .iter()
        .enumerate()
        .map(|(i, log)| log + response_challenge(challenge, index, i as i64) * &witness)
        .collect();

    AlmostSafePrimeProductProof {
        nonce: commit.nonce,
        commitments: commit.commitments,
        responses,
    }
}

pub fn verify_structure(proof: &AlmostSafePrimeProductProof) -> bool {
    proof.commitments.len() == ALMOST_SAFE_PRIME_PRODUCT_ITERS
        && proof.responses.len() == ALMOST_SAFE_PRIME_PRODUCT_ITERS
}

/// Re-adds the prover's commitments to the hash input list.
pub fn extract_commitments(list: &mut Vec<BigInt>, proof: &AlmostSafePrimeProductProof) {
    list.extend(proof.commitments.iter().cloned());
}

pub fn verify_proof(
    n: &BigInt,
    challenge: &BigInt,
    index: i64,
    proof: &AlmostSafePrimeProductProof,
) -> bool {
    if !verify_structure(proof) {
        return false;
    }

    let response_limit = BigInt::one() << (randomizer_bits(n) + 1);
    for i in 0..ALMOST_SAFE_PRIME_PRODUCT_ITERS {
        let response = &proof.responses[i];
        if response.is_negative() || *response >= response_limit {
            return false;
        }

        let base = base(&proof.nonce, i as i64, n);
        if !base.gcd(n).is_one() {
            return false;
        }

        let c = response_challenge(challenge, index, i as i64);
        let lhs = base.modpow(response, n);
        let rhs = (&proof.commitments[i] % n) * base.modpow(n, n).modpow(&c, n);
        if lhs != rhs.mod_floor(n) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: i64 = 13451;
    const Q: i64 = 13901;

    fn n() -> BigInt {
        BigInt::from((2 * P + 1) * (2 * Q + 1))
    }

    fn build() -> (Vec<BigInt>, AlmostSafePrimeProductProof) {
        let mut list = Vec::new();
        let commit = build_commitments(&mut list, &BigInt::from(P), &BigInt::from(Q)).unwrap();
        let proof = build_proof(&BigInt::from(P), &BigInt::from(Q), &BigInt::from(12345), 3, commit);
        (list, proof)
    }

    #[test]
    fn cycle() {
        let (list_before, proof) = build();
        let mut list_after = Vec::new();
        extract_commitments(&mut list_after, &proof);
        assert!(verify_proof(&n(), &BigInt::from(12345), 3, &proof));
        assert_eq!(list_before, list_after);
    }

    #[test]
    fn rejects_perturbed_nonce() {
        let (_, mut proof) = build();
        proof.nonce -= 1;
        assert!(!verify_proof(&n(), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_perturbed_commitment() {
        let (_, mut proof) = build();
        proof.commitments[0] += 1;
        assert!(!verify_proof(&n(), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_perturbed_response() {
        let (_, mut proof) = build();
        proof.responses[0] += 1;
        assert!(!verify_proof(&n(), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_short_commitments() {
        let (_, mut proof) = build();
        proof.commitments.pop();
        assert!(!verify_proof(&n(), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_short_responses() {
        let (_, mut proof) = build();
        proof.responses.pop();
        assert!(!verify_proof(&n(), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_empty_proof() {
        let proof = AlmostSafePrimeProductProof {
            nonce: BigInt::from(12345),
            commitments: vec![],
            responses: vec![],
        };
        assert!(!verify_proof(&n(), &BigInt::from(12345), 3, &proof));
    }

    #[test]
    fn rejects_wrong_challenge() {
        let (_, proof) = build();
        assert!(!verify_proof(&n(), &BigInt::from(12346), 3, &proof));
    }
}
