//! The top-level proof that `N` is a product of two safe primes.
//!
//! The prover generates a fresh proof group large enough to hold `N`-scale
//! exponents, commits to `P`, `Q`, `p'`, `q'`, ties them together with the
//! linear relations `P = 2p' + 1`, `Q = 2q' + 1` and the closing relation
//! `g^N = p^q · h^{-τ}`, attaches primality proofs for `p'` and `q'` plus
//! the quasi-safe-prime-product tests, and derives a single Fiat-Shamir
//! challenge over the flattened commitment list. The verifier rebuilds the
//! list from the proof and compares hashes.

use crate::bigint_serde;
use crate::cprng;
use crate::error::ProofError;
use crate::follower;
use crate::group::build_group;
use crate::hashing;
use crate::lookup::{BaseMerge, NamedResult, ProofMerge, SecretLookup, SecretMerge};
use crate::math;
use crate::params::RANGE_PROOF_EPSILON;
use crate::pedersen::{self, PedersenProof, PedersenSecret};
use crate::primeproof::{PrimeProof, PrimeProofStructure};
use crate::qspp::{self, QuasiSafePrimeProductProof};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "keyproof::safeprime";

pub struct SafePrimeProofStructure {
    n: BigInt,
    p_rep: RepresentationProofStructure,
    q_rep: RepresentationProofStructure,
    pprime_rep: RepresentationProofStructure,
    qprime_rep: RepresentationProofStructure,
    pp_prime_rel: RepresentationProofStructure,
    qq_prime_rel: RepresentationProofStructure,
    pqn_rel: RepresentationProofStructure,

    pprime_is_prime: PrimeProofStructure,
    qprime_is_prime: PrimeProofStructure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafePrimeProof {
    #[serde(rename = "GroupPrime", with = "bigint_serde::opt")]
    pub group_prime: Option<BigInt>,
    #[serde(rename = "Challenge", with = "bigint_serde::opt")]
    pub challenge: Option<BigInt>,

    #[serde(rename = "PProof")]
    pub p_proof: PedersenProof,
    #[serde(rename = "QProof")]
    pub q_proof: PedersenProof,
    #[serde(rename = "PprimeProof")]
    pub pprime_proof: PedersenProof,
    #[serde(rename = "QprimeProof")]
    pub qprime_proof: PedersenProof,

    #[serde(rename = "PQNRel", with = "bigint_serde::opt")]
    pub pqn_rel: Option<BigInt>,

    #[serde(rename = "PprimeIsPrimeProof")]
    pub pprime_is_prime_proof: PrimeProof,
    #[serde(rename = "QprimeIsPrimeProof")]
    pub qprime_is_prime_proof: PrimeProof,

    #[serde(rename = "QSPPproof")]
    pub qspp_proof: QuasiSafePrimeProductProof,
}

/// The closing-relation secret `τ = P_hider · Q_secret mod q`.
struct PqnRelSecret {
    value: BigInt,
    randomizer: BigInt,
}

impl SecretLookup for PqnRelSecret {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == "pqnrel" {
            Some(&self.value)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == "pqnrel" {
            Some(&self.randomizer)
        } else {
            None
        }
    }
}

impl SafePrimeProofStructure {
    pub fn new(n: &BigInt) -> Self {
        let prime_bits = (n.bits() as u32 + 1) / 2;

        let pp_prime_rel = RepresentationProofStructure::new(
            vec![
                LhsContribution::new("p", 1),
                LhsContribution::new("pprime", -2),
                LhsContribution::new("g", -1),
            ],
            vec![
                RhsContribution::new("h", "p_hider", 1),
                RhsContribution::new("h", "pprime_hider", -2),
            ],
        );
        let qq_prime_rel = RepresentationProofStructure::new(
            vec![
                LhsContribution::new("q", 1),
                LhsContribution::new("qprime", -2),
                LhsContribution::new("g", -1),
            ],
            vec![
                RhsContribution::new("h", "q_hider", 1),
                RhsContribution::new("h", "qprime_hider", -2),
            ],
        );
        let pqn_rel = RepresentationProofStructure::new(
            vec![LhsContribution::with_power("g", n.clone())],
            vec![
                RhsContribution::new("p", "q", 1),
                RhsContribution::new("h", "pqnrel", -1),
            ],
        );

        SafePrimeProofStructure {
            n: n.clone(),
            p_rep: pedersen::representation_structure("p"),
            q_rep: pedersen::representation_structure("q"),
            pprime_rep: pedersen::representation_structure("pprime"),
            qprime_rep: pedersen::representation_structure("qprime"),
            pp_prime_rel,
            qq_prime_rel,
            pqn_rel,
            pprime_is_prime: PrimeProofStructure::new("pprime", prime_bits),
            qprime_is_prime: PrimeProofStructure::new("qprime", prime_bits),
        }
    }

    fn group_prime_bits(&self) -> u64 {
        self.n.bits() + 2 * u64::from(RANGE_PROOF_EPSILON) + 10
    }

    pub fn num_range_proofs(&self) -> usize {
        self.pprime_is_prime.num_range_proofs() + self.qprime_is_prime.num_range_proofs()
    }

    /// Builds the complete proof from the two safe-prime halves.
    pub fn build_proof(
        &self,
        pprime: &BigInt,
        qprime: &BigInt,
    ) -> Result<SafePrimeProof, ProofError> {
        follower::step_start("Generating proof group", 0);
        let group_prime = math::generate_safe_prime(self.group_prime_bits() as u32)?;
        let g = build_group(&group_prime).ok_or(ProofError::GroupGeneration)?;
        follower::step_done();

        tracing::info!(target: LOG_TARGET, bits = group_prime.bits(), "proof group ready");

        let pprime_secret = PedersenSecret::new(&g, "pprime", pprime);
        let qprime_secret = PedersenSecret::new(&g, "qprime", qprime);
        let p_secret = PedersenSecret::new(&g, "p", &((pprime << 1) + BigInt::one()));
        let q_secret = PedersenSecret::new(&g, "q", &((qprime << 1) + BigInt::one()));

        let pqn_rel_secret = PqnRelSecret {
            value: g.mod_order(&(p_secret.hider_value() * q_secret.secret_value())),
            randomizer: cprng::random_big_int(g.order()),
        };

        let bases = BaseMerge::new(&[&g, &p_secret, &q_secret, &pprime_secret, &qprime_secret]);
        let secrets = SecretMerge::new(&[
            &p_secret,
            &q_secret,
            &pprime_secret,
            &qprime_secret,
            &pqn_rel_secret,
        ]);

        follower::step_start("Building commitments", self.num_range_proofs());
        let mut list = Vec::new();
        list.push(group_prime.clone());
        pprime_secret.commitments(&mut list);
        qprime_secret.commitments(&mut list);
        p_secret.commitments(&mut list);
        q_secret.commitments(&mut list);
        self.p_rep
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        self.q_rep
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        self.pprime_rep
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        self.qprime_rep
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        self.pp_prime_rel
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        self.qq_prime_rel
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        self.pqn_rel
            .commitments_from_secrets(&g, &mut list, &bases, &secrets);
        let pprime_commit =
            self.pprime_is_prime
                .commitments_from_secrets(&g, &mut list, &bases, &secrets)?;
        let qprime_commit =
            self.qprime_is_prime
                .commitments_from_secrets(&g, &mut list, &bases, &secrets)?;
        let qspp_commit = qspp::build_commitments(&mut list, pprime, qprime)?;
        follower::step_done();

        let challenge = hashing::hash_commit(&list);
        tracing::debug!(target: LOG_TARGET, commitments = list.len(), "challenge derived");

        follower::step_start("Computing responses", self.num_range_proofs());
        let proof = SafePrimeProof {
            group_prime: Some(group_prime),
            challenge: Some(challenge.clone()),
            pqn_rel: Some(g.mod_order(
                &(&pqn_rel_secret.randomizer - &challenge * &pqn_rel_secret.value),
            )),
            p_proof: p_secret.build_proof(&g, &challenge),
            q_proof: q_secret.build_proof(&g, &challenge),
            pprime_proof: pprime_secret.build_proof(&g, &challenge),
            qprime_proof: qprime_secret.build_proof(&g, &challenge),
            pprime_is_prime_proof: self.pprime_is_prime.build_proof(
                &g,
                &challenge,
                &pprime_commit,
                &secrets,
            ),
            qprime_is_prime_proof: self.qprime_is_prime.build_proof(
                &g,
                &challenge,
                &qprime_commit,
                &secrets,
            ),
            qspp_proof: qspp::build_proof(pprime, qprime, &challenge, qspp_commit)?,
        };
        follower::step_done();

        Ok(proof)
    }

    /// Checks a proof completely: structure, group parameters, commitment
    /// reconstruction, the Fiat-Shamir hash and the product tests.
    pub fn verify_proof(&self, proof: &SafePrimeProof) -> bool {
        let group_prime = match proof.group_prime.as_ref() {
            Some(p) => p,
            None => return false,
        };
        if group_prime.bits() != self.group_prime_bits() {
            return false;
        }
        if !math::probably_prime(group_prime) || !math::probably_prime(&(group_prime >> 1)) {
            return false;
        }

        let challenge = match proof.challenge.as_ref() {
            Some(c) => c,
            None => return false,
        };
        if proof.pqn_rel.is_none() {
            return false;
        }
        if !proof.p_proof.verify_structure()
            || !proof.q_proof.verify_structure()
            || !proof.pprime_proof.verify_structure()
            || !proof.qprime_proof.verify_structure()
        {
            return false;
        }
        if !self
            .pprime_is_prime
            .verify_structure(challenge, &proof.pprime_is_prime_proof)
            || !self
                .qprime_is_prime
                .verify_structure(challenge, &proof.qprime_is_prime_proof)
        {
            return false;
        }
        if !qspp::verify_structure(&proof.qspp_proof) {
            return false;
        }

        let g = match build_group(group_prime) {
            Some(g) => g,
            None => return false,
        };

        let p_view = proof.p_proof.view("p");
        let q_view = proof.q_proof.view("q");
        let pprime_view = proof.pprime_proof.view("pprime");
        let qprime_view = proof.qprime_proof.view("qprime");
        let pqn_rel_result = NamedResult::new("pqnrel".to_owned(), proof.pqn_rel.as_ref());

        let bases = BaseMerge::new(&[&g, &p_view, &q_view, &pprime_view, &qprime_view]);
        let proofs = ProofMerge::new(&[
            &p_view,
            &q_view,
            &pprime_view,
            &qprime_view,
            &pqn_rel_result,
        ]);

        follower::step_start("Reconstructing commitments", self.num_range_proofs());
        let mut list = Vec::new();
        list.push(group_prime.clone());
        proof.pprime_proof.commitments(&mut list);
        proof.qprime_proof.commitments(&mut list);
        proof.p_proof.commitments(&mut list);
        proof.q_proof.commitments(&mut list);
        self.p_rep
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.q_rep
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.pprime_rep
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.qprime_rep
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.pp_prime_rel
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.qq_prime_rel
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.pqn_rel
            .commitments_from_proof(&g, &mut list, challenge, &bases, &proofs);
        self.pprime_is_prime.commitments_from_proof(
            &g,
            &mut list,
            challenge,
            &bases,
            &proofs,
            &proof.pprime_is_prime_proof,
        );
        self.qprime_is_prime.commitments_from_proof(
            &g,
            &mut list,
            challenge,
            &bases,
            &proofs,
            &proof.qprime_is_prime_proof,
        );
        qspp::extract_commitments(&mut list, &proof.qspp_proof);
        follower::step_done();

        if *challenge != hashing::hash_commit(&list) {
            tracing::debug!(target: LOG_TARGET, "challenge mismatch");
            return false;
        }

        qspp::verify_proof(&self.n, challenge, &proof.qspp_proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PPRIME: i64 = 13451;
    const QPRIME: i64 = 13901;

    fn structure() -> SafePrimeProofStructure {
        SafePrimeProofStructure::new(&BigInt::from((2 * PPRIME + 1) * (2 * QPRIME + 1)))
    }

    #[test]
    fn build_verify_and_perturb() {
        let _quiet = crate::follower::testutil::quiet_guard();
        let s = structure();
        let proof = s
            .build_proof(&BigInt::from(PPRIME), &BigInt::from(QPRIME))
            .expect("proof construction");

        assert!(s.verify_proof(&proof), "honest proof rejected");

        // Round trip through the wire format.
        let json = serde_json::to_string(&proof).unwrap();
        let restored: SafePrimeProof = serde_json::from_str(&json).unwrap();
        assert!(s.verify_proof(&restored), "serialized proof rejected");

        // Each single-field perturbation must invalidate the proof.
        let mut bad = proof.clone();
        bad.group_prime = Some(BigInt::from(10009));
        assert!(!s.verify_proof(&bad), "wrong group prime accepted");

        let mut bad = proof.clone();
        bad.challenge = Some(BigInt::one());
        assert!(!s.verify_proof(&bad), "forged challenge accepted");

        let mut bad = proof.clone();
        bad.p_proof.commit = None;
        assert!(!s.verify_proof(&bad), "missing p commit accepted");

        let mut bad = proof.clone();
        bad.qprime_proof.h_result = None;
        assert!(!s.verify_proof(&bad), "missing hider response accepted");

        let mut bad = proof.clone();
        bad.pqn_rel = None;
        assert!(!s.verify_proof(&bad), "missing closing relation accepted");

        let mut bad = proof.clone();
        bad.pprime_is_prime_proof.prea_mod_result = None;
        assert!(!s.verify_proof(&bad), "missing prea mod result accepted");

        let mut bad = proof.clone();
        bad.qprime_is_prime_proof.a_exp_proof.exp_bit_eq_result = None;
        assert!(!s.verify_proof(&bad), "missing nested response accepted");

        let mut bad = proof.clone();
        bad.qspp_proof.sf_proof.responses[0] += 1;
        assert!(!s.verify_proof(&bad), "tampered square-free response accepted");
    }
}
