//! Proof that public values are squares modulo a committed `N`.
//!
//! Issuers use this for the public-key bases: each square `S_j` gets a
//! committed root, a range proof keeping the root below `N`, and one
//! modular multiplication proof `root·root ≡ S_j (mod N)`. The squares and
//! `N` themselves are public and enter the commitment list directly.

use crate::error::ProofError;
use crate::group::Group;
use crate::lookup::{BaseLookup, BaseMerge, ProofLookup, ProofMerge, SecretLookup, SecretMerge};
use crate::math;
use crate::multiplication::{
    MultiplicationProof, MultiplicationProofCommit, MultiplicationProofStructure,
};
use crate::pedersen::{self, PedersenProof, PedersenSecret};
use crate::rangeproof::{RangeCommit, RangeProof, RangeProofStructure};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

pub struct IsSquareProofStructure {
    n: BigInt,
    squares: Vec<BigInt>,

    n_rep: RepresentationProofStructure,
    squares_rep: Vec<RepresentationProofStructure>,
    roots_rep: Vec<RepresentationProofStructure>,
    roots_range: Vec<RangeProofStructure>,
    roots_valid: Vec<MultiplicationProofStructure>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IsSquareProof {
    #[serde(rename = "NProof")]
    pub n_proof: PedersenProof,
    #[serde(rename = "SquaresProof")]
    pub squares_proof: Vec<PedersenProof>,
    #[serde(rename = "RootsProof")]
    pub roots_proof: Vec<PedersenProof>,
    #[serde(rename = "RootsRangeProof")]
    pub roots_range_proof: Vec<RangeProof>,
    #[serde(rename = "RootsValidProof")]
    pub roots_valid_proof: Vec<MultiplicationProof>,
}

pub struct IsSquareProofCommit {
    squares: Vec<PedersenSecret>,
    roots: Vec<PedersenSecret>,
    n: PedersenSecret,

    root_range_commit: Vec<RangeCommit>,
    root_valid_commit: Vec<MultiplicationProofCommit>,
}

fn square_name(i: usize) -> String {
    format!("s_{i}")
}

fn root_name(i: usize) -> String {
    format!("r_{i}")
}

impl IsSquareProofStructure {
    pub fn new(n: &BigInt, squares: &[BigInt]) -> Self {
        let n_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new("N", -1),
                LhsContribution::with_power("g", n.clone()),
            ],
            vec![RhsContribution::new("h", "N_hider", -1)],
        );

        let squares_rep = squares
            .iter()
            .enumerate()
            .map(|(i, val)| {
                RepresentationProofStructure::new(
                    vec![
                        LhsContribution::new(&square_name(i), -1),
                        LhsContribution::with_power("g", val.clone()),
                    ],
                    vec![RhsContribution::new(
                        "h",
                        &pedersen::hider_name(&square_name(i)),
                        -1,
                    )],
                )
            })
            .collect();

        let bits = n.bits() as u32;
        IsSquareProofStructure {
            n: n.clone(),
            squares: squares.to_vec(),
            n_rep,
            squares_rep,
            roots_rep: (0..squares.len())
                .map(|i| pedersen::representation_structure(&root_name(i)))
                .collect(),
            roots_range: (0..squares.len())
                .map(|i| pedersen::range_structure(&root_name(i), 0, bits))
                .collect(),
            roots_valid: (0..squares.len())
                .map(|i| {
                    MultiplicationProofStructure::new(
                        &root_name(i),
                        &root_name(i),
                        "N",
                        &square_name(i),
                        bits,
                    )
                })
                .collect(),
        }
    }

    pub fn num_range_proofs(&self) -> usize {
        self.roots_range.len()
            + self
                .roots_valid
                .iter()
                .map(MultiplicationProofStructure::num_range_proofs)
                .sum::<usize>()
    }

    pub fn num_commitments(&self) -> usize {
        1 + self.squares.len()
            + 1
            + self.squares.len()
            + self.squares.len()
            + 1
            + self.squares_rep.len()
            + self.roots_rep.len()
            + self
                .roots_range
                .iter()
                .map(RangeProofStructure::num_commitments)
                .sum::<usize>()
            + self
                .roots_valid
                .iter()
                .map(MultiplicationProofStructure::num_commitments)
                .sum::<usize>()
    }

    /// Commits using the factorization of `N`; fails if a square has no
    /// root, which means the key material is inconsistent.
    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        p: &BigInt,
        q: &BigInt,
    ) -> Result<IsSquareProofCommit, ProofError> {
        let factors = [p.clone(), q.clone()];

        let squares: Vec<PedersenSecret> = self
            .squares
            .iter()
            .enumerate()
            .map(|(i, val)| PedersenSecret::new(g, &square_name(i), val))
            .collect();
        let mut roots = Vec::with_capacity(self.squares.len());
        for (i, val) in self.squares.iter().enumerate() {
            let root = math::mod_sqrt(val, &factors)?.ok_or(ProofError::NoSquareRoot)?;
            roots.push(PedersenSecret::new(g, &root_name(i), &root));
        }
        let n = PedersenSecret::new(g, "N", &self.n);

        let mut base_parts: Vec<&dyn BaseLookup> = Vec::new();
        let mut secret_parts: Vec<&dyn SecretLookup> = Vec::new();
        for ped in squares.iter().chain(roots.iter()) {
            base_parts.push(ped);
            secret_parts.push(ped);
        }
        base_parts.push(&n);
        secret_parts.push(&n);
        base_parts.push(g);
        let bases = BaseMerge::new(&base_parts);
        let secrets = SecretMerge::new(&secret_parts);

        list.push(self.n.clone());
        list.extend(self.squares.iter().cloned());
        n.commitments(list);
        for ped in &squares {
            ped.commitments(list);
        }
        for ped in &roots {
            ped.commitments(list);
        }
        self.n_rep.commitments_from_secrets(g, list, &bases, &secrets);
        for rep in &self.squares_rep {
            rep.commitments_from_secrets(g, list, &bases, &secrets);
        }
        for rep in &self.roots_rep {
            rep.commitments_from_secrets(g, list, &bases, &secrets);
        }
        let root_range_commit = self
            .roots_range
            .iter()
            .map(|range| range.commitments_from_secrets(g, list, &bases, &secrets))
            .collect();
        let root_valid_commit = self
            .roots_valid
            .iter()
            .map(|valid| valid.commitments_from_secrets(g, list, &bases, &secrets))
            .collect();

        Ok(IsSquareProofCommit {
            squares,
            roots,
            n,
            root_range_commit,
            root_valid_commit,
        })
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &IsSquareProofCommit,
    ) -> IsSquareProof {
        let mut secret_parts: Vec<&dyn SecretLookup> = Vec::new();
        for ped in commit.squares.iter().chain(commit.roots.iter()) {
            secret_parts.push(ped);
        }
        secret_parts.push(&commit.n);
        let secrets = SecretMerge::new(&secret_parts);

        IsSquareProof {
            n_proof: commit.n.build_proof(g, challenge),
            squares_proof: commit
                .squares
                .iter()
                .map(|ped| ped.build_proof(g, challenge))
                .collect(),
            roots_proof: commit
                .roots
                .iter()
                .map(|ped| ped.build_proof(g, challenge))
                .collect(),
            roots_range_proof: self
                .roots_range
                .iter()
                .zip(&commit.root_range_commit)
                .map(|(range, c)| range.build_proof(g, challenge, c, &secrets))
                .collect(),
            roots_valid_proof: self
                .roots_valid
                .iter()
                .zip(&commit.root_valid_commit)
                .map(|(valid, c)| valid.build_proof(g, challenge, c, &secrets))
                .collect(),
        }
    }

    pub fn verify_structure(&self, proof: &IsSquareProof) -> bool {
        if !proof.n_proof.verify_structure() {
            return false;
        }
        if proof.squares_proof.len() != self.squares.len()
            || proof.roots_proof.len() != self.squares.len()
            || proof.roots_range_proof.len() != self.squares.len()
            || proof.roots_valid_proof.len() != self.squares.len()
        {
            return false;
        }
        for i in 0..self.squares.len() {
            if !proof.squares_proof[i].verify_structure()
                || !proof.roots_proof[i].verify_structure()
                || !self.roots_range[i].verify_structure(&proof.roots_range_proof[i])
                || !self.roots_valid[i].verify_structure(&proof.roots_valid_proof[i])
            {
                return false;
            }
        }
        true
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        proof: &IsSquareProof,
    ) {
        let n_view = proof.n_proof.view("N");
        let square_views: Vec<_> = proof
            .squares_proof
            .iter()
            .enumerate()
            .map(|(i, p)| p.view(&square_name(i)))
            .collect();
        let root_views: Vec<_> = proof
            .roots_proof
            .iter()
            .enumerate()
            .map(|(i, p)| p.view(&root_name(i)))
            .collect();

        let mut base_parts: Vec<&dyn BaseLookup> = Vec::new();
        let mut proof_parts: Vec<&dyn ProofLookup> = Vec::new();
        for view in square_views.iter().chain(root_views.iter()) {
            base_parts.push(view);
            proof_parts.push(view);
        }
        base_parts.push(&n_view);
        proof_parts.push(&n_view);
        base_parts.push(g);
        let bases = BaseMerge::new(&base_parts);
        let proofs = ProofMerge::new(&proof_parts);

        list.push(self.n.clone());
        list.extend(self.squares.iter().cloned());
        proof.n_proof.commitments(list);
        for p in &proof.squares_proof {
            p.commitments(list);
        }
        for p in &proof.roots_proof {
            p.commitments(list);
        }
        self.n_rep
            .commitments_from_proof(g, list, challenge, &bases, &proofs);
        for rep in &self.squares_rep {
            rep.commitments_from_proof(g, list, challenge, &bases, &proofs);
        }
        for rep in &self.roots_rep {
            rep.commitments_from_proof(g, list, challenge, &bases, &proofs);
        }
        for (range, range_proof) in self.roots_range.iter().zip(&proof.roots_range_proof) {
            range.commitments_from_proof(g, list, challenge, &bases, range_proof);
        }
        for (valid, valid_proof) in self.roots_valid.iter().zip(&proof.roots_valid_proof) {
            valid.commitments_from_proof(g, list, challenge, &bases, &proofs, valid_proof);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::build_group;
    use num_integer::Integer;

    const P: i64 = 23;
    const Q: i64 = 7;

    #[test]
    fn commitment_lists_agree() {
        let _quiet = crate::follower::testutil::quiet_guard();
        let g = build_group(&BigInt::from(47)).unwrap();
        let n = BigInt::from(P * Q);
        let squares = vec![
            BigInt::from(4),
            BigInt::from(9).mod_floor(&n),
            (BigInt::from(12) * BigInt::from(12)).mod_floor(&n),
        ];

        let s = IsSquareProofStructure::new(&n, &squares);

        let mut from_secrets = Vec::new();
        let commit = s
            .commitments_from_secrets(&g, &mut from_secrets, &BigInt::from(P), &BigInt::from(Q))
            .expect("roots exist");
        assert_eq!(from_secrets.len(), s.num_commitments());

        let challenge = BigInt::from(12345);
        let proof = s.build_proof(&g, &challenge, &commit);
        assert!(s.verify_structure(&proof));

        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &challenge, &proof);

        assert_eq!(from_secrets, from_proof);
    }

    #[test]
    fn rejects_non_squares() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let n = BigInt::from(P * Q);
        let s = IsSquareProofStructure::new(&n, &[BigInt::from(5)]);
        let mut list = Vec::new();
        assert!(s
            .commitments_from_secrets(&g, &mut list, &BigInt::from(P), &BigInt::from(Q))
            .is_err());
    }

    #[test]
    fn structure_rejects_truncation() {
        let _quiet = crate::follower::testutil::quiet_guard();
        let g = build_group(&BigInt::from(47)).unwrap();
        let n = BigInt::from(P * Q);
        let squares = vec![BigInt::from(4), BigInt::from(9)];
        let s = IsSquareProofStructure::new(&n, &squares);

        let mut list = Vec::new();
        let commit = s
            .commitments_from_secrets(&g, &mut list, &BigInt::from(P), &BigInt::from(Q))
            .unwrap();
        let proof = s.build_proof(&g, &BigInt::from(12345), &commit);

        let mut short = proof.clone();
        short.roots_proof.pop();
        assert!(!s.verify_structure(&short));

        let mut missing = proof;
        missing.n_proof.commit = None;
        assert!(!s.verify_structure(&missing));
    }
}
