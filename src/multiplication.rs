//! Proof that committed values satisfy `m1·m2 ≡ result (mod modulus)`.
//!
//! The quotient `(m1·m2 - result)/modulus` becomes a fresh Pedersen secret,
//! range-proved short, and one representation statement ties the four
//! commitments together:
//!     result = base_m2^m1 · base_mod^{-quotient} · h^hider
//! where the exponent `m1` is itself a committed secret.

use crate::group::Group;
use crate::lookup::{
    BaseLookup, BaseMerge, NamedResult, ProofLookup, ProofMerge, SecretLookup, SecretMerge,
};
use crate::pedersen::{self, PedersenProof, PedersenSecret};
use crate::rangeproof::{RangeCommit, RangeProof, RangeProofStructure};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct MultiplicationProofStructure {
    m1: String,
    m2: String,
    modulus: String,
    result: String,
    myname: String,
    mult_rep: RepresentationProofStructure,
    mod_mult_rep: RepresentationProofStructure,
    mod_mult_range: RangeProofStructure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiplicationProof {
    #[serde(rename = "ModMultProof")]
    pub mod_mult_proof: PedersenProof,
    #[serde(rename = "HiderResult", with = "crate::bigint_serde::opt")]
    pub hider_result: Option<BigInt>,
    #[serde(rename = "RangeProof")]
    pub range_proof: RangeProof,
}

pub struct MultiplicationProofCommit {
    hider_name: String,
    mod_mult_pedersen: PedersenSecret,
    hider: BigInt,
    hider_randomizer: BigInt,
    range_commit: RangeCommit,
}

impl SecretLookup for MultiplicationProofCommit {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == self.hider_name {
            Some(&self.hider)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.hider_name {
            Some(&self.hider_randomizer)
        } else {
            None
        }
    }
}

impl MultiplicationProofStructure {
    /// `m1`, `m2`, `modulus` and `result` name Pedersen commitments known to
    /// the surrounding bases and secrets.
    pub fn new(m1: &str, m2: &str, modulus: &str, result: &str, l: u32) -> Self {
        let myname = format!("{m1}_{m2}_{modulus}_{result}_mul");
        let quotient = format!("{myname}_mod");
        let mult_rep = RepresentationProofStructure::new(
            vec![LhsContribution::new(result, 1)],
            vec![
                RhsContribution::new(m2, m1, 1),
                RhsContribution::new(modulus, &quotient, -1),
                RhsContribution::new("h", &pedersen::hider_name(&myname), 1),
            ],
        );
        MultiplicationProofStructure {
            m1: m1.to_owned(),
            m2: m2.to_owned(),
            modulus: modulus.to_owned(),
            result: result.to_owned(),
            mod_mult_rep: pedersen::representation_structure(&quotient),
            mod_mult_range: pedersen::range_structure(&quotient, 0, l),
            mult_rep,
            myname,
        }
    }

    fn quotient_name(&self) -> String {
        format!("{}_mod", self.myname)
    }

    pub fn num_range_proofs(&self) -> usize {
        1
    }

    pub fn num_commitments(&self) -> usize {
        self.mult_rep.num_commitments()
            + self.mod_mult_rep.num_commitments()
            + self.mod_mult_range.num_commitments()
            + 1
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> MultiplicationProofCommit {
        let m1 = secrets.secret(&self.m1).expect("m1 secret");
        let m2 = secrets.secret(&self.m2).expect("m2 secret");
        let modulus = secrets.secret(&self.modulus).expect("mod secret");
        let result = secrets.secret(&self.result).expect("result secret");

        let quotient = (m1 * m2 - result).div_floor(modulus);
        let mod_mult_pedersen = PedersenSecret::new(g, &self.quotient_name(), &quotient);

        let result_hider = secrets
            .secret(&pedersen::hider_name(&self.result))
            .expect("result hider");
        let m2_hider = secrets
            .secret(&pedersen::hider_name(&self.m2))
            .expect("m2 hider");
        let mod_hider = secrets
            .secret(&pedersen::hider_name(&self.modulus))
            .expect("mod hider");
        let hider = g.mod_order(
            &(result_hider - m1 * m2_hider + mod_mult_pedersen.secret_value() * mod_hider),
        );

        let commit = MultiplicationProofCommit {
            hider_name: pedersen::hider_name(&self.myname),
            hider,
            hider_randomizer: crate::cprng::random_big_int(g.order()),
            mod_mult_pedersen,
            range_commit: RangeCommit::empty(),
        };

        let inner = SecretMerge::new(&[&commit, &commit.mod_mult_pedersen, secrets]);

        commit.mod_mult_pedersen.commitments(list);
        self.mult_rep.commitments_from_secrets(g, list, bases, &inner);
        self.mod_mult_rep
            .commitments_from_secrets(g, list, bases, &inner);
        let range_commit = self
            .mod_mult_range
            .commitments_from_secrets(g, list, bases, &inner);

        MultiplicationProofCommit {
            range_commit,
            ..commit
        }
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &MultiplicationProofCommit,
        secrets: &dyn SecretLookup,
    ) -> MultiplicationProof {
        let inner = SecretMerge::new(&[commit, &commit.mod_mult_pedersen, secrets]);
        let range_proof =
            self.mod_mult_range
                .build_proof(g, challenge, &commit.range_commit, &inner);
        let mod_mult_proof = commit.mod_mult_pedersen.build_proof(g, challenge);
        let hider_result =
            Some(g.mod_order(&(&commit.hider_randomizer - challenge * &commit.hider)));

        MultiplicationProof {
            mod_mult_proof,
            hider_result,
            range_proof,
        }
    }

    pub fn fake_proof(&self, g: &Group) -> MultiplicationProof {
        MultiplicationProof {
            mod_mult_proof: PedersenProof::fake(g),
            hider_result: Some(crate::cprng::random_big_int(g.order())),
            range_proof: self.mod_mult_range.fake_proof(g),
        }
    }

    pub fn verify_structure(&self, proof: &MultiplicationProof) -> bool {
        self.mod_mult_range.verify_structure(&proof.range_proof)
            && proof.mod_mult_proof.verify_structure()
            && proof.hider_result.is_some()
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof_data: &dyn ProofLookup,
        proof: &MultiplicationProof,
    ) {
        let mod_view = proof.mod_mult_proof.view(&self.quotient_name());
        let hider = NamedResult::new(
            pedersen::hider_name(&self.myname),
            proof.hider_result.as_ref(),
        );
        let proofs = ProofMerge::new(&[&hider, &mod_view, proof_data]);
        let inner_bases = BaseMerge::new(&[&mod_view, bases]);

        proof.mod_mult_proof.commitments(list);
        self.mult_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.mod_mult_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.mod_mult_range
            .commitments_from_proof(g, list, challenge, &inner_bases, &proof.range_proof);
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        let (m1, m2, modulus, result) = match (
            secrets.secret(&self.m1),
            secrets.secret(&self.m2),
            secrets.secret(&self.modulus),
            secrets.secret(&self.result),
        ) {
            (Some(a), Some(b), Some(m), Some(r)) => (a, b, m, r),
            _ => return false,
        };

        let (div, rem) = (m1 * m2 - result).div_mod_floor(modulus);
        rem.is_zero() && div.bits() <= u64::from(self.mod_mult_range.l2)
    }
}
