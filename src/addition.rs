//! Proof that committed values satisfy `a1 + a2 ≡ result (mod modulus)`.
//!
//! Analogous to the multiplication proof but without a product term: the
//! quotient `(result - a1 - a2)/modulus` is the only fresh secret, and it is
//! range-proved short.

use crate::group::Group;
use crate::lookup::{BaseLookup, ProofLookup, ProofMerge, SecretLookup, SecretMerge};
use crate::pedersen;
use crate::rangeproof::{RangeCommit, RangeProof, RangeProofStructure};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct AdditionProofStructure {
    a1: String,
    a2: String,
    modulus: String,
    result: String,
    myname: String,
    add_rep: RepresentationProofStructure,
    add_range: RangeProofStructure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdditionProof {
    #[serde(rename = "ModAddResult", with = "crate::bigint_serde::opt")]
    pub mod_add_result: Option<BigInt>,
    #[serde(rename = "HiderResult", with = "crate::bigint_serde::opt")]
    pub hider_result: Option<BigInt>,
    #[serde(rename = "RangeProof")]
    pub range_proof: RangeProof,
}

pub struct AdditionProofCommit {
    mod_name: String,
    hider_name: String,
    mod_add: BigInt,
    mod_add_randomizer: BigInt,
    hider: BigInt,
    hider_randomizer: BigInt,
    range_commit: RangeCommit,
}

impl SecretLookup for AdditionProofCommit {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == self.mod_name {
            Some(&self.mod_add)
        } else if name == self.hider_name {
            Some(&self.hider)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.mod_name {
            Some(&self.mod_add_randomizer)
        } else if name == self.hider_name {
            Some(&self.hider_randomizer)
        } else {
            None
        }
    }
}

struct AdditionProofView<'a> {
    mod_name: String,
    hider_name: String,
    proof: &'a AdditionProof,
}

impl ProofLookup for AdditionProofView<'_> {
    fn result(&self, name: &str) -> Option<&BigInt> {
        if name == self.mod_name {
            self.proof.mod_add_result.as_ref()
        } else if name == self.hider_name {
            self.proof.hider_result.as_ref()
        } else {
            None
        }
    }
}

impl AdditionProofStructure {
    pub fn new(a1: &str, a2: &str, modulus: &str, result: &str, l: u32) -> Self {
        let myname = format!("{a1}_{a2}_{modulus}_{result}_add");
        let quotient = format!("{myname}_mod");
        let add_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(result, 1),
                LhsContribution::new(a1, -1),
                LhsContribution::new(a2, -1),
            ],
            vec![
                RhsContribution::new(modulus, &quotient, 1),
                RhsContribution::new("h", &pedersen::hider_name(&myname), 1),
            ],
        );
        let add_range = RangeProofStructure {
            rep: add_rep.clone(),
            range_secret: quotient,
            l1: 0,
            l2: l,
        };
        AdditionProofStructure {
            a1: a1.to_owned(),
            a2: a2.to_owned(),
            modulus: modulus.to_owned(),
            result: result.to_owned(),
            myname,
            add_rep,
            add_range,
        }
    }

    pub fn num_range_proofs(&self) -> usize {
        1
    }

    pub fn num_commitments(&self) -> usize {
        self.add_rep.num_commitments() + self.add_range.num_commitments()
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> AdditionProofCommit {
        let a1 = secrets.secret(&self.a1).expect("a1 secret");
        let a2 = secrets.secret(&self.a2).expect("a2 secret");
        let modulus = secrets.secret(&self.modulus).expect("mod secret");
        let result = secrets.secret(&self.result).expect("result secret");

        let mod_add = (result - (a1 + a2)).div_floor(modulus);

        let result_hider = secrets
            .secret(&pedersen::hider_name(&self.result))
            .expect("result hider");
        let a1_hider = secrets
            .secret(&pedersen::hider_name(&self.a1))
            .expect("a1 hider");
        let a2_hider = secrets
            .secret(&pedersen::hider_name(&self.a2))
            .expect("a2 hider");
        let mod_hider = secrets
            .secret(&pedersen::hider_name(&self.modulus))
            .expect("mod hider");
        let hider = g.mod_order(&(result_hider - (a1_hider + a2_hider + mod_hider * &mod_add)));

        let commit = AdditionProofCommit {
            mod_name: format!("{}_mod", self.myname),
            hider_name: pedersen::hider_name(&self.myname),
            mod_add,
            mod_add_randomizer: crate::cprng::random_big_int(g.order()),
            hider,
            hider_randomizer: crate::cprng::random_big_int(g.order()),
            range_commit: RangeCommit::empty(),
        };

        let inner = SecretMerge::new(&[&commit, secrets]);

        self.add_rep.commitments_from_secrets(g, list, bases, &inner);
        let range_commit = self
            .add_range
            .commitments_from_secrets(g, list, bases, &inner);

        AdditionProofCommit {
            range_commit,
            ..commit
        }
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &AdditionProofCommit,
        secrets: &dyn SecretLookup,
    ) -> AdditionProof {
        let inner = SecretMerge::new(&[commit, secrets]);
        let range_proof = self
            .add_range
            .build_proof(g, challenge, &commit.range_commit, &inner);

        AdditionProof {
            mod_add_result: Some(
                g.mod_order(&(&commit.mod_add_randomizer - challenge * &commit.mod_add)),
            ),
            hider_result: Some(
                g.mod_order(&(&commit.hider_randomizer - challenge * &commit.hider)),
            ),
            range_proof,
        }
    }

    pub fn fake_proof(&self, g: &Group) -> AdditionProof {
        AdditionProof {
            mod_add_result: Some(crate::cprng::random_big_int(g.order())),
            hider_result: Some(crate::cprng::random_big_int(g.order())),
            range_proof: self.add_range.fake_proof(g),
        }
    }

    pub fn verify_structure(&self, proof: &AdditionProof) -> bool {
        self.add_range.verify_structure(&proof.range_proof)
            && proof.mod_add_result.is_some()
            && proof.hider_result.is_some()
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof_data: &dyn ProofLookup,
        proof: &AdditionProof,
    ) {
        let view = AdditionProofView {
            mod_name: format!("{}_mod", self.myname),
            hider_name: pedersen::hider_name(&self.myname),
            proof,
        };
        let proofs = ProofMerge::new(&[&view, proof_data]);

        self.add_rep
            .commitments_from_proof(g, list, challenge, bases, &proofs);
        self.add_range
            .commitments_from_proof(g, list, challenge, bases, &proof.range_proof);
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        let (a1, a2, modulus, result) = match (
            secrets.secret(&self.a1),
            secrets.secret(&self.a2),
            secrets.secret(&self.modulus),
            secrets.secret(&self.result),
        ) {
            (Some(a), Some(b), Some(m), Some(r)) => (a, b, m, r),
            _ => return false,
        };

        let (div, rem) = (result - (a1 + a2)).div_mod_floor(modulus);
        rem.is_zero() && div.bits() <= u64::from(self.add_range.l2)
    }
}
