//! One step of committed square-and-multiply.
//!
//! Conditioned on a committed bit: either the bit is 0 and the accumulator
//! is unchanged (shape A), or the bit is 1 and the accumulator is multiplied
//! by the current base power (shape B). The two shapes combine into a
//! non-interactive OR: the prover commits honestly to the true shape and
//! simulates the other under a fresh 256-bit sub-challenge, with the outer
//! challenge equal to the XOR of the two.

use crate::bigint_serde;
use crate::cprng;
use crate::group::Group;
use crate::lookup::{BaseLookup, ProofLookup, ProofMerge, SecretLookup, SecretMerge};
use crate::multiplication::{
    MultiplicationProof, MultiplicationProofCommit, MultiplicationProofStructure,
};
use crate::pedersen::{self, hider_name};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shape A: bit = 0, post = pre
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ExpStepAStructure {
    bit_name: String,
    pre_name: String,
    post_name: String,
    myname: String,
    bit_rep: RepresentationProofStructure,
    equality_rep: RepresentationProofStructure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpStepAProof {
    #[serde(rename = "BitHiderResult", with = "bigint_serde::opt")]
    pub bit_hider_result: Option<BigInt>,
    #[serde(rename = "EqualityHiderResult", with = "bigint_serde::opt")]
    pub equality_hider_result: Option<BigInt>,
}

pub struct ExpStepACommit {
    bit_hider_name: String,
    equality_name: String,
    bit_hider_randomizer: BigInt,
    equality_hider: BigInt,
    equality_hider_randomizer: BigInt,
}

impl SecretLookup for ExpStepACommit {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == self.equality_name {
            Some(&self.equality_hider)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.bit_hider_name {
            Some(&self.bit_hider_randomizer)
        } else if name == self.equality_name {
            Some(&self.equality_hider_randomizer)
        } else {
            None
        }
    }
}

struct ExpStepAView<'a> {
    bit_hider_name: String,
    equality_name: String,
    proof: &'a ExpStepAProof,
}

impl ProofLookup for ExpStepAView<'_> {
    fn result(&self, name: &str) -> Option<&BigInt> {
        if name == self.bit_hider_name {
            self.proof.bit_hider_result.as_ref()
        } else if name == self.equality_name {
            self.proof.equality_hider_result.as_ref()
        } else {
            None
        }
    }
}

impl ExpStepAStructure {
    pub fn new(bit_name: &str, pre_name: &str, post_name: &str) -> Self {
        let myname = format!("{bit_name}_{pre_name}_{post_name}_expa");
        let bit_rep = RepresentationProofStructure::new(
            vec![LhsContribution::new(bit_name, 1)],
            vec![RhsContribution::new("h", &hider_name(bit_name), 1)],
        );
        let equality_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(pre_name, 1),
                LhsContribution::new(post_name, -1),
            ],
            vec![RhsContribution::new("h", &format!("{myname}_eqhider"), 1)],
        );
        ExpStepAStructure {
            bit_name: bit_name.to_owned(),
            pre_name: pre_name.to_owned(),
            post_name: post_name.to_owned(),
            myname,
            bit_rep,
            equality_rep,
        }
    }

    fn equality_name(&self) -> String {
        format!("{}_eqhider", self.myname)
    }

    pub fn num_range_proofs(&self) -> usize {
        0
    }

    pub fn num_commitments(&self) -> usize {
        self.bit_rep.num_commitments() + self.equality_rep.num_commitments()
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> ExpStepACommit {
        let pre_hider = secrets
            .secret(&hider_name(&self.pre_name))
            .expect("pre hider");
        let post_hider = secrets
            .secret(&hider_name(&self.post_name))
            .expect("post hider");

        let commit = ExpStepACommit {
            bit_hider_name: hider_name(&self.bit_name),
            equality_name: self.equality_name(),
            bit_hider_randomizer: cprng::random_big_int(g.order()),
            equality_hider: g.mod_order(&(pre_hider - post_hider)),
            equality_hider_randomizer: cprng::random_big_int(g.order()),
        };

        let inner = SecretMerge::new(&[&commit, secrets]);
        self.bit_rep.commitments_from_secrets(g, list, bases, &inner);
        self.equality_rep
            .commitments_from_secrets(g, list, bases, &inner);

        commit
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &ExpStepACommit,
        secrets: &dyn SecretLookup,
    ) -> ExpStepAProof {
        let bit_hider = secrets
            .secret(&hider_name(&self.bit_name))
            .expect("bit hider");

        ExpStepAProof {
            bit_hider_result: Some(
                g.mod_order(&(&commit.bit_hider_randomizer - challenge * bit_hider)),
            ),
            equality_hider_result: Some(
                g.mod_order(&(&commit.equality_hider_randomizer - challenge * &commit.equality_hider)),
            ),
        }
    }

    pub fn fake_proof(&self, g: &Group) -> ExpStepAProof {
        ExpStepAProof {
            bit_hider_result: Some(cprng::random_big_int(g.order())),
            equality_hider_result: Some(cprng::random_big_int(g.order())),
        }
    }

    pub fn verify_structure(&self, proof: &ExpStepAProof) -> bool {
        proof.bit_hider_result.is_some() && proof.equality_hider_result.is_some()
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof: &ExpStepAProof,
    ) {
        let view = ExpStepAView {
            bit_hider_name: hider_name(&self.bit_name),
            equality_name: self.equality_name(),
            proof,
        };
        self.bit_rep
            .commitments_from_proof(g, list, challenge, bases, &view);
        self.equality_rep
            .commitments_from_proof(g, list, challenge, bases, &view);
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        let bit = match secrets.secret(&self.bit_name) {
            Some(b) => b,
            None => return false,
        };
        if !bit.is_zero() {
            return false;
        }
        secrets.secret(&self.pre_name) == secrets.secret(&self.post_name)
    }
}

// ---------------------------------------------------------------------------
// Shape B: bit = 1, pre·mul = post (mod modulus)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ExpStepBStructure {
    bit_name: String,
    mul_name: String,
    bit_rep: RepresentationProofStructure,
    mul_rep: RepresentationProofStructure,
    pre_post_mul: MultiplicationProofStructure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpStepBProof {
    #[serde(rename = "MulResult", with = "bigint_serde::opt")]
    pub mul_result: Option<BigInt>,
    #[serde(rename = "MulHiderResult", with = "bigint_serde::opt")]
    pub mul_hider_result: Option<BigInt>,
    #[serde(rename = "BitHiderResult", with = "bigint_serde::opt")]
    pub bit_hider_result: Option<BigInt>,
    #[serde(rename = "MultiplicationProof")]
    pub multiplication_proof: MultiplicationProof,
}

struct BStepRandomizers {
    bit_hider_name: String,
    mul_name: String,
    mul_hider_name: String,
    mul_randomizer: BigInt,
    mul_hider_randomizer: BigInt,
    bit_hider_randomizer: BigInt,
}

impl SecretLookup for BStepRandomizers {
    fn secret(&self, _name: &str) -> Option<&BigInt> {
        None
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.bit_hider_name {
            Some(&self.bit_hider_randomizer)
        } else if name == self.mul_name {
            Some(&self.mul_randomizer)
        } else if name == self.mul_hider_name {
            Some(&self.mul_hider_randomizer)
        } else {
            None
        }
    }
}

pub struct ExpStepBCommit {
    randomizers: BStepRandomizers,
    multiplication_commit: MultiplicationProofCommit,
}

impl SecretLookup for ExpStepBCommit {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        self.randomizers.secret(name)
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        self.randomizers.randomizer(name)
    }
}

struct ExpStepBView<'a> {
    bit_hider_name: String,
    mul_name: String,
    mul_hider_name: String,
    proof: &'a ExpStepBProof,
}

impl ProofLookup for ExpStepBView<'_> {
    fn result(&self, name: &str) -> Option<&BigInt> {
        if name == self.bit_hider_name {
            self.proof.bit_hider_result.as_ref()
        } else if name == self.mul_name {
            self.proof.mul_result.as_ref()
        } else if name == self.mul_hider_name {
            self.proof.mul_hider_result.as_ref()
        } else {
            None
        }
    }
}

impl ExpStepBStructure {
    pub fn new(
        bit_name: &str,
        pre_name: &str,
        post_name: &str,
        mul_name: &str,
        mod_name: &str,
        bitlen: u32,
    ) -> Self {
        let bit_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(bit_name, 1),
                LhsContribution::new("g", -1),
            ],
            vec![RhsContribution::new("h", &hider_name(bit_name), 1)],
        );
        ExpStepBStructure {
            bit_name: bit_name.to_owned(),
            mul_name: mul_name.to_owned(),
            bit_rep,
            mul_rep: pedersen::representation_structure(mul_name),
            pre_post_mul: MultiplicationProofStructure::new(
                mul_name, pre_name, mod_name, post_name, bitlen,
            ),
        }
    }

    pub fn num_range_proofs(&self) -> usize {
        self.pre_post_mul.num_range_proofs()
    }

    pub fn num_commitments(&self) -> usize {
        self.bit_rep.num_commitments()
            + self.mul_rep.num_commitments()
            + self.pre_post_mul.num_commitments()
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> ExpStepBCommit {
        let randomizers = BStepRandomizers {
            bit_hider_name: hider_name(&self.bit_name),
            mul_name: self.mul_name.clone(),
            mul_hider_name: hider_name(&self.mul_name),
            mul_randomizer: cprng::random_big_int(g.order()),
            mul_hider_randomizer: cprng::random_big_int(g.order()),
            bit_hider_randomizer: cprng::random_big_int(g.order()),
        };

        let inner = SecretMerge::new(&[&randomizers, secrets]);
        self.bit_rep.commitments_from_secrets(g, list, bases, &inner);
        self.mul_rep.commitments_from_secrets(g, list, bases, &inner);
        let multiplication_commit = self
            .pre_post_mul
            .commitments_from_secrets(g, list, bases, &inner);

        ExpStepBCommit {
            randomizers,
            multiplication_commit,
        }
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &ExpStepBCommit,
        secrets: &dyn SecretLookup,
    ) -> ExpStepBProof {
        let mul = secrets.secret(&self.mul_name).expect("mul secret");
        let mul_hider = secrets
            .secret(&hider_name(&self.mul_name))
            .expect("mul hider");
        let bit_hider = secrets
            .secret(&hider_name(&self.bit_name))
            .expect("bit hider");

        let inner = SecretMerge::new(&[commit, secrets]);
        let multiplication_proof =
            self.pre_post_mul
                .build_proof(g, challenge, &commit.multiplication_commit, &inner);

        ExpStepBProof {
            mul_result: Some(
                g.mod_order(&(&commit.randomizers.mul_randomizer - challenge * mul)),
            ),
            mul_hider_result: Some(
                g.mod_order(&(&commit.randomizers.mul_hider_randomizer - challenge * mul_hider)),
            ),
            bit_hider_result: Some(
                g.mod_order(&(&commit.randomizers.bit_hider_randomizer - challenge * bit_hider)),
            ),
            multiplication_proof,
        }
    }

    pub fn fake_proof(&self, g: &Group) -> ExpStepBProof {
        ExpStepBProof {
            mul_result: Some(cprng::random_big_int(g.order())),
            mul_hider_result: Some(cprng::random_big_int(g.order())),
            bit_hider_result: Some(cprng::random_big_int(g.order())),
            multiplication_proof: self.pre_post_mul.fake_proof(g),
        }
    }

    pub fn verify_structure(&self, proof: &ExpStepBProof) -> bool {
        self.pre_post_mul
            .verify_structure(&proof.multiplication_proof)
            && proof.mul_result.is_some()
            && proof.mul_hider_result.is_some()
            && proof.bit_hider_result.is_some()
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof: &ExpStepBProof,
    ) {
        let view = ExpStepBView {
            bit_hider_name: hider_name(&self.bit_name),
            mul_name: self.mul_name.clone(),
            mul_hider_name: hider_name(&self.mul_name),
            proof,
        };
        self.bit_rep
            .commitments_from_proof(g, list, challenge, bases, &view);
        self.mul_rep
            .commitments_from_proof(g, list, challenge, bases, &view);
        let proofs = ProofMerge::new(&[&view]);
        self.pre_post_mul.commitments_from_proof(
            g,
            list,
            challenge,
            bases,
            &proofs,
            &proof.multiplication_proof,
        );
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        match secrets.secret(&self.bit_name) {
            Some(bit) if bit.is_one() => self.pre_post_mul.is_true(secrets),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// The OR of the two shapes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ExpStepStructure {
    bit_name: String,
    step_a: ExpStepAStructure,
    step_b: ExpStepBStructure,
}

/// Prover state: the taken shape's commit plus the simulated other branch.
pub enum ExpStepCommit {
    BitZero {
        a_commit: ExpStepACommit,
        b_challenge: BigInt,
        b_proof: ExpStepBProof,
    },
    BitOne {
        a_challenge: BigInt,
        a_proof: ExpStepAProof,
        b_commit: ExpStepBCommit,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpStepProof {
    #[serde(rename = "Achallenge", with = "bigint_serde::opt")]
    pub a_challenge: Option<BigInt>,
    #[serde(rename = "Aproof")]
    pub a_proof: ExpStepAProof,
    #[serde(rename = "Bchallenge", with = "bigint_serde::opt")]
    pub b_challenge: Option<BigInt>,
    #[serde(rename = "Bproof")]
    pub b_proof: ExpStepBProof,
}

fn sub_challenge() -> BigInt {
    cprng::random_big_int(&(BigInt::one() << 256))
}

impl ExpStepStructure {
    pub fn new(
        bit_name: &str,
        pre_name: &str,
        post_name: &str,
        mul_name: &str,
        mod_name: &str,
        bitlen: u32,
    ) -> Self {
        ExpStepStructure {
            bit_name: bit_name.to_owned(),
            step_a: ExpStepAStructure::new(bit_name, pre_name, post_name),
            step_b: ExpStepBStructure::new(
                bit_name, pre_name, post_name, mul_name, mod_name, bitlen,
            ),
        }
    }

    pub fn num_range_proofs(&self) -> usize {
        self.step_a.num_range_proofs() + self.step_b.num_range_proofs()
    }

    pub fn num_commitments(&self) -> usize {
        self.step_a.num_commitments() + self.step_b.num_commitments()
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> ExpStepCommit {
        let bit = secrets.secret(&self.bit_name).expect("bit secret");
        if bit.is_zero() {
            let a_commit = self.step_a.commitments_from_secrets(g, list, bases, secrets);

            let b_challenge = sub_challenge();
            let b_proof = self.step_b.fake_proof(g);
            self.step_b
                .commitments_from_proof(g, list, &b_challenge, bases, &b_proof);

            ExpStepCommit::BitZero {
                a_commit,
                b_challenge,
                b_proof,
            }
        } else {
            let a_challenge = sub_challenge();
            let a_proof = self.step_a.fake_proof(g);
            self.step_a
                .commitments_from_proof(g, list, &a_challenge, bases, &a_proof);

            let b_commit = self.step_b.commitments_from_secrets(g, list, bases, secrets);

            ExpStepCommit::BitOne {
                a_challenge,
                a_proof,
                b_commit,
            }
        }
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &ExpStepCommit,
        secrets: &dyn SecretLookup,
    ) -> ExpStepProof {
        match commit {
            ExpStepCommit::BitZero {
                a_commit,
                b_challenge,
                b_proof,
            } => {
                let a_challenge = challenge ^ b_challenge;
                let a_proof = self.step_a.build_proof(g, &a_challenge, a_commit, secrets);
                ExpStepProof {
                    a_challenge: Some(a_challenge),
                    a_proof,
                    b_challenge: Some(b_challenge.clone()),
                    b_proof: b_proof.clone(),
                }
            }
            ExpStepCommit::BitOne {
                a_challenge,
                a_proof,
                b_commit,
            } => {
                let b_challenge = challenge ^ a_challenge;
                let b_proof = self.step_b.build_proof(g, &b_challenge, b_commit, secrets);
                ExpStepProof {
                    a_challenge: Some(a_challenge.clone()),
                    a_proof: a_proof.clone(),
                    b_challenge: Some(b_challenge),
                    b_proof,
                }
            }
        }
    }

    pub fn fake_proof(&self, g: &Group, challenge: &BigInt) -> ExpStepProof {
        let a_challenge = sub_challenge();
        let b_challenge = challenge ^ &a_challenge;
        ExpStepProof {
            a_challenge: Some(a_challenge),
            a_proof: self.step_a.fake_proof(g),
            b_challenge: Some(b_challenge),
            b_proof: self.step_b.fake_proof(g),
        }
    }

    pub fn verify_structure(&self, challenge: &BigInt, proof: &ExpStepProof) -> bool {
        let (a_challenge, b_challenge) = match (&proof.a_challenge, &proof.b_challenge) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        if *challenge != (a_challenge ^ b_challenge) {
            return false;
        }
        self.step_a.verify_structure(&proof.a_proof) && self.step_b.verify_structure(&proof.b_proof)
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        _challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof: &ExpStepProof,
    ) {
        let a_challenge = proof.a_challenge.clone().unwrap_or_default();
        let b_challenge = proof.b_challenge.clone().unwrap_or_default();
        self.step_a
            .commitments_from_proof(g, list, &a_challenge, bases, &proof.a_proof);
        self.step_b
            .commitments_from_proof(g, list, &b_challenge, bases, &proof.b_proof);
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        self.step_a.is_true(secrets) || self.step_b.is_true(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::build_group;
    use crate::lookup::BaseMerge;
    use crate::pedersen::PedersenSecret;

    struct StepFixture {
        bit: PedersenSecret,
        pre: PedersenSecret,
        post: PedersenSecret,
        mul: PedersenSecret,
        modulus: PedersenSecret,
    }

    fn fixture(g: &Group, bit: i64, pre: i64, post: i64, mul: i64, modulus: i64) -> StepFixture {
        StepFixture {
            bit: PedersenSecret::new(g, "bit", &BigInt::from(bit)),
            pre: PedersenSecret::new(g, "pre", &BigInt::from(pre)),
            post: PedersenSecret::new(g, "post", &BigInt::from(post)),
            mul: PedersenSecret::new(g, "mul", &BigInt::from(mul)),
            modulus: PedersenSecret::new(g, "mod", &BigInt::from(modulus)),
        }
    }

    fn check_flow(bit: i64, pre: i64, post: i64, mul: i64) {
        let _quiet = crate::follower::testutil::quiet_guard();
        let g = build_group(&BigInt::from(47)).unwrap();
        let f = fixture(&g, bit, pre, post, mul, 11);

        let bases = BaseMerge::new(&[&g, &f.bit, &f.pre, &f.post, &f.mul, &f.modulus]);
        let secrets = SecretMerge::new(&[&f.bit, &f.pre, &f.post, &f.mul, &f.modulus]);

        let s = ExpStepStructure::new("bit", "pre", "post", "mul", "mod", 4);
        assert!(s.is_true(&secrets), "witness rejected");

        let mut from_secrets = Vec::new();
        let commit = s.commitments_from_secrets(&g, &mut from_secrets, &bases, &secrets);
        assert_eq!(from_secrets.len(), s.num_commitments());

        let challenge = BigInt::from(12345);
        let proof = s.build_proof(&g, &challenge, &commit, &secrets);
        assert!(s.verify_structure(&challenge, &proof));

        let bit_proof = f.bit.build_proof(&g, &challenge);
        let pre_proof = f.pre.build_proof(&g, &challenge);
        let post_proof = f.post.build_proof(&g, &challenge);
        let mul_proof = f.mul.build_proof(&g, &challenge);
        let mod_proof = f.modulus.build_proof(&g, &challenge);
        let bit_view = bit_proof.view("bit");
        let pre_view = pre_proof.view("pre");
        let post_view = post_proof.view("post");
        let mul_view = mul_proof.view("mul");
        let mod_view = mod_proof.view("mod");

        let proof_bases =
            BaseMerge::new(&[&g, &bit_view, &pre_view, &post_view, &mul_view, &mod_view]);

        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &challenge, &proof_bases, &proof);

        assert_eq!(from_secrets, from_proof);
    }

    #[test]
    fn zero_bit_keeps_accumulator() {
        check_flow(0, 5, 5, 3);
    }

    #[test]
    fn one_bit_multiplies_accumulator() {
        check_flow(1, 2, 6, 3);
    }

    #[test]
    fn fake_proof_is_structurally_valid() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = ExpStepStructure::new("bit", "pre", "post", "mul", "mod", 4);
        let challenge = BigInt::from(12345);
        assert!(s.verify_structure(&challenge, &s.fake_proof(&g, &challenge)));
    }

    #[test]
    fn mismatched_sub_challenges_are_rejected() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = ExpStepStructure::new("bit", "pre", "post", "mul", "mod", 4);
        let challenge = BigInt::from(12345);

        let mut proof = s.fake_proof(&g, &challenge);
        proof.a_challenge = Some(proof.a_challenge.unwrap() + 1);
        assert!(!s.verify_structure(&challenge, &proof));

        let mut missing = s.fake_proof(&g, &challenge);
        missing.b_challenge = None;
        assert!(!s.verify_structure(&challenge, &missing));
    }

    #[test]
    fn json_round_trip() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = ExpStepStructure::new("bit", "pre", "post", "mul", "mod", 4);
        let challenge = BigInt::from(12345);
        let before = s.fake_proof(&g, &challenge);
        let json = serde_json::to_string(&before).unwrap();
        let after: ExpStepProof = serde_json::from_str(&json).unwrap();
        assert!(s.verify_structure(&challenge, &after));
    }
}
