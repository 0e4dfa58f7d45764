//! Proof that a committed number is prime.
//!
//! The committed `p` is split as `p = 2·halfP + 1`. A Fermat witness
//! `a = (prea + a_add) mod p` is derived from a committed preimage and a
//! hash offset so neither party controls it; its residue `a^halfP mod p` is
//! shown to be `+1` or `-1` by an OR of two representation statements. A
//! second witness with residue forced to `-1` exhibits a non-residue. Both
//! exponentiations run through the committed square-and-multiply proof.
//! Together this pins primality for the composite shapes the product tests
//! cannot exclude.

use crate::bigint_serde;
use crate::cprng;
use crate::error::ProofError;
use crate::exp::{ExpProof, ExpProofCommit, ExpProofStructure};
use crate::group::Group;
use crate::hashing;
use crate::lookup::{
    BaseLookup, BaseMerge, NamedResult, ProofLookup, ProofMerge, SecretLookup, SecretMerge,
};
use crate::pedersen::{self, hider_name, PedersenProof, PedersenSecret};
use crate::rangeproof::{RangeCommit, RangeProof, RangeProofStructure};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "keyproof::primeproof";

#[derive(Clone, Debug)]
pub struct PrimeProofStructure {
    prime_name: String,
    myname: String,
    bitlen: u32,

    half_p_rep: RepresentationProofStructure,

    prea_rep: RepresentationProofStructure,
    prea_range: RangeProofStructure,

    a_rep: RepresentationProofStructure,
    a_range: RangeProofStructure,

    aneg_rep: RepresentationProofStructure,
    aneg_range: RangeProofStructure,

    a_res_rep: RepresentationProofStructure,
    a_plus1_res_rep: RepresentationProofStructure,
    a_min1_res_rep: RepresentationProofStructure,

    aneg_res_rep: RepresentationProofStructure,

    a_exp: ExpProofStructure,
    aneg_exp: ExpProofStructure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimeProof {
    #[serde(rename = "HalfPCommit")]
    pub half_p_commit: PedersenProof,
    #[serde(rename = "PreaCommit")]
    pub prea_commit: PedersenProof,
    #[serde(rename = "ACommit")]
    pub a_commit: PedersenProof,
    #[serde(rename = "AnegCommit")]
    pub aneg_commit: PedersenProof,
    #[serde(rename = "AResCommit")]
    pub a_res_commit: PedersenProof,
    #[serde(rename = "AnegResCommit")]
    pub aneg_res_commit: PedersenProof,

    #[serde(rename = "PreaModResult", with = "bigint_serde::opt")]
    pub prea_mod_result: Option<BigInt>,
    #[serde(rename = "PreaHiderResult", with = "bigint_serde::opt")]
    pub prea_hider_result: Option<BigInt>,

    #[serde(rename = "APlus1Result", with = "bigint_serde::opt")]
    pub a_plus1_result: Option<BigInt>,
    #[serde(rename = "AMin1Result", with = "bigint_serde::opt")]
    pub a_min1_result: Option<BigInt>,
    #[serde(rename = "APlus1Challenge", with = "bigint_serde::opt")]
    pub a_plus1_challenge: Option<BigInt>,
    #[serde(rename = "AMin1Challenge", with = "bigint_serde::opt")]
    pub a_min1_challenge: Option<BigInt>,

    #[serde(rename = "PreaRangeProof")]
    pub prea_range_proof: RangeProof,
    #[serde(rename = "ARangeProof")]
    pub a_range_proof: RangeProof,
    #[serde(rename = "AnegRangeProof")]
    pub aneg_range_proof: RangeProof,
    #[serde(rename = "PreaModRangeProof")]
    pub prea_mod_range_proof: RangeProof,

    #[serde(rename = "AExpProof")]
    pub a_exp_proof: ExpProof,
    #[serde(rename = "AnegExpProof")]
    pub aneg_exp_proof: ExpProof,
}

/// The residue the honest witness produced.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ResidueSide {
    Plus,
    Minus,
}

/// Closing scalars and the OR bookkeeping, named so the generation-phase
/// statements can look them up.
struct PrimeExtras {
    prea_mod_name: String,
    prea_hider_name: String,
    a_valid_name: String,
    a_invalid_name: String,

    prea_mod: BigInt,
    prea_mod_randomizer: BigInt,
    prea_hider: BigInt,
    prea_hider_randomizer: BigInt,

    a_valid: BigInt,
    a_valid_randomizer: BigInt,
    a_invalid_result: BigInt,
    a_invalid_challenge: BigInt,
    side: ResidueSide,
}

impl SecretLookup for PrimeExtras {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == self.prea_mod_name {
            Some(&self.prea_mod)
        } else if name == self.prea_hider_name {
            Some(&self.prea_hider)
        } else if name == self.a_valid_name {
            Some(&self.a_valid)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.prea_mod_name {
            Some(&self.prea_mod_randomizer)
        } else if name == self.prea_hider_name {
            Some(&self.prea_hider_randomizer)
        } else if name == self.a_valid_name {
            Some(&self.a_valid_randomizer)
        } else {
            None
        }
    }
}

impl ProofLookup for PrimeExtras {
    fn result(&self, name: &str) -> Option<&BigInt> {
        if name == self.a_invalid_name {
            Some(&self.a_invalid_result)
        } else {
            None
        }
    }
}

pub struct PrimeProofCommit {
    extras: PrimeExtras,

    half_p_pedersen: PedersenSecret,
    prea_pedersen: PedersenSecret,
    a_pedersen: PedersenSecret,
    aneg_pedersen: PedersenSecret,
    a_res_pedersen: PedersenSecret,
    aneg_res_pedersen: PedersenSecret,

    prea_range_commit: RangeCommit,
    a_range_commit: RangeCommit,
    aneg_range_commit: RangeCommit,
    prea_mod_range_commit: RangeCommit,

    a_exp_commit: ExpProofCommit,
    aneg_exp_commit: ExpProofCommit,
}

impl PrimeProofStructure {
    pub fn new(name: &str, bitlen: u32) -> Self {
        let myname = format!("{name}_primeproof");
        let halfp = format!("{myname}_halfp");
        let prea = format!("{myname}_prea");
        let a = format!("{myname}_a");
        let aneg = format!("{myname}_aneg");
        let ares = format!("{myname}_ares");
        let anegres = format!("{myname}_anegres");

        let half_p_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(name, 1),
                LhsContribution::new(&halfp, -2),
                LhsContribution::new("g", -1),
            ],
            vec![
                RhsContribution::new("h", &hider_name(name), 1),
                RhsContribution::new("h", &hider_name(&halfp), -2),
            ],
        );

        let a_plus1_res_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(&ares, 1),
                LhsContribution::new("g", -1),
            ],
            vec![RhsContribution::new(
                "h",
                &format!("{myname}_aresplus1hider"),
                1,
            )],
        );
        let a_min1_res_rep = RepresentationProofStructure::new(
            vec![LhsContribution::new(&ares, 1), LhsContribution::new("g", 1)],
            vec![RhsContribution::new(
                "h",
                &format!("{myname}_aresmin1hider"),
                1,
            )],
        );
        let aneg_res_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(&anegres, 1),
                LhsContribution::new("g", 1),
            ],
            vec![RhsContribution::new("h", &hider_name(&anegres), 1)],
        );

        PrimeProofStructure {
            prime_name: name.to_owned(),
            bitlen,
            half_p_rep,
            prea_rep: pedersen::representation_structure(&prea),
            prea_range: pedersen::range_structure(&prea, 0, bitlen),
            a_rep: pedersen::representation_structure(&a),
            a_range: pedersen::range_structure(&a, 0, bitlen),
            aneg_rep: pedersen::representation_structure(&aneg),
            aneg_range: pedersen::range_structure(&aneg, 0, bitlen),
            a_res_rep: pedersen::representation_structure(&ares),
            a_plus1_res_rep,
            a_min1_res_rep,
            aneg_res_rep,
            a_exp: ExpProofStructure::new(&a, &halfp, name, &ares, bitlen),
            aneg_exp: ExpProofStructure::new(&aneg, &halfp, name, &anegres, bitlen),
            myname,
        }
    }

    fn local(&self, part: &str) -> String {
        format!("{}_{part}", self.myname)
    }

    /// The `a = (prea + a_add) mod p` statement, rebuilt wherever the prea
    /// commitment is available.
    fn a_gen_structures(
        &self,
        prea_commit: &BigInt,
    ) -> (RepresentationProofStructure, RangeProofStructure) {
        let a_add = hashing::get_hash_number(Some(prea_commit), None, 0, self.bitlen);
        let rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(&self.local("prea"), 1),
                LhsContribution::with_power("g", a_add),
                LhsContribution::new(&self.local("a"), -1),
            ],
            vec![
                RhsContribution::new(&self.prime_name, &self.local("preamod"), 1),
                RhsContribution::new("h", &self.local("preahider"), 1),
            ],
        );
        let range = RangeProofStructure {
            rep: rep.clone(),
            range_secret: self.local("preamod"),
            l1: 0,
            l2: self.bitlen,
        };
        (rep, range)
    }

    pub fn num_range_proofs(&self) -> usize {
        4 + self.a_exp.num_range_proofs() + self.aneg_exp.num_range_proofs()
    }

    pub fn num_commitments(&self) -> usize {
        6 + self.half_p_rep.num_commitments()
            + self.prea_rep.num_commitments()
            + self.prea_range.num_commitments()
            + self.a_rep.num_commitments()
            + self.a_range.num_commitments()
            + self.aneg_rep.num_commitments()
            + self.aneg_range.num_commitments()
            + 1
            + crate::params::RANGE_PROOF_ITERS
            + self.a_res_rep.num_commitments()
            + self.aneg_res_rep.num_commitments()
            + self.a_plus1_res_rep.num_commitments()
            + self.a_min1_res_rep.num_commitments()
            + self.a_exp.num_commitments()
            + self.aneg_exp.num_commitments()
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> Result<PrimeProofCommit, ProofError> {
        let p = secrets.secret(&self.prime_name).expect("prime secret");
        let p_hider = secrets
            .secret(&hider_name(&self.prime_name))
            .expect("prime hider");
        let half_p: BigInt = p >> 1;

        tracing::debug!(target: LOG_TARGET, bitlen = self.bitlen, "building prime proof commitments");

        // Hash-offset witness a = (prea + a_add) mod p.
        let prea_pedersen = PedersenSecret::new(g, &self.local("prea"), &cprng::random_big_int(p));
        let a_add = hashing::get_hash_number(Some(prea_pedersen.commit()), None, 0, self.bitlen);
        let (d, a) = num_integer::Integer::div_mod_floor(&(prea_pedersen.secret_value() + &a_add), p);
        if a.is_zero() {
            return Err(ProofError::WitnessOutsideGroup);
        }
        let a_pedersen = PedersenSecret::new(g, &self.local("a"), &a);

        let prea_hider = g.mod_order(
            &(prea_pedersen.hider_value() - (a_pedersen.hider_value() + &d * p_hider)),
        );

        // Non-residue witness.
        let mut aneg = cprng::random_big_int(p);
        while aneg.modpow(&half_p, p) != p - BigInt::one() {
            aneg = cprng::random_big_int(p);
        }
        let aneg_pedersen = PedersenSecret::new(g, &self.local("aneg"), &aneg);

        // Fermat residues, committed as +1 or the signed representative -1.
        let mut a_res = a.modpow(&half_p, p);
        let side = if a_res.is_one() {
            ResidueSide::Plus
        } else {
            a_res -= p;
            ResidueSide::Minus
        };
        let aneg_res = aneg.modpow(&half_p, p) - p;
        let a_res_pedersen = PedersenSecret::new(g, &self.local("ares"), &a_res);
        let aneg_res_pedersen = PedersenSecret::new(g, &self.local("anegres"), &aneg_res);

        let (a_valid_name, a_invalid_name) = match side {
            ResidueSide::Plus => (
                format!("{}_aresplus1hider", self.myname),
                format!("{}_aresmin1hider", self.myname),
            ),
            ResidueSide::Minus => (
                format!("{}_aresmin1hider", self.myname),
                format!("{}_aresplus1hider", self.myname),
            ),
        };

        let extras = PrimeExtras {
            prea_mod_name: self.local("preamod"),
            prea_hider_name: self.local("preahider"),
            a_valid_name,
            a_invalid_name,
            prea_mod: d,
            prea_mod_randomizer: cprng::random_big_int(g.order()),
            prea_hider,
            prea_hider_randomizer: cprng::random_big_int(g.order()),
            a_valid: a_res_pedersen.hider_value().clone(),
            a_valid_randomizer: cprng::random_big_int(g.order()),
            a_invalid_result: cprng::random_big_int(g.order()),
            a_invalid_challenge: cprng::random_big_int(&(BigInt::one() << 256)),
            side,
        };

        let half_p_pedersen = PedersenSecret::new(g, &self.local("halfp"), &half_p);

        let (a_gen_rep, a_gen_range) = self.a_gen_structures(prea_pedersen.commit());

        let inner_bases = BaseMerge::new(&[
            &prea_pedersen,
            &a_pedersen,
            &aneg_pedersen,
            &a_res_pedersen,
            &aneg_res_pedersen,
            &half_p_pedersen,
            bases,
        ]);
        let inner_secrets = SecretMerge::new(&[
            &extras,
            &prea_pedersen,
            &a_pedersen,
            &aneg_pedersen,
            &a_res_pedersen,
            &aneg_res_pedersen,
            &half_p_pedersen,
            secrets,
        ]);

        half_p_pedersen.commitments(list);
        prea_pedersen.commitments(list);
        a_pedersen.commitments(list);
        aneg_pedersen.commitments(list);
        a_res_pedersen.commitments(list);
        aneg_res_pedersen.commitments(list);
        self.half_p_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        self.prea_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        let prea_range_commit =
            self.prea_range
                .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        self.a_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        let a_range_commit =
            self.a_range
                .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        self.aneg_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        let aneg_range_commit =
            self.aneg_range
                .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        a_gen_rep.commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        let prea_mod_range_commit =
            a_gen_range.commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        self.a_res_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        self.aneg_res_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        match side {
            ResidueSide::Plus => {
                self.a_plus1_res_rep
                    .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
                self.a_min1_res_rep.commitments_from_proof(
                    g,
                    list,
                    &extras.a_invalid_challenge,
                    &inner_bases,
                    &extras,
                );
            }
            ResidueSide::Minus => {
                self.a_plus1_res_rep.commitments_from_proof(
                    g,
                    list,
                    &extras.a_invalid_challenge,
                    &inner_bases,
                    &extras,
                );
                self.a_min1_res_rep
                    .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
            }
        }
        let a_exp_commit =
            self.a_exp
                .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);
        let aneg_exp_commit =
            self.aneg_exp
                .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);

        Ok(PrimeProofCommit {
            extras,
            half_p_pedersen,
            prea_pedersen,
            a_pedersen,
            aneg_pedersen,
            a_res_pedersen,
            aneg_res_pedersen,
            prea_range_commit,
            a_range_commit,
            aneg_range_commit,
            prea_mod_range_commit,
            a_exp_commit,
            aneg_exp_commit,
        })
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &PrimeProofCommit,
        secrets: &dyn SecretLookup,
    ) -> PrimeProof {
        let (_, a_gen_range) = self.a_gen_structures(commit.prea_pedersen.commit());

        let inner_secrets = SecretMerge::new(&[
            &commit.extras,
            &commit.prea_pedersen,
            &commit.a_pedersen,
            &commit.aneg_pedersen,
            &commit.a_res_pedersen,
            &commit.aneg_res_pedersen,
            &commit.half_p_pedersen,
            secrets,
        ]);

        let half_p_commit = commit.half_p_pedersen.build_proof(g, challenge);
        let prea_commit = commit.prea_pedersen.build_proof(g, challenge);
        let a_commit = commit.a_pedersen.build_proof(g, challenge);
        let aneg_commit = commit.aneg_pedersen.build_proof(g, challenge);
        let a_res_commit = commit.a_res_pedersen.build_proof(g, challenge);
        let aneg_res_commit = commit.aneg_res_pedersen.build_proof(g, challenge);

        let prea_range_proof =
            self.prea_range
                .build_proof(g, challenge, &commit.prea_range_commit, &inner_secrets);
        let a_range_proof =
            self.a_range
                .build_proof(g, challenge, &commit.a_range_commit, &inner_secrets);
        let aneg_range_proof =
            self.aneg_range
                .build_proof(g, challenge, &commit.aneg_range_commit, &inner_secrets);
        let prea_mod_range_proof = a_gen_range.build_proof(
            g,
            challenge,
            &commit.prea_mod_range_commit,
            &inner_secrets,
        );

        let prea_mod_result = Some(g.mod_order(
            &(&commit.extras.prea_mod_randomizer - challenge * &commit.extras.prea_mod),
        ));
        let prea_hider_result = Some(g.mod_order(
            &(&commit.extras.prea_hider_randomizer - challenge * &commit.extras.prea_hider),
        ));

        let valid_challenge = challenge ^ &commit.extras.a_invalid_challenge;
        let valid_result = g.mod_order(
            &(&commit.extras.a_valid_randomizer - &valid_challenge * &commit.extras.a_valid),
        );
        let (a_plus1_challenge, a_plus1_result, a_min1_challenge, a_min1_result) =
            match commit.extras.side {
                ResidueSide::Plus => (
                    valid_challenge,
                    valid_result,
                    commit.extras.a_invalid_challenge.clone(),
                    commit.extras.a_invalid_result.clone(),
                ),
                ResidueSide::Minus => (
                    commit.extras.a_invalid_challenge.clone(),
                    commit.extras.a_invalid_result.clone(),
                    valid_challenge,
                    valid_result,
                ),
            };

        let a_exp_proof = self
            .a_exp
            .build_proof(g, challenge, &commit.a_exp_commit, &inner_secrets);
        let aneg_exp_proof =
            self.aneg_exp
                .build_proof(g, challenge, &commit.aneg_exp_commit, &inner_secrets);

        PrimeProof {
            half_p_commit,
            prea_commit,
            a_commit,
            aneg_commit,
            a_res_commit,
            aneg_res_commit,
            prea_mod_result,
            prea_hider_result,
            a_plus1_result: Some(a_plus1_result),
            a_min1_result: Some(a_min1_result),
            a_plus1_challenge: Some(a_plus1_challenge),
            a_min1_challenge: Some(a_min1_challenge),
            prea_range_proof,
            a_range_proof,
            aneg_range_proof,
            prea_mod_range_proof,
            a_exp_proof,
            aneg_exp_proof,
        }
    }

    pub fn fake_proof(&self, g: &Group, challenge: &BigInt) -> PrimeProof {
        let prea_commit = PedersenProof::fake(g);
        let (_, a_gen_range) =
            self.a_gen_structures(prea_commit.commit.as_ref().expect("fake commit"));

        let a_plus1_challenge = cprng::random_big_int(&(BigInt::one() << 256));
        let a_min1_challenge = challenge ^ &a_plus1_challenge;

        PrimeProof {
            half_p_commit: PedersenProof::fake(g),
            prea_commit,
            a_commit: PedersenProof::fake(g),
            aneg_commit: PedersenProof::fake(g),
            a_res_commit: PedersenProof::fake(g),
            aneg_res_commit: PedersenProof::fake(g),
            prea_mod_result: Some(cprng::random_big_int(g.order())),
            prea_hider_result: Some(cprng::random_big_int(g.order())),
            a_plus1_result: Some(cprng::random_big_int(g.order())),
            a_min1_result: Some(cprng::random_big_int(g.order())),
            a_plus1_challenge: Some(a_plus1_challenge),
            a_min1_challenge: Some(a_min1_challenge),
            prea_range_proof: self.prea_range.fake_proof(g),
            a_range_proof: self.a_range.fake_proof(g),
            aneg_range_proof: self.aneg_range.fake_proof(g),
            prea_mod_range_proof: a_gen_range.fake_proof(g),
            a_exp_proof: self.a_exp.fake_proof(g, challenge),
            aneg_exp_proof: self.aneg_exp.fake_proof(g, challenge),
        }
    }

    pub fn verify_structure(&self, challenge: &BigInt, proof: &PrimeProof) -> bool {
        if !proof.half_p_commit.verify_structure()
            || !proof.prea_commit.verify_structure()
            || !proof.a_commit.verify_structure()
            || !proof.aneg_commit.verify_structure()
            || !proof.a_res_commit.verify_structure()
            || !proof.aneg_res_commit.verify_structure()
        {
            return false;
        }

        let prea_commit = match proof.prea_commit.commit.as_ref() {
            Some(commit) => commit,
            None => return false,
        };
        let (_, a_gen_range) = self.a_gen_structures(prea_commit);

        if !self.prea_range.verify_structure(&proof.prea_range_proof)
            || !self.a_range.verify_structure(&proof.a_range_proof)
            || !self.aneg_range.verify_structure(&proof.aneg_range_proof)
            || !a_gen_range.verify_structure(&proof.prea_mod_range_proof)
        {
            return false;
        }

        if proof.prea_mod_result.is_none() || proof.prea_hider_result.is_none() {
            return false;
        }
        if proof.a_plus1_result.is_none() || proof.a_min1_result.is_none() {
            return false;
        }
        let (plus_challenge, min_challenge) =
            match (&proof.a_plus1_challenge, &proof.a_min1_challenge) {
                (Some(p), Some(m)) => (p, m),
                _ => return false,
            };
        if (plus_challenge ^ min_challenge) != *challenge {
            return false;
        }

        self.a_exp.verify_structure(challenge, &proof.a_exp_proof)
            && self
                .aneg_exp
                .verify_structure(challenge, &proof.aneg_exp_proof)
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof_data: &dyn ProofLookup,
        proof: &PrimeProof,
    ) {
        let half_p_view = proof.half_p_commit.view(&self.local("halfp"));
        let prea_view = proof.prea_commit.view(&self.local("prea"));
        let a_view = proof.a_commit.view(&self.local("a"));
        let aneg_view = proof.aneg_commit.view(&self.local("aneg"));
        let a_res_view = proof.a_res_commit.view(&self.local("ares"));
        let aneg_res_view = proof.aneg_res_commit.view(&self.local("anegres"));

        let prea_mod = NamedResult::new(self.local("preamod"), proof.prea_mod_result.as_ref());
        let prea_hider =
            NamedResult::new(self.local("preahider"), proof.prea_hider_result.as_ref());
        let plus_hider = NamedResult::new(
            format!("{}_aresplus1hider", self.myname),
            proof.a_plus1_result.as_ref(),
        );
        let min_hider = NamedResult::new(
            format!("{}_aresmin1hider", self.myname),
            proof.a_min1_result.as_ref(),
        );

        let default_commit = BigInt::zero();
        let prea_commit_value = proof.prea_commit.commit.as_ref().unwrap_or(&default_commit);
        let (a_gen_rep, a_gen_range) = self.a_gen_structures(prea_commit_value);

        let inner_bases = BaseMerge::new(&[
            &prea_view,
            &a_view,
            &aneg_view,
            &a_res_view,
            &aneg_res_view,
            &half_p_view,
            bases,
        ]);
        let proofs = ProofMerge::new(&[
            &prea_mod,
            &prea_hider,
            &plus_hider,
            &min_hider,
            &prea_view,
            &a_view,
            &aneg_view,
            &a_res_view,
            &aneg_res_view,
            &half_p_view,
            proof_data,
        ]);

        proof.half_p_commit.commitments(list);
        proof.prea_commit.commitments(list);
        proof.a_commit.commitments(list);
        proof.aneg_commit.commitments(list);
        proof.a_res_commit.commitments(list);
        proof.aneg_res_commit.commitments(list);
        self.half_p_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.prea_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.prea_range.commitments_from_proof(
            g,
            list,
            challenge,
            &inner_bases,
            &proof.prea_range_proof,
        );
        self.a_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.a_range
            .commitments_from_proof(g, list, challenge, &inner_bases, &proof.a_range_proof);
        self.aneg_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.aneg_range.commitments_from_proof(
            g,
            list,
            challenge,
            &inner_bases,
            &proof.aneg_range_proof,
        );
        a_gen_rep.commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        a_gen_range.commitments_from_proof(
            g,
            list,
            challenge,
            &inner_bases,
            &proof.prea_mod_range_proof,
        );
        self.a_res_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.aneg_res_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &proofs);
        self.a_plus1_res_rep.commitments_from_proof(
            g,
            list,
            &proof.a_plus1_challenge.clone().unwrap_or_default(),
            &inner_bases,
            &proofs,
        );
        self.a_min1_res_rep.commitments_from_proof(
            g,
            list,
            &proof.a_min1_challenge.clone().unwrap_or_default(),
            &inner_bases,
            &proofs,
        );
        self.a_exp.commitments_from_proof(
            g,
            list,
            challenge,
            &inner_bases,
            &proofs,
            &proof.a_exp_proof,
        );
        self.aneg_exp.commitments_from_proof(
            g,
            list,
            challenge,
            &inner_bases,
            &proofs,
            &proof.aneg_exp_proof,
        );
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        match secrets.secret(&self.prime_name) {
            Some(p) => crate::math::probably_prime(p),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::build_group;

    #[test]
    fn commitment_lists_agree() {
        let _quiet = crate::follower::testutil::quiet_guard();
        let g = build_group(&BigInt::from(47)).unwrap();

        let s = PrimeProofStructure::new("p", 4);

        let p_commit = PedersenSecret::new(&g, "p", &BigInt::from(11));
        let bases = BaseMerge::new(&[&g, &p_commit]);

        // Witness sampling can land on a = 0 (probability 1/p, sizeable for
        // p = 11); that is an abort-and-retry condition for provers.
        let mut from_secrets = Vec::new();
        let commit = loop {
            match s.commitments_from_secrets(&g, &mut from_secrets, &bases, &p_commit) {
                Ok(commit) => break commit,
                Err(_) => from_secrets.clear(),
            }
        };
        assert_eq!(from_secrets.len(), s.num_commitments());

        let challenge = BigInt::from(12345);
        let proof = s.build_proof(&g, &challenge, &commit, &p_commit);
        assert!(s.verify_structure(&challenge, &proof));

        // The verifier sees only the wire format.
        let json = serde_json::to_string(&proof).unwrap();
        let proof: PrimeProof = serde_json::from_str(&json).unwrap();
        assert!(s.verify_structure(&challenge, &proof));

        let p_proof = p_commit.build_proof(&g, &challenge);
        let p_view = p_proof.view("p");
        let proof_bases = BaseMerge::new(&[&g, &p_view]);

        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &challenge, &proof_bases, &p_view, &proof);

        assert_eq!(from_secrets, from_proof);
    }

    #[test]
    fn fake_proof_is_structurally_valid() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = PrimeProofStructure::new("p", 4);
        let challenge = BigInt::from(12345);
        assert!(s.verify_structure(&challenge, &s.fake_proof(&g, &challenge)));
    }

    #[test]
    fn structure_rejects_tampering() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = PrimeProofStructure::new("p", 4);
        let challenge = BigInt::from(12345);

        let mut proof = s.fake_proof(&g, &challenge);
        proof.prea_mod_result = None;
        assert!(!s.verify_structure(&challenge, &proof), "missing prea mod");

        let mut proof = s.fake_proof(&g, &challenge);
        proof.a_commit.commit = None;
        assert!(!s.verify_structure(&challenge, &proof), "missing a commit");

        let mut proof = s.fake_proof(&g, &challenge);
        proof.a_plus1_challenge = Some(proof.a_plus1_challenge.unwrap() + 1);
        assert!(!s.verify_structure(&challenge, &proof), "broken challenge xor");

        let mut proof = s.fake_proof(&g, &challenge);
        proof.a_range_proof.results.clear();
        assert!(!s.verify_structure(&challenge, &proof), "missing range data");
    }

    #[test]
    fn json_round_trip() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = PrimeProofStructure::new("p", 4);
        let challenge = BigInt::from(12345);
        let before = s.fake_proof(&g, &challenge);
        let json = serde_json::to_string(&before).unwrap();
        let after: PrimeProof = serde_json::from_str(&json).unwrap();
        assert!(s.verify_structure(&challenge, &after));
    }

    #[test]
    fn premise_check_needs_a_prime() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = PrimeProofStructure::new("p", 4);
        let prime = PedersenSecret::new(&g, "p", &BigInt::from(11));
        let composite = PedersenSecret::new(&g, "p", &BigInt::from(15));
        assert!(s.is_true(&prime));
        assert!(!s.is_true(&composite));
    }
}
