//! Pedersen commitments and their sigma proofs.
//!
//! A secret `s` is hidden as `C = g^s · h^r`. The secret doubles as a named
//! base (its commitment) and as a pair of named secrets (`name` and
//! `name_hider`), which is how composite statements wire commitments
//! together. The proof carries only numbers; verifiers attach names through
//! a lightweight view instead of mutating the proof.

use crate::bigint_serde;
use crate::cprng;
use crate::group::Group;
use crate::lookup::{BaseLookup, ProofLookup, SecretLookup};
use crate::rangeproof::RangeProofStructure;
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Naming convention binding a commitment's hider to its secret.
pub fn hider_name(name: &str) -> String {
    format!("{name}_hider")
}

pub struct PedersenSecret {
    name: String,
    hider_name: String,
    secret: BigInt,
    secret_randomizer: BigInt,
    hider: BigInt,
    hider_randomizer: BigInt,
    commit: BigInt,
}

impl PedersenSecret {
    pub fn new(g: &Group, name: &str, value: &BigInt) -> Self {
        let secret_randomizer = cprng::random_big_int(g.order());
        let hider = cprng::random_big_int(g.order());
        let hider_randomizer = cprng::random_big_int(g.order());

        let g_part = g.exp("g", value, g.modulus()).expect("group knows g");
        let h_part = g.exp("h", &hider, g.modulus()).expect("group knows h");
        let commit = g.mod_p(&(g_part * h_part));

        PedersenSecret {
            name: name.to_owned(),
            hider_name: hider_name(name),
            secret: value.clone(),
            secret_randomizer,
            hider,
            hider_randomizer,
            commit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret_value(&self) -> &BigInt {
        &self.secret
    }

    pub fn hider_value(&self) -> &BigInt {
        &self.hider
    }

    pub fn commit(&self) -> &BigInt {
        &self.commit
    }

    pub fn commitments(&self, list: &mut Vec<BigInt>) {
        list.push(self.commit.clone());
    }

    pub fn build_proof(&self, g: &Group, challenge: &BigInt) -> PedersenProof {
        PedersenProof {
            commit: Some(self.commit.clone()),
            s_result: Some(g.mod_order(&(&self.secret_randomizer - challenge * &self.secret))),
            h_result: Some(g.mod_order(&(&self.hider_randomizer - challenge * &self.hider))),
        }
    }
}

impl SecretLookup for PedersenSecret {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            Some(&self.secret)
        } else if name == self.hider_name {
            Some(&self.hider)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            Some(&self.secret_randomizer)
        } else if name == self.hider_name {
            Some(&self.hider_randomizer)
        } else {
            None
        }
    }
}

impl BaseLookup for PedersenSecret {
    fn base(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            Some(&self.commit)
        } else {
            None
        }
    }

    fn base_names(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PedersenProof {
    #[serde(rename = "Commit", with = "bigint_serde::opt")]
    pub commit: Option<BigInt>,
    #[serde(rename = "Sresult", with = "bigint_serde::opt")]
    pub s_result: Option<BigInt>,
    #[serde(rename = "Hresult", with = "bigint_serde::opt")]
    pub h_result: Option<BigInt>,
}

impl PedersenProof {
    /// A proof with no relation to any secret; used to simulate the untaken
    /// branch of OR statements.
    pub fn fake(g: &Group) -> Self {
        let g_part = g
            .exp("g", &cprng::random_big_int(g.order()), g.modulus())
            .expect("group knows g");
        let h_part = g
            .exp("h", &cprng::random_big_int(g.order()), g.modulus())
            .expect("group knows h");
        PedersenProof {
            commit: Some(g.mod_p(&(g_part * h_part))),
            s_result: Some(cprng::random_big_int(g.order())),
            h_result: Some(cprng::random_big_int(g.order())),
        }
    }

    pub fn verify_structure(&self) -> bool {
        self.commit.is_some() && self.s_result.is_some() && self.h_result.is_some()
    }

    pub fn commitments(&self, list: &mut Vec<BigInt>) {
        list.push(self.commit.clone().unwrap_or_default());
    }

    /// Attaches a name, yielding the verifier-side base and result lookups.
    pub fn view<'a>(&'a self, name: &str) -> PedersenProofView<'a> {
        PedersenProofView {
            name: name.to_owned(),
            hider_name: hider_name(name),
            proof: self,
        }
    }
}

pub struct PedersenProofView<'a> {
    name: String,
    hider_name: String,
    proof: &'a PedersenProof,
}

impl BaseLookup for PedersenProofView<'_> {
    fn base(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            self.proof.commit.as_ref()
        } else {
            None
        }
    }

    fn base_names(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

impl ProofLookup for PedersenProofView<'_> {
    fn result(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            self.proof.s_result.as_ref()
        } else if name == self.hider_name {
            self.proof.h_result.as_ref()
        } else {
            None
        }
    }
}

/// The sigma statement `name = g^name · h^name_hider` for a named Pedersen
/// commitment.
pub fn representation_structure(name: &str) -> RepresentationProofStructure {
    RepresentationProofStructure::new(
        vec![LhsContribution::new(name, 1)],
        vec![
            RhsContribution::new("g", name, 1),
            RhsContribution::new("h", &hider_name(name), 1),
        ],
    )
}

/// The same statement, range-proved on the committed secret.
pub fn range_structure(name: &str, l1: u32, l2: u32) -> RangeProofStructure {
    RangeProofStructure {
        rep: representation_structure(name),
        range_secret: name.to_owned(),
        l1,
        l2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::build_group;
    use crate::lookup::BaseMerge;
    use num_bigint::BigInt;

    #[test]
    fn secret_exposes_names() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let secret = PedersenSecret::new(&g, "x", &BigInt::from(15));

        assert_eq!(secret.secret("x"), Some(&BigInt::from(15)));
        assert!(secret.randomizer("x").is_some());
        assert!(secret.secret("x_hider").is_some());
        assert!(secret.randomizer("x_hider").is_some());
        assert!(secret.base("x").is_some());
        assert!(secret.base("y").is_none());
    }

    #[test]
    fn proof_exposes_results_through_view() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let secret = PedersenSecret::new(&g, "x", &BigInt::from(15));

        let mut list_secret = Vec::new();
        secret.commitments(&mut list_secret);
        let proof = secret.build_proof(&g, &BigInt::from(1));
        let mut list_proof = Vec::new();
        proof.commitments(&mut list_proof);

        let view = proof.view("x");
        assert!(view.base("x").is_some());
        assert!(view.result("x").is_some());
        assert!(view.result("x_hider").is_some());
        assert_eq!(list_secret, list_proof);
    }

    #[test]
    fn representation_flow_commitments_agree() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let secret = PedersenSecret::new(&g, "x", &BigInt::from(15));
        let proof = secret.build_proof(&g, &BigInt::from(2));
        let view = proof.view("x");

        let s = representation_structure("x");

        let secret_bases = BaseMerge::new(&[&g, &secret]);
        let proof_bases = BaseMerge::new(&[&g, &view]);

        assert!(s.is_true(&g, &secret_bases, &secret));

        let mut from_secrets = Vec::new();
        s.commitments_from_secrets(&g, &mut from_secrets, &secret_bases, &secret);
        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &BigInt::from(2), &proof_bases, &view);

        assert_eq!(from_secrets, from_proof);
    }

    #[test]
    fn structure_check_requires_every_field() {
        let base = PedersenProof {
            commit: Some(BigInt::from(1)),
            s_result: Some(BigInt::from(1)),
            h_result: Some(BigInt::from(1)),
        };
        assert!(base.verify_structure());

        for strip in 0..3 {
            let mut proof = base.clone();
            match strip {
                0 => proof.commit = None,
                1 => proof.s_result = None,
                _ => proof.h_result = None,
            }
            assert!(!proof.verify_structure(), "field {strip}");
        }
    }

    #[test]
    fn fake_proof_is_structurally_valid() {
        let g = build_group(&BigInt::from(47)).unwrap();
        assert!(PedersenProof::fake(&g).verify_structure());
    }

    #[test]
    fn json_round_trip() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let before = PedersenProof::fake(&g);
        let json = serde_json::to_string(&before).unwrap();
        let after: PedersenProof = serde_json::from_str(&json).unwrap();
        assert!(after.verify_structure());
        assert_eq!(after.commit, before.commit);
    }
}
