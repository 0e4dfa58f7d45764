//! Range proofs: a named secret lies in `[2^l1 - 2^l2, 2^l1 + 2^l2)`
//! (callers state bounds via `l1`, `l2`; the common `[0, 2^l)` case uses
//! `l1 = 0`).
//!
//! The proof iterates the underlying representation statement once per
//! challenge bit. The range secret's randomizers are drawn from a window
//! `2^epsilon` wider than the bound; responses are shifted into a positive
//! encoding so the verifier can bound-check them directly.

use crate::bigint_serde;
use crate::cprng;
use crate::follower;
use crate::group::Group;
use crate::lookup::{BaseLookup, ProofLookup, SecretLookup, SecretMerge};
use crate::params::{RANGE_PROOF_EPSILON, RANGE_PROOF_ITERS};
use crate::representation::RepresentationProofStructure;
use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct RangeProofStructure {
    pub rep: RepresentationProofStructure,
    pub range_secret: String,
    pub l1: u32,
    pub l2: u32,
}

/// Per-iteration randomizers, kept until the challenge arrives.
pub struct RangeCommit {
    commits: BTreeMap<String, Vec<BigInt>>,
}

impl RangeCommit {
    /// Placeholder for commit structs assembled before their range proof
    /// has run.
    pub(crate) fn empty() -> Self {
        RangeCommit {
            commits: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangeProof {
    #[serde(rename = "Results", with = "bigint_serde::result_map")]
    pub results: BTreeMap<String, Vec<Option<BigInt>>>,
}

/// Secret lookup presenting iteration `i`'s randomizers.
struct IterRandomizers<'a> {
    commits: &'a BTreeMap<String, Vec<BigInt>>,
    i: usize,
}

impl SecretLookup for IterRandomizers<'_> {
    fn secret(&self, _name: &str) -> Option<&BigInt> {
        None
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        self.commits.get(name).and_then(|list| list.get(self.i))
    }
}

/// Result lookup presenting iteration `i`'s adjusted responses.
struct IterResults {
    results: BTreeMap<String, BigInt>,
}

impl ProofLookup for IterResults {
    fn result(&self, name: &str) -> Option<&BigInt> {
        self.results.get(name)
    }
}

impl RangeProofStructure {
    pub fn num_range_proofs(&self) -> usize {
        1
    }

    pub fn num_commitments(&self) -> usize {
        RANGE_PROOF_ITERS
    }

    pub fn is_true(&self, g: &Group, bases: &dyn BaseLookup, secrets: &dyn SecretLookup) -> bool {
        self.rep.is_true(g, bases, secrets)
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> RangeCommit {
        let mut commits: BTreeMap<String, Vec<BigInt>> = BTreeMap::new();
        for rhs in &self.rep.rhs {
            commits.insert(rhs.secret.clone(), Vec::with_capacity(RANGE_PROOF_ITERS));
        }

        let gen_limit = BigInt::one() << (self.l2 + RANGE_PROOF_EPSILON + 1);
        let gen_offset = BigInt::one() << (self.l2 + RANGE_PROOF_EPSILON);

        for _ in 0..RANGE_PROOF_ITERS {
            for (name, clist) in commits.iter_mut() {
                let rval = if *name == self.range_secret {
                    cprng::random_big_int(&gen_limit) - &gen_offset
                } else {
                    cprng::random_big_int(g.order())
                };
                clist.push(rval);
            }
        }

        for i in 0..RANGE_PROOF_ITERS {
            let iteration = IterRandomizers {
                commits: &commits,
                i,
            };
            let merged = SecretMerge::new(&[&iteration, secrets]);
            self.rep.commitments_from_secrets(g, list, bases, &merged);
        }

        follower::tick();

        RangeCommit { commits }
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &RangeCommit,
        secrets: &dyn SecretLookup,
    ) -> RangeProof {
        let mut results = BTreeMap::new();

        for (name, clist) in &commit.commits {
            let mut rlist = Vec::with_capacity(RANGE_PROOF_ITERS);
            if *name == self.range_secret {
                let result_offset = BigInt::one() << (self.l2 + RANGE_PROOF_EPSILON + 1);
                let l1_offset = BigInt::one() << self.l1;
                let secret = secrets
                    .secret(name)
                    .unwrap_or_else(|| panic!("missing range secret {name}"));
                for (i, rval) in clist.iter().enumerate() {
                    let mut res = if challenge.bit(i as u64) {
                        rval + &l1_offset - secret
                    } else {
                        rval.clone()
                    };
                    res += &result_offset;
                    rlist.push(Some(res));
                }
            } else {
                let secret = secrets
                    .secret(name)
                    .unwrap_or_else(|| panic!("missing secret {name}"));
                for (i, rval) in clist.iter().enumerate() {
                    let res = if challenge.bit(i as u64) {
                        g.mod_order(&(rval - secret))
                    } else {
                        rval.clone()
                    };
                    rlist.push(Some(res));
                }
            }
            results.insert(name.clone(), rlist);
        }

        RangeProof { results }
    }

    pub fn fake_proof(&self, g: &Group) -> RangeProof {
        let gen_limit = BigInt::one() << (self.l2 + RANGE_PROOF_EPSILON + 1);

        let mut results = BTreeMap::new();
        for rhs in &self.rep.rhs {
            let limit = if rhs.secret == self.range_secret {
                &gen_limit
            } else {
                g.order()
            };
            let rlist = (0..RANGE_PROOF_ITERS)
                .map(|_| Some(cprng::random_big_int(limit)))
                .collect();
            results.insert(rhs.secret.clone(), rlist);
        }

        RangeProof { results }
    }

    pub fn verify_structure(&self, proof: &RangeProof) -> bool {
        for rhs in &self.rep.rhs {
            let rlist = match proof.results.get(&rhs.secret) {
                Some(rlist) => rlist,
                None => return false,
            };
            if rlist.len() != RANGE_PROOF_ITERS {
                return false;
            }
            if rlist.iter().any(Option::is_none) {
                return false;
            }
        }

        // The positive encoding bounds every range-secret response.
        let range_limit = BigInt::one() << (self.l2 + RANGE_PROOF_EPSILON + 2);
        if let Some(rlist) = proof.results.get(&self.range_secret) {
            for val in rlist.iter().flatten() {
                if *val >= range_limit {
                    return false;
                }
            }
        }

        true
    }

    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof: &RangeProof,
    ) {
        let result_offset = BigInt::one() << (self.l2 + RANGE_PROOF_EPSILON + 1);
        let l1_offset = BigInt::one() << self.l1;

        for i in 0..RANGE_PROOF_ITERS {
            let mut results = BTreeMap::new();
            for (name, rlist) in &proof.results {
                let raw = rlist
                    .get(i)
                    .and_then(|v| v.clone())
                    .unwrap_or_default();
                let res = if *name == self.range_secret {
                    let mut res = raw - &result_offset;
                    if challenge.bit(i as u64) {
                        res -= &l1_offset;
                    }
                    res
                } else {
                    raw
                };
                results.insert(name.clone(), res);
            }

            let iteration = IterResults { results };
            let bit = BigInt::from(u8::from(challenge.bit(i as u64)));
            self.rep
                .commitments_from_proof(g, list, &bit, bases, &iteration);
        }

        follower::tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::build_group;
    use crate::lookup::testutil::TestLookup;
    use crate::lookup::BaseMerge;
    use crate::representation::{LhsContribution, RhsContribution};

    fn basic_structure() -> RangeProofStructure {
        RangeProofStructure {
            rep: RepresentationProofStructure::new(
                vec![LhsContribution::new("x", 1)],
                vec![RhsContribution::new("g", "x", 1)],
            ),
            range_secret: "x".into(),
            l1: 3,
            l2: 2,
        }
    }

    #[test]
    fn commitment_lists_agree() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let (_guard, follower) = crate::follower::testutil::counting_follower();

        let s = basic_structure();
        let data = TestLookup::default()
            .with_base("x", g.base("g").unwrap().modpow(&BigInt::from(7), g.modulus()))
            .with_secret("x", 7);
        let bases = BaseMerge::new(&[&g, &data]);

        assert!(s.is_true(&g, &bases, &data));

        let mut from_secrets = Vec::new();
        let commit = s.commitments_from_secrets(&g, &mut from_secrets, &bases, &data);
        assert_eq!(from_secrets.len(), s.num_commitments());
        assert_eq!(follower.count(), s.num_range_proofs());
        follower.reset();

        let challenge = BigInt::from(12345);
        let proof = s.build_proof(&g, &challenge, &commit, &data);
        assert!(s.verify_structure(&proof));

        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &challenge, &bases, &proof);
        assert_eq!(follower.count(), s.num_range_proofs());

        assert_eq!(from_secrets, from_proof);
        crate::follower::set_follower(None);
    }

    #[test]
    fn two_secret_statement() {
        let _quiet = crate::follower::testutil::quiet_guard();
        let g = build_group(&BigInt::from(47)).unwrap();

        let s = RangeProofStructure {
            rep: RepresentationProofStructure::new(
                vec![LhsContribution::new("c", 1)],
                vec![
                    RhsContribution::new("g", "x", 1),
                    RhsContribution::new("h", "xh", 1),
                ],
            ),
            range_secret: "x".into(),
            l1: 3,
            l2: 2,
        };

        let commit_value = g.mod_p(
            &(g.base("g").unwrap().modpow(&BigInt::from(7), g.modulus())
                * g.base("h").unwrap().modpow(&BigInt::from(21), g.modulus())),
        );
        let data = TestLookup::default()
            .with_base("c", commit_value)
            .with_secret("x", 7)
            .with_secret("xh", 21);
        let bases = BaseMerge::new(&[&g, &data]);

        assert!(s.is_true(&g, &bases, &data));

        let mut from_secrets = Vec::new();
        let commit = s.commitments_from_secrets(&g, &mut from_secrets, &bases, &data);
        let challenge = BigInt::from(12345);
        let proof = s.build_proof(&g, &challenge, &commit, &data);
        assert!(s.verify_structure(&proof));

        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &challenge, &bases, &proof);
        assert_eq!(from_secrets, from_proof);
    }

    #[test]
    fn structure_rejects_tampering() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = basic_structure();

        let good = s.fake_proof(&g);
        assert!(s.verify_structure(&good));

        let mut missing = good.clone();
        missing.results.remove("x");
        assert!(!s.verify_structure(&missing));

        let mut short = good.clone();
        short.results.get_mut("x").unwrap().pop();
        assert!(!s.verify_structure(&short));

        let mut nulled = good.clone();
        nulled.results.get_mut("x").unwrap()[3] = None;
        assert!(!s.verify_structure(&nulled));

        let mut oversized = good;
        oversized.results.get_mut("x").unwrap()[0] =
            Some(BigInt::one() << (s.l2 + RANGE_PROOF_EPSILON + 2));
        assert!(!s.verify_structure(&oversized));
    }

    #[test]
    fn json_round_trip_keeps_structure() {
        let g = build_group(&BigInt::from(47)).unwrap();
        let s = basic_structure();
        let before = s.fake_proof(&g);
        let json = serde_json::to_string(&before).unwrap();
        let after: RangeProof = serde_json::from_str(&json).unwrap();
        assert!(s.verify_structure(&after));
        assert_eq!(after.results, before.results);
    }
}
