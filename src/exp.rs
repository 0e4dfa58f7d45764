//! Proof that committed values satisfy `base^exponent ≡ result (mod modulus)`.
//!
//! Square-and-multiply in zero knowledge: the exponent is decomposed into
//! committed bits, the powers `base^(2^i)` form a committed squaring chain,
//! and per bit an exp-step OR proof advances a committed accumulator. An
//! accumulator that lands on `modulus - 1` is committed as `-1` so the
//! multiplication-proof quotients stay single-signed and short.
//!
//! Commitment generation fans out over a worker pool. Every subtree's slots
//! in the output list are reserved up front and each task writes only its
//! own slice, so the list order — and with it the Fiat-Shamir challenge —
//! never depends on scheduling.

use crate::bigint_serde;
use crate::cprng;
use crate::expstep::{ExpStepCommit, ExpStepProof, ExpStepStructure};
use crate::group::Group;
use crate::lookup::{
    BaseLookup, BaseMerge, NamedResult, ProofLookup, ProofMerge, SecretLookup, SecretMerge,
};
use crate::multiplication::{
    MultiplicationProof, MultiplicationProofCommit, MultiplicationProofStructure,
};
use crate::pedersen::{self, hider_name, PedersenProof, PedersenSecret};
use crate::rangeproof::{RangeCommit, RangeProof, RangeProofStructure};
use crate::representation::{LhsContribution, RepresentationProofStructure, RhsContribution};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "keyproof::exp";

#[derive(Clone, Debug)]
pub struct ExpProofStructure {
    base: String,
    exponent: String,
    modulus: String,
    result: String,
    myname: String,
    bitlen: u32,

    exp_bit_rep: Vec<RepresentationProofStructure>,
    exp_bit_eq: RepresentationProofStructure,

    base_pow_rep: Vec<RepresentationProofStructure>,
    base_pow_range: Vec<RangeProofStructure>,
    base_pow_rels: Vec<MultiplicationProofStructure>,

    start_rep: RepresentationProofStructure,

    inter_res_rep: Vec<RepresentationProofStructure>,
    inter_res_range: Vec<RangeProofStructure>,

    inter_steps: Vec<ExpStepStructure>,
}

pub struct ExpProofCommit {
    bit_eq_hider: BitEqHider,
    exp_bit_pedersen: Vec<PedersenSecret>,
    base_pow_pedersen: Vec<PedersenSecret>,
    start_pedersen: PedersenSecret,
    inter_res_pedersen: Vec<PedersenSecret>,

    base_pow_range_commit: Vec<RangeCommit>,
    base_pow_rel_commit: Vec<MultiplicationProofCommit>,
    inter_res_range_commit: Vec<RangeCommit>,
    inter_steps_commit: Vec<ExpStepCommit>,
}

/// The hider binding the bit commitments to the exponent commitment.
struct BitEqHider {
    name: String,
    value: BigInt,
    randomizer: BigInt,
}

impl SecretLookup for BitEqHider {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            Some(&self.value)
        } else {
            None
        }
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            Some(&self.randomizer)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpProof {
    #[serde(rename = "ExpBitEqResult", with = "bigint_serde::opt")]
    pub exp_bit_eq_result: Option<BigInt>,
    #[serde(rename = "ExpBitProofs")]
    pub exp_bit_proofs: Vec<PedersenProof>,

    #[serde(rename = "BasePowProofs")]
    pub base_pow_proofs: Vec<PedersenProof>,
    #[serde(rename = "BasePowRangeProofs")]
    pub base_pow_range_proofs: Vec<RangeProof>,
    #[serde(rename = "BasePowRelProofs")]
    pub base_pow_rel_proofs: Vec<MultiplicationProof>,

    #[serde(rename = "StartProof")]
    pub start_proof: PedersenProof,

    #[serde(rename = "InterResProofs")]
    pub inter_res_proofs: Vec<PedersenProof>,
    #[serde(rename = "InterResRangeProofs")]
    pub inter_res_range_proofs: Vec<RangeProof>,

    #[serde(rename = "InterStepsProofs")]
    pub inter_steps_proofs: Vec<ExpStepProof>,
}

/// Results produced by pooled commitment tasks, in queue order.
enum TaskOutput {
    Plain,
    Range(RangeCommit),
    Mult(Box<MultiplicationProofCommit>),
    Step(Box<ExpStepCommit>),
}

/// A commitment subtree waiting for a worker: an index range in the output
/// list and the generator that fills it.
struct PendingTask<'t> {
    offset: usize,
    len: usize,
    run: Box<dyn FnOnce(&mut [BigInt]) -> TaskOutput + Send + 't>,
}

/// Runs the queued tasks on the worker pool. The output list is carved into
/// disjoint mutable slices beforehand, so tasks write lock-free and the
/// final ordering is scheduling-independent.
fn run_pending(list: &mut [BigInt], tasks: Vec<PendingTask>) -> Vec<TaskOutput> {
    let mut jobs = Vec::with_capacity(tasks.len());
    let mut rest = list;
    let mut cursor = 0usize;
    for task in tasks {
        let (_, tail) = rest.split_at_mut(task.offset - cursor);
        let (slice, tail) = tail.split_at_mut(task.len);
        cursor = task.offset + task.len;
        rest = tail;
        jobs.push((slice, task.run));
    }
    jobs.into_par_iter()
        .map(|(slice, run)| run(slice))
        .collect()
}

fn reserve(list: &mut Vec<BigInt>, len: usize) -> usize {
    let offset = list.len();
    list.resize(offset + len, BigInt::zero());
    offset
}

impl ExpProofStructure {
    pub fn new(base: &str, exponent: &str, modulus: &str, result: &str, bitlen: u32) -> Self {
        let myname = format!("{base}_{exponent}_{modulus}_{result}_exp");
        let bit_name = |i: u32| format!("{myname}_bit_{i}");
        let base_name = |i: u32| format!("{myname}_base_{i}");
        let inter_name = |i: u32| format!("{myname}_inter_{i}");
        let start_name = format!("{myname}_start");

        let exp_bit_rep = (0..bitlen)
            .map(|i| pedersen::representation_structure(&bit_name(i)))
            .collect();

        let mut exp_bit_eq_lhs = vec![LhsContribution::new(exponent, -1)];
        for i in 0..bitlen {
            exp_bit_eq_lhs.push(LhsContribution::with_power(
                &bit_name(i),
                BigInt::one() << i,
            ));
        }
        let exp_bit_eq = RepresentationProofStructure::new(
            exp_bit_eq_lhs,
            vec![RhsContribution::new(
                "h",
                &format!("{myname}_biteqhider"),
                1,
            )],
        );

        let base_pow_rep = (0..bitlen)
            .map(|i| pedersen::representation_structure(&base_name(i)))
            .collect();
        let base_pow_range = (0..bitlen)
            .map(|i| pedersen::range_structure(&base_name(i), 0, bitlen))
            .collect();
        let base_pow_rels = (0..bitlen)
            .map(|i| {
                if i == 0 {
                    MultiplicationProofStructure::new(
                        &start_name,
                        base,
                        modulus,
                        &base_name(0),
                        bitlen,
                    )
                } else {
                    MultiplicationProofStructure::new(
                        &base_name(i - 1),
                        &base_name(i - 1),
                        modulus,
                        &base_name(i),
                        bitlen,
                    )
                }
            })
            .collect();

        let start_rep = RepresentationProofStructure::new(
            vec![
                LhsContribution::new(&start_name, 1),
                LhsContribution::new("g", -1),
            ],
            vec![RhsContribution::new("h", &hider_name(&start_name), 1)],
        );

        let inter_res_rep = (0..bitlen.saturating_sub(1))
            .map(|i| pedersen::representation_structure(&inter_name(i)))
            .collect();
        let inter_res_range = (0..bitlen.saturating_sub(1))
            .map(|i| pedersen::range_structure(&inter_name(i), 0, bitlen))
            .collect();

        let inter_steps = (0..bitlen)
            .map(|i| {
                let pre = if i == 0 {
                    start_name.clone()
                } else {
                    inter_name(i - 1)
                };
                let post = if i == bitlen - 1 {
                    result.to_owned()
                } else {
                    inter_name(i)
                };
                ExpStepStructure::new(&bit_name(i), &pre, &post, &base_name(i), modulus, bitlen)
            })
            .collect();

        ExpProofStructure {
            base: base.to_owned(),
            exponent: exponent.to_owned(),
            modulus: modulus.to_owned(),
            result: result.to_owned(),
            myname,
            bitlen,
            exp_bit_rep,
            exp_bit_eq,
            base_pow_rep,
            base_pow_range,
            base_pow_rels,
            start_rep,
            inter_res_rep,
            inter_res_range,
            inter_steps,
        }
    }

    fn bit_eq_hider_name(&self) -> String {
        format!("{}_biteqhider", self.myname)
    }

    pub fn num_range_proofs(&self) -> usize {
        self.base_pow_range.len()
            + self
                .base_pow_rels
                .iter()
                .map(MultiplicationProofStructure::num_range_proofs)
                .sum::<usize>()
            + self.inter_res_range.len()
            + self
                .inter_steps
                .iter()
                .map(ExpStepStructure::num_range_proofs)
                .sum::<usize>()
    }

    pub fn num_commitments(&self) -> usize {
        let bitlen = self.bitlen as usize;
        bitlen
            + self
                .exp_bit_rep
                .iter()
                .map(RepresentationProofStructure::num_commitments)
                .sum::<usize>()
            + self.exp_bit_eq.num_commitments()
            + bitlen
            + self
                .base_pow_rep
                .iter()
                .map(RepresentationProofStructure::num_commitments)
                .sum::<usize>()
            + self
                .base_pow_range
                .iter()
                .map(RangeProofStructure::num_commitments)
                .sum::<usize>()
            + self
                .base_pow_rels
                .iter()
                .map(MultiplicationProofStructure::num_commitments)
                .sum::<usize>()
            + 1
            + self.start_rep.num_commitments()
            + (bitlen - 1)
            + self
                .inter_res_rep
                .iter()
                .map(RepresentationProofStructure::num_commitments)
                .sum::<usize>()
            + self
                .inter_res_range
                .iter()
                .map(RangeProofStructure::num_commitments)
                .sum::<usize>()
            + self
                .inter_steps
                .iter()
                .map(ExpStepStructure::num_commitments)
                .sum::<usize>()
    }

    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) -> ExpProofCommit {
        let exponent = secrets.secret(&self.exponent).expect("exponent secret");
        let base = secrets.secret(&self.base).expect("base secret");
        let modulus = secrets.secret(&self.modulus).expect("modulus secret");
        let exponent_hider = secrets
            .secret(&hider_name(&self.exponent))
            .expect("exponent hider");

        tracing::debug!(target: LOG_TARGET, bitlen = self.bitlen, "generating exp commitments");

        // Exponent bits and the hider tying them to the exponent commitment.
        let mut bit_eq_value = -exponent_hider.clone();
        let mut exp_bit_pedersen = Vec::with_capacity(self.bitlen as usize);
        for i in 0..self.bitlen {
            let bit = BigInt::from(u8::from(exponent.bit(u64::from(i))));
            let ped = PedersenSecret::new(g, &format!("{}_bit_{i}", self.myname), &bit);
            bit_eq_value += ped.hider_value() << i;
            exp_bit_pedersen.push(ped);
        }
        let bit_eq_hider = BitEqHider {
            name: self.bit_eq_hider_name(),
            value: g.mod_order(&bit_eq_value),
            randomizer: cprng::random_big_int(g.order()),
        };

        // Base powers base^(2^i) mod m.
        let base_pow_pedersen: Vec<PedersenSecret> = (0..self.bitlen)
            .map(|i| {
                PedersenSecret::new(
                    g,
                    &format!("{}_base_{i}", self.myname),
                    &base.modpow(&(BigInt::one() << i), modulus),
                )
            })
            .collect();

        let start_pedersen =
            PedersenSecret::new(g, &format!("{}_start", self.myname), &BigInt::one());

        // Intermediate accumulators, committing mod-1 as -1 so the
        // multiplication quotients stay short.
        let mut cur = BigInt::one();
        let mut inter_res_pedersen = Vec::with_capacity(self.bitlen as usize - 1);
        for i in 0..self.bitlen - 1 {
            if exponent.bit(u64::from(i)) {
                cur = (&cur * base.modpow(&(BigInt::one() << i), modulus)).mod_floor(modulus);
                if cur == modulus - BigInt::one() {
                    cur = -BigInt::one();
                }
            }
            inter_res_pedersen.push(PedersenSecret::new(
                g,
                &format!("{}_inter_{i}", self.myname),
                &cur,
            ));
        }

        // Inner lookups spanning every fresh commitment plus the caller's.
        let mut base_parts: Vec<&dyn BaseLookup> = Vec::new();
        let mut secret_parts: Vec<&dyn SecretLookup> = Vec::new();
        for ped in &exp_bit_pedersen {
            base_parts.push(ped);
            secret_parts.push(ped);
        }
        for ped in &base_pow_pedersen {
            base_parts.push(ped);
            secret_parts.push(ped);
        }
        base_parts.push(&start_pedersen);
        secret_parts.push(&start_pedersen);
        for ped in &inter_res_pedersen {
            base_parts.push(ped);
            secret_parts.push(ped);
        }
        base_parts.push(bases);
        secret_parts.push(secrets);
        secret_parts.push(&bit_eq_hider);
        let inner_bases = BaseMerge::new(&base_parts);
        let inner_secrets = SecretMerge::new(&secret_parts);

        // Assemble the list, queueing independent subtrees for the pool.
        let mut tasks: Vec<PendingTask> = Vec::new();

        for ped in &exp_bit_pedersen {
            ped.commitments(list);
        }
        for rep in &self.exp_bit_rep {
            let offset = reserve(list, rep.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: rep.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rep.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        self.exp_bit_eq
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);

        for ped in &base_pow_pedersen {
            ped.commitments(list);
        }
        for rep in &self.base_pow_rep {
            let offset = reserve(list, rep.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: rep.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rep.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        for range in &self.base_pow_range {
            let offset = reserve(list, range.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: range.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    let commit = range.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Range(commit)
                }),
            });
        }
        for rel in &self.base_pow_rels {
            let offset = reserve(list, rel.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: rel.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    let commit = rel.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Mult(Box::new(commit))
                }),
            });
        }

        start_pedersen.commitments(list);
        self.start_rep
            .commitments_from_secrets(g, list, &inner_bases, &inner_secrets);

        for ped in &inter_res_pedersen {
            ped.commitments(list);
        }
        for rep in &self.inter_res_rep {
            let offset = reserve(list, rep.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: rep.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rep.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        for range in &self.inter_res_range {
            let offset = reserve(list, range.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: range.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    let commit = range.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Range(commit)
                }),
            });
        }
        for step in &self.inter_steps {
            let offset = reserve(list, step.num_commitments());
            let (ib, is) = (&inner_bases, &inner_secrets);
            tasks.push(PendingTask {
                offset,
                len: step.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    let commit = step.commitments_from_secrets(g, &mut local, ib, is);
                    out.clone_from_slice(&local);
                    TaskOutput::Step(Box::new(commit))
                }),
            });
        }

        let outputs = run_pending(list, tasks);

        // Outputs arrive in queue order; sort them back into their
        // per-category commit vectors.
        let mut base_pow_range_commit = Vec::with_capacity(self.base_pow_range.len());
        let mut base_pow_rel_commit = Vec::with_capacity(self.base_pow_rels.len());
        let mut inter_res_range_commit = Vec::with_capacity(self.inter_res_range.len());
        let mut inter_steps_commit = Vec::with_capacity(self.inter_steps.len());
        for output in outputs {
            match output {
                TaskOutput::Plain => {}
                TaskOutput::Range(c) => {
                    if base_pow_range_commit.len() < self.base_pow_range.len() {
                        base_pow_range_commit.push(c);
                    } else {
                        inter_res_range_commit.push(c);
                    }
                }
                TaskOutput::Mult(c) => base_pow_rel_commit.push(*c),
                TaskOutput::Step(c) => inter_steps_commit.push(*c),
            }
        }

        ExpProofCommit {
            bit_eq_hider,
            exp_bit_pedersen,
            base_pow_pedersen,
            start_pedersen,
            inter_res_pedersen,
            base_pow_range_commit,
            base_pow_rel_commit,
            inter_res_range_commit,
            inter_steps_commit,
        }
    }

    pub fn build_proof(
        &self,
        g: &Group,
        challenge: &BigInt,
        commit: &ExpProofCommit,
        secrets: &dyn SecretLookup,
    ) -> ExpProof {
        let mut secret_parts: Vec<&dyn SecretLookup> = Vec::new();
        for ped in &commit.exp_bit_pedersen {
            secret_parts.push(ped);
        }
        for ped in &commit.base_pow_pedersen {
            secret_parts.push(ped);
        }
        secret_parts.push(&commit.start_pedersen);
        for ped in &commit.inter_res_pedersen {
            secret_parts.push(ped);
        }
        secret_parts.push(secrets);
        secret_parts.push(&commit.bit_eq_hider);
        let inner_secrets = SecretMerge::new(&secret_parts);

        let exp_bit_proofs = commit
            .exp_bit_pedersen
            .iter()
            .map(|ped| ped.build_proof(g, challenge))
            .collect();
        let base_pow_proofs = commit
            .base_pow_pedersen
            .iter()
            .map(|ped| ped.build_proof(g, challenge))
            .collect();
        let base_pow_range_proofs = commit
            .base_pow_range_commit
            .iter()
            .zip(&self.base_pow_range)
            .map(|(c, s)| s.build_proof(g, challenge, c, &inner_secrets))
            .collect();
        let base_pow_rel_proofs = commit
            .base_pow_rel_commit
            .iter()
            .zip(&self.base_pow_rels)
            .map(|(c, s)| s.build_proof(g, challenge, c, &inner_secrets))
            .collect();

        let start_proof = commit.start_pedersen.build_proof(g, challenge);

        let inter_res_proofs = commit
            .inter_res_pedersen
            .iter()
            .map(|ped| ped.build_proof(g, challenge))
            .collect();
        let inter_res_range_proofs = commit
            .inter_res_range_commit
            .iter()
            .zip(&self.inter_res_range)
            .map(|(c, s)| s.build_proof(g, challenge, c, &inner_secrets))
            .collect();

        let inter_steps_proofs = commit
            .inter_steps_commit
            .iter()
            .zip(&self.inter_steps)
            .map(|(c, s)| s.build_proof(g, challenge, c, &inner_secrets))
            .collect();

        let exp_bit_eq_result = Some(g.mod_order(
            &(&commit.bit_eq_hider.randomizer - challenge * &commit.bit_eq_hider.value),
        ));

        ExpProof {
            exp_bit_eq_result,
            exp_bit_proofs,
            base_pow_proofs,
            base_pow_range_proofs,
            base_pow_rel_proofs,
            start_proof,
            inter_res_proofs,
            inter_res_range_proofs,
            inter_steps_proofs,
        }
    }

    pub fn fake_proof(&self, g: &Group, challenge: &BigInt) -> ExpProof {
        ExpProof {
            exp_bit_eq_result: Some(cprng::random_big_int(g.order())),
            exp_bit_proofs: (0..self.bitlen).map(|_| PedersenProof::fake(g)).collect(),
            base_pow_proofs: (0..self.bitlen).map(|_| PedersenProof::fake(g)).collect(),
            base_pow_range_proofs: self
                .base_pow_range
                .iter()
                .map(|s| s.fake_proof(g))
                .collect(),
            base_pow_rel_proofs: self.base_pow_rels.iter().map(|s| s.fake_proof(g)).collect(),
            start_proof: PedersenProof::fake(g),
            inter_res_proofs: (0..self.bitlen - 1)
                .map(|_| PedersenProof::fake(g))
                .collect(),
            inter_res_range_proofs: self
                .inter_res_range
                .iter()
                .map(|s| s.fake_proof(g))
                .collect(),
            inter_steps_proofs: self
                .inter_steps
                .iter()
                .map(|s| s.fake_proof(g, challenge))
                .collect(),
        }
    }

    pub fn verify_structure(&self, challenge: &BigInt, proof: &ExpProof) -> bool {
        let bitlen = self.bitlen as usize;

        if proof.exp_bit_eq_result.is_none() || proof.exp_bit_proofs.len() != bitlen {
            return false;
        }
        if proof.exp_bit_proofs.iter().any(|p| !p.verify_structure()) {
            return false;
        }

        if proof.base_pow_proofs.len() != bitlen
            || proof.base_pow_range_proofs.len() != bitlen
            || proof.base_pow_rel_proofs.len() != bitlen
        {
            return false;
        }
        for i in 0..bitlen {
            if !proof.base_pow_proofs[i].verify_structure()
                || !self.base_pow_range[i].verify_structure(&proof.base_pow_range_proofs[i])
                || !self.base_pow_rels[i].verify_structure(&proof.base_pow_rel_proofs[i])
            {
                return false;
            }
        }

        if !proof.start_proof.verify_structure() {
            return false;
        }

        if proof.inter_res_proofs.len() != bitlen - 1
            || proof.inter_res_range_proofs.len() != bitlen - 1
        {
            return false;
        }
        for i in 0..bitlen - 1 {
            if !proof.inter_res_proofs[i].verify_structure()
                || !self.inter_res_range[i].verify_structure(&proof.inter_res_range_proofs[i])
            {
                return false;
            }
        }

        if proof.inter_steps_proofs.len() != bitlen {
            return false;
        }
        for i in 0..bitlen {
            if !self.inter_steps[i].verify_structure(challenge, &proof.inter_steps_proofs[i]) {
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
        bases: &dyn BaseLookup,
        proof_data: &dyn ProofLookup,
        proof: &ExpProof,
    ) {
        // Named views over the proof's commitments.
        let bit_views: Vec<_> = proof
            .exp_bit_proofs
            .iter()
            .enumerate()
            .map(|(i, p)| p.view(&format!("{}_bit_{i}", self.myname)))
            .collect();
        let base_views: Vec<_> = proof
            .base_pow_proofs
            .iter()
            .enumerate()
            .map(|(i, p)| p.view(&format!("{}_base_{i}", self.myname)))
            .collect();
        let start_view = proof.start_proof.view(&format!("{}_start", self.myname));
        let inter_views: Vec<_> = proof
            .inter_res_proofs
            .iter()
            .enumerate()
            .map(|(i, p)| p.view(&format!("{}_inter_{i}", self.myname)))
            .collect();
        let bit_eq = NamedResult::new(self.bit_eq_hider_name(), proof.exp_bit_eq_result.as_ref());

        let mut base_parts: Vec<&dyn BaseLookup> = Vec::new();
        let mut proof_parts: Vec<&dyn ProofLookup> = Vec::new();
        for view in &bit_views {
            base_parts.push(view);
            proof_parts.push(view);
        }
        for view in &base_views {
            base_parts.push(view);
            proof_parts.push(view);
        }
        base_parts.push(&start_view);
        proof_parts.push(&start_view);
        for view in &inter_views {
            base_parts.push(view);
            proof_parts.push(view);
        }
        base_parts.push(bases);
        proof_parts.push(proof_data);
        proof_parts.push(&bit_eq);
        let inner_bases = BaseMerge::new(&base_parts);
        let inner_proof = ProofMerge::new(&proof_parts);

        let mut tasks: Vec<PendingTask> = Vec::new();

        for p in &proof.exp_bit_proofs {
            p.commitments(list);
        }
        for rep in &self.exp_bit_rep {
            let offset = reserve(list, rep.num_commitments());
            let (ib, ip) = (&inner_bases, &inner_proof);
            tasks.push(PendingTask {
                offset,
                len: rep.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rep.commitments_from_proof(g, &mut local, challenge, ib, ip);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        self.exp_bit_eq
            .commitments_from_proof(g, list, challenge, &inner_bases, &inner_proof);

        for p in &proof.base_pow_proofs {
            p.commitments(list);
        }
        for rep in &self.base_pow_rep {
            let offset = reserve(list, rep.num_commitments());
            let (ib, ip) = (&inner_bases, &inner_proof);
            tasks.push(PendingTask {
                offset,
                len: rep.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rep.commitments_from_proof(g, &mut local, challenge, ib, ip);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        for (range, range_proof) in self.base_pow_range.iter().zip(&proof.base_pow_range_proofs) {
            let offset = reserve(list, range.num_commitments());
            let ib = &inner_bases;
            tasks.push(PendingTask {
                offset,
                len: range.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    range.commitments_from_proof(g, &mut local, challenge, ib, range_proof);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        for (rel, rel_proof) in self.base_pow_rels.iter().zip(&proof.base_pow_rel_proofs) {
            let offset = reserve(list, rel.num_commitments());
            let (ib, ip) = (&inner_bases, &inner_proof);
            tasks.push(PendingTask {
                offset,
                len: rel.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rel.commitments_from_proof(g, &mut local, challenge, ib, ip, rel_proof);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }

        proof.start_proof.commitments(list);
        self.start_rep
            .commitments_from_proof(g, list, challenge, &inner_bases, &inner_proof);

        for p in &proof.inter_res_proofs {
            p.commitments(list);
        }
        for rep in &self.inter_res_rep {
            let offset = reserve(list, rep.num_commitments());
            let (ib, ip) = (&inner_bases, &inner_proof);
            tasks.push(PendingTask {
                offset,
                len: rep.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    rep.commitments_from_proof(g, &mut local, challenge, ib, ip);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        for (range, range_proof) in self
            .inter_res_range
            .iter()
            .zip(&proof.inter_res_range_proofs)
        {
            let offset = reserve(list, range.num_commitments());
            let ib = &inner_bases;
            tasks.push(PendingTask {
                offset,
                len: range.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    range.commitments_from_proof(g, &mut local, challenge, ib, range_proof);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }
        for (step, step_proof) in self.inter_steps.iter().zip(&proof.inter_steps_proofs) {
            let offset = reserve(list, step.num_commitments());
            let ib = &inner_bases;
            tasks.push(PendingTask {
                offset,
                len: step.num_commitments(),
                run: Box::new(move |out| {
                    let mut local = Vec::new();
                    step.commitments_from_proof(g, &mut local, challenge, ib, step_proof);
                    out.clone_from_slice(&local);
                    TaskOutput::Plain
                }),
            });
        }

        run_pending(list, tasks);
    }

    pub fn is_true(&self, secrets: &dyn SecretLookup) -> bool {
        let (base, exponent, modulus, result) = match (
            secrets.secret(&self.base),
            secrets.secret(&self.exponent),
            secrets.secret(&self.modulus),
            secrets.secret(&self.result),
        ) {
            (Some(b), Some(e), Some(m), Some(r)) => (b, e, m, r),
            _ => return false,
        };

        let (div, rem) = (base.modpow(exponent, modulus) - result).div_mod_floor(modulus);
        rem.is_zero() && div.bits() <= u64::from(self.bitlen)
    }
}
