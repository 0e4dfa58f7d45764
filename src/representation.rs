//! Representation proofs, the atomic sigma statement.
//!
//! A structure declares `∏ lhs_base^power  =  ∏ rhs_base^(secret·power)`
//! over named bases and secrets. Proving commits to the right-hand side
//! under fresh randomizers; verifying reconstructs the same commitment from
//! the proof responses and the challenge. For a valid witness both paths
//! yield bit-identical values, which is what the Fiat-Shamir hash check
//! rests on.

use crate::group::Group;
use crate::lookup::{BaseLookup, ProofLookup, SecretLookup};
use num_bigint::BigInt;
use num_traits::One;

#[derive(Clone, Debug)]
pub struct LhsContribution {
    pub base: String,
    pub power: BigInt,
}

#[derive(Clone, Debug)]
pub struct RhsContribution {
    pub base: String,
    pub secret: String,
    pub power: i64,
}

impl LhsContribution {
    pub fn new(base: &str, power: i64) -> Self {
        LhsContribution {
            base: base.to_owned(),
            power: BigInt::from(power),
        }
    }

    pub fn with_power(base: &str, power: BigInt) -> Self {
        LhsContribution {
            base: base.to_owned(),
            power,
        }
    }
}

impl RhsContribution {
    pub fn new(base: &str, secret: &str, power: i64) -> Self {
        RhsContribution {
            base: base.to_owned(),
            secret: secret.to_owned(),
            power,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RepresentationProofStructure {
    pub lhs: Vec<LhsContribution>,
    pub rhs: Vec<RhsContribution>,
}

/// Unknown bases contribute zero, which no verification equation survives.
fn exp_or_zero(bases: &dyn BaseLookup, name: &str, exp: &BigInt, modulus: &BigInt) -> BigInt {
    bases.exp(name, exp, modulus).unwrap_or_default()
}

impl RepresentationProofStructure {
    pub fn new(lhs: Vec<LhsContribution>, rhs: Vec<RhsContribution>) -> Self {
        RepresentationProofStructure { lhs, rhs }
    }

    pub fn num_range_proofs(&self) -> usize {
        0
    }

    pub fn num_commitments(&self) -> usize {
        1
    }

    /// Appends the prover-side commitment `∏ base^(power·randomizer)`.
    pub fn commitments_from_secrets(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        bases: &dyn BaseLookup,
        secrets: &dyn SecretLookup,
    ) {
        let mut commitment = BigInt::one();
        for rhs in &self.rhs {
            let randomizer = secrets
                .randomizer(&rhs.secret)
                .unwrap_or_else(|| panic!("missing randomizer for {}", rhs.secret));
            let exp = g.mod_order(&(BigInt::from(rhs.power) * randomizer));
            let contribution = exp_or_zero(bases, &rhs.base, &exp, g.modulus());
            commitment = g.mod_p(&(commitment * contribution));
        }
        list.push(commitment);
    }

    /// Appends the verifier-side reconstruction
    /// `(∏ lhs^power)^challenge · ∏ base^(power·result)`.
    pub fn commitments_from_proof(
        &self,
        g: &Group,
        list: &mut Vec<BigInt>,
        challenge: &BigInt,
        bases: &dyn BaseLookup,
        proof_data: &dyn ProofLookup,
    ) {
        let mut lhs_acc = BigInt::one();
        for lhs in &self.lhs {
            let base = exp_or_zero(bases, &lhs.base, &lhs.power, g.modulus());
            lhs_acc = g.mod_p(&(lhs_acc * base));
        }

        let mut commitment = crate::math::mod_exp_signed(&lhs_acc, challenge, g.modulus());
        for rhs in &self.rhs {
            let result = match proof_data.result(&rhs.secret) {
                Some(r) => r,
                None => {
                    list.push(BigInt::default());
                    return;
                }
            };
            let exp = g.mod_order(&(BigInt::from(rhs.power) * result));
            let contribution = exp_or_zero(bases, &rhs.base, &exp, g.modulus());
            commitment = g.mod_p(&(commitment * contribution));
        }
        list.push(commitment);
    }

    /// Evaluates the statement on the actual secrets.
    pub fn is_true(&self, g: &Group, bases: &dyn BaseLookup, secrets: &dyn SecretLookup) -> bool {
        let mut lhs_acc = BigInt::one();
        for lhs in &self.lhs {
            let base = exp_or_zero(bases, &lhs.base, &lhs.power, g.modulus());
            lhs_acc = g.mod_p(&(lhs_acc * base));
        }

        let mut rhs_acc = BigInt::one();
        for rhs in &self.rhs {
            let secret = match secrets.secret(&rhs.secret) {
                Some(s) => s,
                None => return false,
            };
            let base = exp_or_zero(bases, &rhs.base, &BigInt::from(rhs.power), g.modulus());
            let contribution = crate::math::mod_exp_signed(&base, secret, g.modulus());
            rhs_acc = g.mod_p(&(rhs_acc * contribution));
        }

        lhs_acc == rhs_acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::build_group;
    use crate::lookup::testutil::TestLookup;
    use crate::lookup::BaseMerge;
    use num_bigint::BigInt;

    #[test]
    fn secret_and_proof_commitments_agree() {
        let g = build_group(&BigInt::from(47)).expect("47 is a safe prime");

        let s = RepresentationProofStructure::new(
            vec![LhsContribution::new("x", 1)],
            vec![RhsContribution::new("g", "x", 1)],
        );

        let data = TestLookup::default()
            .with_base("x", g.base("g").unwrap().modpow(&BigInt::from(10), g.modulus()))
            .with_secret("x", 10)
            .with_randomizer("x", 15)
            .with_result("x", 5);

        let bases = BaseMerge::new(&[&g, &data]);

        assert!(s.is_true(&g, &bases, &data));

        let mut from_secrets = Vec::new();
        s.commitments_from_secrets(&g, &mut from_secrets, &bases, &data);
        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &BigInt::from(1), &bases, &data);

        assert_eq!(from_secrets.len(), 1);
        assert_eq!(from_proof.len(), 1);
        assert_eq!(from_secrets[0], from_proof[0]);
    }

    #[test]
    fn multi_base_statement_with_scaled_lhs() {
        let g = build_group(&BigInt::from(47)).unwrap();

        let s = RepresentationProofStructure::new(
            vec![LhsContribution::new("c", 4)],
            vec![
                RhsContribution::new("g", "x", 2),
                RhsContribution::new("h", "y", 1),
            ],
        );

        let commit = g.mod_p(
            &(g.base("g").unwrap().modpow(&BigInt::from(2), g.modulus())
                * g.base("h").unwrap().modpow(&BigInt::from(12), g.modulus())),
        );
        let data = TestLookup::default()
            .with_base("c", commit)
            .with_secret("x", 4)
            .with_secret("y", 2)
            .with_randomizer("x", 12)
            .with_randomizer("y", 21)
            .with_result("x", 4)
            .with_result("y", 17);

        let bases = BaseMerge::new(&[&g, &data]);

        assert!(s.is_true(&g, &bases, &data));

        let mut from_secrets = Vec::new();
        s.commitments_from_secrets(&g, &mut from_secrets, &bases, &data);
        let mut from_proof = Vec::new();
        s.commitments_from_proof(&g, &mut from_proof, &BigInt::from(2), &bases, &data);

        assert_eq!(from_secrets[0], from_proof[0]);
    }
}
