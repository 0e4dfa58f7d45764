//! Issuer key files.
//!
//! JSON files with decimal-string integers: the public key carries the
//! modulus (plus the optional quadratic-residue bases `z`, `s`, `r` the
//! is-square proof covers), the private key the two safe primes and their
//! halves. Key parsing is a thin collaborator of the CLI; everything
//! cryptographic happens elsewhere.

use crate::bigint_serde;
use crate::error::ProofError;
use anyhow::{Context, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "n", with = "bigint_serde::int")]
    pub n: BigInt,
    #[serde(rename = "z", default, with = "bigint_serde::opt")]
    pub z: Option<BigInt>,
    #[serde(rename = "s", default, with = "bigint_serde::opt")]
    pub s: Option<BigInt>,
    #[serde(rename = "r", default, with = "bigint_serde::seq")]
    pub r: Vec<BigInt>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrivateKey {
    #[serde(rename = "p", with = "bigint_serde::int")]
    pub p: BigInt,
    #[serde(rename = "q", with = "bigint_serde::int")]
    pub q: BigInt,
    #[serde(rename = "pprime", with = "bigint_serde::int")]
    pub p_prime: BigInt,
    #[serde(rename = "qprime", with = "bigint_serde::int")]
    pub q_prime: BigInt,
}

impl PublicKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("error reading in public key {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("error parsing public key {}", path.display()))
    }
}

impl PrivateKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("error reading in private key {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("error parsing private key {}", path.display()))
    }

    /// Checks this key belongs to `pk` and is amenable to proving: none of
    /// the four primes may be `1 (mod 8)`, and the two pairs must fall in
    /// different classes mod 8.
    pub fn validate_for(&self, pk: &PublicKey) -> Result<(), ProofError> {
        if pk.n != &self.p * &self.q {
            return Err(ProofError::KeyMismatch);
        }

        let eight = BigInt::from(8);
        let p_mod = self.p.mod_floor(&eight);
        let q_mod = self.q.mod_floor(&eight);
        let p_prime_mod = self.p_prime.mod_floor(&eight);
        let q_prime_mod = self.q_prime.mod_floor(&eight);
        if p_mod.is_one()
            || q_mod.is_one()
            || p_prime_mod.is_one()
            || q_prime_mod.is_one()
            || p_mod == q_mod
            || p_prime_mod == q_prime_mod
        {
            return Err(ProofError::KeyNotAmenable);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> (PublicKey, PrivateKey) {
        let p = BigInt::from(26903);
        let q = BigInt::from(27803);
        (
            PublicKey {
                n: &p * &q,
                z: None,
                s: None,
                r: vec![],
            },
            PrivateKey {
                p_prime: &p >> 1,
                q_prime: &q >> 1,
                p,
                q,
            },
        )
    }

    #[test]
    fn accepts_amenable_key() {
        let (pk, sk) = test_key();
        assert!(sk.validate_for(&pk).is_ok());
    }

    #[test]
    fn rejects_mismatched_modulus() {
        let (mut pk, sk) = test_key();
        pk.n += 2;
        assert!(matches!(
            sk.validate_for(&pk),
            Err(ProofError::KeyMismatch)
        ));
    }

    #[test]
    fn rejects_one_mod_eight() {
        // 17 = 1 (mod 8)
        let pk = PublicKey {
            n: BigInt::from(17 * 23),
            z: None,
            s: None,
            r: vec![],
        };
        let sk = PrivateKey {
            p: BigInt::from(17),
            q: BigInt::from(23),
            p_prime: BigInt::from(8),
            q_prime: BigInt::from(11),
        };
        assert!(matches!(
            sk.validate_for(&pk),
            Err(ProofError::KeyNotAmenable)
        ));
    }

    #[test]
    fn rejects_matching_classes() {
        // 7 and 23 are both 7 (mod 8).
        let pk = PublicKey {
            n: BigInt::from(7 * 23),
            z: None,
            s: None,
            r: vec![],
        };
        let sk = PrivateKey {
            p: BigInt::from(7),
            q: BigInt::from(23),
            p_prime: BigInt::from(3),
            q_prime: BigInt::from(11),
        };
        assert!(matches!(
            sk.validate_for(&pk),
            Err(ProofError::KeyNotAmenable)
        ));
    }

    #[test]
    fn json_round_trip() {
        let (pk, sk) = test_key();
        let pk_json = serde_json::to_string(&pk).unwrap();
        let sk_json = serde_json::to_string(&sk).unwrap();
        let pk_back: PublicKey = serde_json::from_str(&pk_json).unwrap();
        let sk_back: PrivateKey = serde_json::from_str(&sk_json).unwrap();
        assert_eq!(pk_back.n, pk.n);
        assert_eq!(sk_back.p, sk.p);
        assert!(sk_back.validate_for(&pk_back).is_ok());
    }
}
