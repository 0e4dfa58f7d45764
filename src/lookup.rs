//! Name-based lookups for bases, secrets and proof results.
//!
//! Proof structures are templates: they reference bases and secrets by name
//! and are instantiated against whatever lookups the caller assembles.
//! Mergers chain several lookups, querying parts in insertion order; a
//! missing name is `None`, and callers legitimately probe for presence.

use crate::math;
use num_bigint::BigInt;
use std::collections::HashMap;

/// Sources of named bases for exponentiation.
pub trait BaseLookup: Sync {
    fn base(&self, name: &str) -> Option<&BigInt>;

    /// The names this lookup can answer for; used to index large mergers.
    fn base_names(&self) -> Vec<&str>;

    /// `base^exp mod modulus`, or `None` when the base is unknown.
    /// Negative exponents invert the base.
    fn exp(&self, name: &str, exp: &BigInt, modulus: &BigInt) -> Option<BigInt> {
        self.base(name)
            .map(|b| math::mod_exp_signed(b, exp, modulus))
    }
}

/// Sources of named secrets and their sigma-protocol randomizers.
pub trait SecretLookup: Sync {
    fn secret(&self, name: &str) -> Option<&BigInt>;
    fn randomizer(&self, name: &str) -> Option<&BigInt>;
}

/// Sources of named proof responses.
pub trait ProofLookup: Sync {
    fn result(&self, name: &str) -> Option<&BigInt>;
}

const INDEX_THRESHOLD: usize = 16;

/// Chains base lookups; the first part knowing a name wins. Above
/// [`INDEX_THRESHOLD`] parts a name-to-part index is built once.
pub struct BaseMerge<'a> {
    parts: Vec<&'a dyn BaseLookup>,
    index: Option<HashMap<String, usize>>,
}

impl<'a> BaseMerge<'a> {
    pub fn new(parts: &[&'a dyn BaseLookup]) -> Self {
        let index = if parts.len() > INDEX_THRESHOLD {
            let mut map = HashMap::new();
            for (i, part) in parts.iter().enumerate() {
                for name in part.base_names() {
                    map.entry(name.to_owned()).or_insert(i);
                }
            }
            Some(map)
        } else {
            None
        };
        BaseMerge {
            parts: parts.to_vec(),
            index,
        }
    }

    fn part_for(&self, name: &str) -> Option<&'a dyn BaseLookup> {
        match &self.index {
            Some(map) => map.get(name).map(|&i| self.parts[i]),
            None => self
                .parts
                .iter()
                .copied()
                .find(|p| p.base(name).is_some()),
        }
    }
}

impl BaseLookup for BaseMerge<'_> {
    fn base(&self, name: &str) -> Option<&BigInt> {
        self.part_for(name).and_then(|p| p.base(name))
    }

    fn base_names(&self) -> Vec<&str> {
        self.parts.iter().flat_map(|p| p.base_names()).collect()
    }

    fn exp(&self, name: &str, exp: &BigInt, modulus: &BigInt) -> Option<BigInt> {
        self.part_for(name).and_then(|p| p.exp(name, exp, modulus))
    }
}

/// Chains secret lookups in insertion order.
pub struct SecretMerge<'a> {
    parts: Vec<&'a dyn SecretLookup>,
}

impl<'a> SecretMerge<'a> {
    pub fn new(parts: &[&'a dyn SecretLookup]) -> Self {
        SecretMerge {
            parts: parts.to_vec(),
        }
    }
}

impl SecretLookup for SecretMerge<'_> {
    fn secret(&self, name: &str) -> Option<&BigInt> {
        self.parts.iter().find_map(|p| p.secret(name))
    }

    fn randomizer(&self, name: &str) -> Option<&BigInt> {
        self.parts.iter().find_map(|p| p.randomizer(name))
    }
}

/// A single named proof response; the adapter composite proofs use to
/// expose their closing scalars.
pub struct NamedResult<'a> {
    name: String,
    value: Option<&'a BigInt>,
}

impl<'a> NamedResult<'a> {
    pub fn new(name: String, value: Option<&'a BigInt>) -> Self {
        NamedResult { name, value }
    }
}

impl ProofLookup for NamedResult<'_> {
    fn result(&self, name: &str) -> Option<&BigInt> {
        if name == self.name {
            self.value
        } else {
            None
        }
    }
}

/// Chains proof lookups in insertion order.
pub struct ProofMerge<'a> {
    parts: Vec<&'a dyn ProofLookup>,
}

impl<'a> ProofMerge<'a> {
    pub fn new(parts: &[&'a dyn ProofLookup]) -> Self {
        ProofMerge {
            parts: parts.to_vec(),
        }
    }
}

impl ProofLookup for ProofMerge<'_> {
    fn result(&self, name: &str) -> Option<&BigInt> {
        self.parts.iter().find_map(|p| p.result(name))
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::collections::BTreeMap;

    /// Map-backed lookups for exercising proof structures directly.
    #[derive(Default)]
    pub struct TestLookup {
        pub bases: BTreeMap<String, BigInt>,
        pub secrets: BTreeMap<String, BigInt>,
        pub randomizers: BTreeMap<String, BigInt>,
        pub results: BTreeMap<String, BigInt>,
    }

    impl TestLookup {
        pub fn with_base(mut self, name: &str, value: BigInt) -> Self {
            self.bases.insert(name.into(), value);
            self
        }

        pub fn with_secret(mut self, name: &str, value: i64) -> Self {
            self.secrets.insert(name.into(), BigInt::from(value));
            self
        }

        pub fn with_randomizer(mut self, name: &str, value: i64) -> Self {
            self.randomizers.insert(name.into(), BigInt::from(value));
            self
        }

        pub fn with_result(mut self, name: &str, value: i64) -> Self {
            self.results.insert(name.into(), BigInt::from(value));
            self
        }
    }

    impl BaseLookup for TestLookup {
        fn base(&self, name: &str) -> Option<&BigInt> {
            self.bases.get(name)
        }

        fn base_names(&self) -> Vec<&str> {
            self.bases.keys().map(String::as_str).collect()
        }
    }

    impl SecretLookup for TestLookup {
        fn secret(&self, name: &str) -> Option<&BigInt> {
            self.secrets.get(name)
        }

        fn randomizer(&self, name: &str) -> Option<&BigInt> {
            self.randomizers.get(name)
        }
    }

    impl ProofLookup for TestLookup {
        fn result(&self, name: &str) -> Option<&BigInt> {
            self.results.get(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::TestLookup;
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn merge_queries_in_insertion_order() {
        let first = TestLookup::default().with_base("x", BigInt::from(3));
        let second = TestLookup::default()
            .with_base("x", BigInt::from(5))
            .with_base("y", BigInt::from(7));
        let merge = BaseMerge::new(&[&first, &second]);
        assert_eq!(merge.base("x"), Some(&BigInt::from(3)));
        assert_eq!(merge.base("y"), Some(&BigInt::from(7)));
        assert_eq!(merge.base("z"), None);
    }

    #[test]
    fn large_merges_index_by_name() {
        let parts: Vec<TestLookup> = (0..20)
            .map(|i| TestLookup::default().with_base(&format!("b{i}"), BigInt::from(i)))
            .collect();
        let refs: Vec<&dyn BaseLookup> = parts.iter().map(|p| p as &dyn BaseLookup).collect();
        let merge = BaseMerge::new(&refs);
        assert!(merge.index.is_some());
        for i in 0..20 {
            assert_eq!(merge.base(&format!("b{i}")), Some(&BigInt::from(i)));
        }
        assert_eq!(merge.base("missing"), None);
    }

    #[test]
    fn secret_merge_falls_through() {
        let empty = TestLookup::default();
        let filled = TestLookup::default()
            .with_secret("s", 9)
            .with_randomizer("s", 4);
        let merge = SecretMerge::new(&[&empty, &filled]);
        assert_eq!(merge.secret("s"), Some(&BigInt::from(9)));
        assert_eq!(merge.randomizer("s"), Some(&BigInt::from(4)));
        assert_eq!(merge.secret("missing"), None);
    }
}
