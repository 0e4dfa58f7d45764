//! Serde helpers encoding big integers as signed decimal strings.
//!
//! The proof wire format keeps every integer as a string so it survives any
//! JSON implementation regardless of number-precision limits. Absent values
//! encode as `null` and come back as `None`, which lets structural
//! verification reject them instead of the parser.

use num_bigint::BigInt;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

fn parse(s: &str) -> Result<BigInt, String> {
    s.parse::<BigInt>()
        .map_err(|e| format!("invalid integer {s:?}: {e}"))
}

/// `BigInt` <-> `"123"`.
pub mod int {
    use super::*;

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(DeError::custom)
    }
}

/// `Option<BigInt>` <-> `"123"` or `null`.
pub mod opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<BigInt>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigInt>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| parse(&s).map_err(DeError::custom)).transpose()
    }
}

/// `Vec<BigInt>` <-> `["1", "2", ...]`.
pub mod seq {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[BigInt], serializer: S) -> Result<S::Ok, S::Error> {
        let strings: Vec<String> = value.iter().map(|v| v.to_string()).collect();
        strings.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BigInt>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| parse(s).map_err(DeError::custom))
            .collect()
    }
}

/// `Vec<Option<BigInt>>` <-> `["1", null, ...]`.
pub mod opt_seq {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &[Option<BigInt>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let strings: Vec<Option<String>> = value
            .iter()
            .map(|v| v.as_ref().map(|v| v.to_string()))
            .collect();
        strings.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Option<BigInt>>, D::Error> {
        let strings = Vec::<Option<String>>::deserialize(deserializer)?;
        strings
            .into_iter()
            .map(|s| s.map(|s| parse(&s).map_err(DeError::custom)).transpose())
            .collect()
    }
}

/// `BTreeMap<String, Vec<Option<BigInt>>>`, the range-proof result layout.
pub mod result_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<String, Vec<Option<BigInt>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let strings: BTreeMap<&String, Vec<Option<String>>> = value
            .iter()
            .map(|(k, vs)| (k, vs.iter().map(|v| v.as_ref().map(|v| v.to_string())).collect()))
            .collect();
        strings.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<Option<BigInt>>>, D::Error> {
        let strings = BTreeMap::<String, Vec<Option<String>>>::deserialize(deserializer)?;
        strings
            .into_iter()
            .map(|(k, vs)| {
                let vs = vs
                    .into_iter()
                    .map(|s| s.map(|s| parse(&s).map_err(DeError::custom)).transpose())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((k, vs))
            })
            .collect()
    }
}
