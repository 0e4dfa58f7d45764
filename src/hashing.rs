//! Fiat-Shamir hashing.
//!
//! Commitment lists are serialized canonically as an ASN.1 DER sequence —
//! an INTEGER holding the element count followed by every value as an
//! INTEGER — and hashed with SHA-256. Any change to order, count or value
//! changes the challenge.

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};
use sha2::{Digest, Sha256};

/// Minimal two's-complement big-endian content octets of a DER INTEGER.
fn der_integer_content(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return vec![0];
    }
    if value.is_positive() {
        let mut bytes = value.to_bytes_be().1;
        if bytes[0] & 0x80 != 0 {
            bytes.insert(0, 0);
        }
        return bytes;
    }
    // Negative: find the least n with value >= -2^(8n-1), then emit
    // 2^(8n) + value on n bytes.
    let mut n = 1u64;
    while *value < -(BigInt::one() << (8 * n - 1)) {
        n += 1;
    }
    let shifted = (BigInt::one() << (8 * n)) + value;
    let mut bytes = shifted.to_bytes_be().1;
    while (bytes.len() as u64) < n {
        bytes.insert(0, 0);
    }
    bytes
}

fn der_length(out: &mut Vec<u8>, len: usize) {
    if len < 128 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        out.push(0x80 | (bytes.len() - first) as u8);
        out.extend_from_slice(&bytes[first..]);
    }
}

fn der_integer(out: &mut Vec<u8>, value: &BigInt) {
    let content = der_integer_content(value);
    out.push(0x02);
    der_length(out, content.len());
    out.extend_from_slice(&content);
}

/// DER `SEQUENCE { INTEGER count, INTEGER v_0, ... }`.
fn der_commit_sequence(values: &[&BigInt]) -> Vec<u8> {
    let mut body = Vec::new();
    der_integer(&mut body, &BigInt::from(values.len()));
    for v in values {
        der_integer(&mut body, v);
    }
    let mut out = Vec::with_capacity(body.len() + 4);
    out.push(0x30);
    der_length(&mut out, body.len());
    out.extend_from_slice(&body);
    out
}

/// Hashes an ordered commitment list into a challenge integer.
pub fn hash_commit(values: &[BigInt]) -> BigInt {
    let refs: Vec<&BigInt> = values.iter().collect();
    hash_commit_refs(&refs)
}

fn hash_commit_refs(values: &[&BigInt]) -> BigInt {
    let encoded = der_commit_sequence(values);
    let digest = Sha256::digest(&encoded);
    BigInt::from_bytes_be(Sign::Plus, &digest)
}

/// Derives a `bitlen`-bit deterministic number from `(a, b, index)`.
///
/// Successive SHA-256 chunks over an incrementing counter are shifted into
/// place and summed until enough bits have been produced.
pub fn get_hash_number(a: Option<&BigInt>, b: Option<&BigInt>, index: i64, bitlen: u32) -> BigInt {
    let mut tmp: Vec<BigInt> = Vec::with_capacity(4);
    if let Some(a) = a {
        tmp.push(a.clone());
    }
    if let Some(b) = b {
        tmp.push(b.clone());
    }
    tmp.push(BigInt::from(index));
    let count_idx = tmp.len();
    tmp.push(BigInt::zero());

    let mut k = 0u32;
    let mut res = BigInt::zero();
    while k < bitlen {
        let cur = hash_commit(&tmp);
        res += cur << k;
        k += 256;
        tmp[count_idx] += 1;
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_bytes(v: i64) -> Vec<u8> {
        let mut out = Vec::new();
        der_integer(&mut out, &BigInt::from(v));
        out
    }

    #[test]
    fn der_integers_are_minimal_twos_complement() {
        assert_eq!(int_bytes(0), vec![0x02, 0x01, 0x00]);
        assert_eq!(int_bytes(127), vec![0x02, 0x01, 0x7f]);
        assert_eq!(int_bytes(128), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(int_bytes(256), vec![0x02, 0x02, 0x01, 0x00]);
        assert_eq!(int_bytes(-1), vec![0x02, 0x01, 0xff]);
        assert_eq!(int_bytes(-128), vec![0x02, 0x01, 0x80]);
        assert_eq!(int_bytes(-129), vec![0x02, 0x02, 0xff, 0x7f]);
    }

    #[test]
    fn der_sequence_layout() {
        let one = BigInt::one();
        let two = BigInt::from(2);
        let encoded = der_commit_sequence(&[&one, &two]);
        assert_eq!(
            encoded,
            vec![0x30, 0x09, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]
        );
    }

    #[test]
    fn long_form_lengths() {
        let big = BigInt::one() << 1024;
        let encoded = der_commit_sequence(&[&big]);
        assert_eq!(encoded[0], 0x30);
        assert_eq!(encoded[1], 0x81); // one length byte follows
    }

    #[test]
    fn challenge_changes_with_list() {
        let a = BigInt::from(5);
        let b = BigInt::from(7);
        let base = hash_commit(&[a.clone(), b.clone()]);
        assert_ne!(base, hash_commit(&[b.clone(), a.clone()]), "order");
        assert_ne!(base, hash_commit(&[a.clone()]), "count");
        assert_ne!(base, hash_commit(&[a, BigInt::from(8)]), "value");
    }

    #[test]
    fn challenge_is_deterministic() {
        let list = vec![BigInt::from(12345), BigInt::from(-1), BigInt::from(0)];
        assert_eq!(hash_commit(&list), hash_commit(&list.clone()));
    }

    #[test]
    fn hash_number_has_requested_width() {
        let a = BigInt::from(1234);
        let narrow = get_hash_number(Some(&a), None, 0, 4);
        let wide = get_hash_number(Some(&a), None, 0, 300);
        assert!(narrow.bits() <= 256);
        assert!(wide.bits() > 256);
        assert_eq!(narrow, get_hash_number(Some(&a), None, 0, 4));
        assert_ne!(narrow, get_hash_number(Some(&a), None, 1, 4));
    }
}
