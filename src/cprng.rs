//! Deterministic, thread-safe cryptographically secure pseudo-random
//! number generator.
//!
//! AES-256 in counter mode: the 32-byte seed is the key and an atomic
//! 64-bit counter selects blocks. Block `k` is the encryption of the
//! little-endian counter padded with zeros, so byte `16k + j` of the stream
//! depends only on the seed — never on how callers slice their reads.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use num_bigint::{BigInt, RandBigInt};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};
use zeroize::Zeroize;

const BLOCK_SIZE: usize = 16;

pub struct Cprng {
    cipher: Aes256,
    counter: AtomicU64,
}

impl Cprng {
    /// Builds a generator from a 256-bit seed. Key schedule failures
    /// propagate; reads never fail afterwards.
    pub fn new(seed: &[u8; 32]) -> Result<Self, aes::cipher::InvalidLength> {
        let cipher = Aes256::new_from_slice(seed)?;
        Ok(Cprng {
            cipher,
            counter: AtomicU64::new(0),
        })
    }

    /// Fills `buf` with the next bytes of the stream. Safe under arbitrary
    /// parallel callers: the needed blocks are reserved atomically up front.
    pub fn read(&self, buf: &mut [u8]) {
        if buf.is_empty() {
            return;
        }
        let n_blocks = ((buf.len() - 1) / BLOCK_SIZE + 1) as u64;
        let mut iv = self.counter.fetch_add(n_blocks, Ordering::Relaxed);

        let mut chunks = buf.chunks_mut(BLOCK_SIZE);
        for chunk in &mut chunks {
            let mut block = aes::Block::from([0u8; BLOCK_SIZE]);
            block[..8].copy_from_slice(&iv.to_le_bytes());
            iv += 1;
            self.cipher.encrypt_block(&mut block);
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
    }
}

/// Adapter so `num_bigint::RandBigInt` sampling can draw from a shared
/// generator.
impl RngCore for &Cprng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.read(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.read(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.read(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.read(dest);
        Ok(())
    }
}

static GLOBAL: Lazy<Cprng> = Lazy::new(|| {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let cprng = Cprng::new(&seed).expect("failed to initialize process CSPRNG");
    seed.zeroize();
    cprng
});

/// The process-global generator, seeded once from OS entropy.
pub fn global() -> &'static Cprng {
    &GLOBAL
}

/// Uniform random integer in `[0, limit)`, drawn from the global generator.
pub fn random_big_int(limit: &BigInt) -> BigInt {
    let mut rng = global();
    BigInt::from(rng.gen_biguint_below(limit.magnitude()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_STREAM: &str = "f29000b62a499fd0a9f39a6add2e7780c7b519846a11411cd6ac07cb03f801a84ef4b88bebd54953c37ffaf66efaca7b80c3017e8f89ab315ede32b11e48ab50d5786900334bbaad31a868ca3c29221b99ebccc0117949cd663c44c06a1c58b05daad7132f80983dae88ecf9ce714a1b600411a4cb4d0da02e107f8d0bcfdab864009471a3394f76374e38bfdc9fe26c62ac2e4b9ec5049108dccdb6488f325cf3297d5a71a5d1734dd46661023ea39f7402facdf1802b42d88a715615324bd502bddc6de19403882a27cdf934adffc9483c475aeb20edf61bfa6a18777a7ada695ebda390508948b1fc69971a26a169c0de48d769b197cd5cf9bb5f798f49d0";

    fn seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        seed
    }

    #[test]
    fn stream_matches_reference_vector() {
        let mut buf = [0u8; 256];
        for i in 0..256 {
            let rng = Cprng::new(&seed()).unwrap();
            rng.read(&mut buf[..i]);
            assert_eq!(hex::encode(&buf[..i]), SEED_STREAM[..2 * i], "prefix {i}");
        }
    }

    #[test]
    fn stream_is_independent_of_chunking() {
        let mut buf = [0u8; 256];

        let rng = Cprng::new(&seed()).unwrap();
        for i in 0..16 {
            rng.read(&mut buf[i * 16..(i + 1) * 16]);
        }
        assert_eq!(hex::encode(buf), SEED_STREAM);

        let rng = Cprng::new(&seed()).unwrap();
        for i in 0..8 {
            rng.read(&mut buf[i * 32..(i + 1) * 32]);
        }
        assert_eq!(hex::encode(buf), SEED_STREAM);

        // Short reads: each read starts a fresh block.
        for j in 1..16 {
            let rng = Cprng::new(&seed()).unwrap();
            for i in 0..8 {
                rng.read(&mut buf[..j]);
                assert_eq!(hex::encode(&buf[..j]), SEED_STREAM[32 * i..32 * i + 2 * j]);
            }
        }
        for j in 17..31 {
            let rng = Cprng::new(&seed()).unwrap();
            for i in 0..8 {
                rng.read(&mut buf[..j]);
                assert_eq!(hex::encode(&buf[..j]), SEED_STREAM[128 * i..128 * i + 2 * j]);
            }
        }
    }

    #[test]
    fn sampling_stays_below_limit() {
        let limit = BigInt::from(1000);
        for _ in 0..200 {
            let v = random_big_int(&limit);
            assert!(v >= BigInt::from(0) && v < limit);
        }
    }
}
