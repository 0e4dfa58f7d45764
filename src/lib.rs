//! Zero-knowledge proofs that an issuer modulus is the product of two safe
//! primes.
//!
//! The crate builds one large non-interactive proof of knowledge out of
//! reusable sigma-protocol building blocks over a prime-order group with two
//! generators: representation statements, range proofs, committed modular
//! arithmetic, a bit-decomposition exponentiation proof and a primality
//! proof, tied together with a classical quasi-safe-prime-product test and a
//! single Fiat-Shamir challenge.

pub mod addition;
pub mod bigint_serde;
pub mod cprng;
pub mod error;
pub mod exp;
pub mod expstep;
pub mod exptable;
pub mod fastmod;
pub mod follower;
pub mod group;
pub mod hashing;
pub mod issquare;
pub mod keys;
pub mod lookup;
pub mod math;
pub mod multiplication;
pub mod pedersen;
pub mod primeproof;
pub mod qspp;
pub mod rangeproof;
pub mod representation;
pub mod safeprime;

/// Security parameters. These are part of the proof format: provers and
/// verifiers must agree on every one of them.
pub mod params {
    /// Iterations of the binary-challenge range proof (soundness 2^-80).
    pub const RANGE_PROOF_ITERS: usize = 80;

    /// Statistical-hiding slack, in bits, for range-proof randomizers.
    pub const RANGE_PROOF_EPSILON: u32 = 256;

    /// Iterations of the square-free test (error rate 1/minimum_factor).
    pub const SQUARE_FREE_ITERS: usize = 8;

    /// Iterations of the prime-power-product test (error rate 1/2).
    pub const PRIME_POWER_PRODUCT_ITERS: usize = 80;

    /// Iterations of the disjoint-prime-product test.
    pub const DISJOINT_PRIME_PRODUCT_ITERS: usize = 8;

    /// Iterations of the almost-safe-prime-product test.
    pub const ALMOST_SAFE_PRIME_PRODUCT_ITERS: usize = 250;

    /// Bits in the almost-safe-prime-product commitment nonce.
    pub const ALMOST_SAFE_PRIME_PRODUCT_NONCE_BITS: u32 = 256;

    /// The verifier rejects any modulus sharing a factor below this bound.
    pub const MINIMUM_FACTOR: u64 = 1024;
}

pub use error::ProofError;
pub use safeprime::{SafePrimeProof, SafePrimeProofStructure};
