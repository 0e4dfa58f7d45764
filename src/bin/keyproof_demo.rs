//! Demo binary: builds and verifies a safe-prime proof for a small test
//! modulus, printing progress along the way. Useful for eyeballing the
//! whole pipeline without preparing key files.

use anyhow::Result;
use keyproof::follower::{self, Follower};
use keyproof::SafePrimeProofStructure;
use num_bigint::BigInt;
use std::sync::Arc;
use std::time::Instant;

struct PrintFollower;

impl Follower for PrintFollower {
    fn step_start(&self, desc: &str, intermediates: usize) {
        if intermediates > 0 {
            eprintln!("{desc} ({intermediates} range proofs)...");
        } else {
            eprintln!("{desc}...");
        }
    }

    fn step_done(&self) {
        eprintln!("  done");
    }

    fn tick(&self) {}
}

fn main() -> Result<()> {
    // 26903 = 2*13451 + 1 and 27803 = 2*13901 + 1 are both safe primes.
    let p_prime = BigInt::from(13451);
    let q_prime = BigInt::from(13901);
    let n = BigInt::from(26903) * BigInt::from(27803);

    println!("=== Safe-prime product proof demo ===");
    println!("N = {n}");

    follower::set_follower(Some(Arc::new(PrintFollower)));

    let structure = SafePrimeProofStructure::new(&n);

    let start = Instant::now();
    let proof = structure.build_proof(&p_prime, &q_prime)?;
    println!("proof built in {:.1?}", start.elapsed());

    let json = serde_json::to_vec(&proof)?;
    println!("serialized proof: {} bytes", json.len());

    let proof = serde_json::from_slice(&json)?;
    let start = Instant::now();
    let ok = structure.verify_proof(&proof);
    println!("verified in {:.1?}", start.elapsed());

    println!("{}", if ok { "Proof is valid" } else { "Proof is INVALID!" });
    Ok(())
}
