//! CLI for building and verifying safe-prime key proofs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyproof::follower::{self, Follower};
use keyproof::keys::{PrivateKey, PublicKey};
use keyproof::SafePrimeProofStructure;
use parking_lot::Mutex;
use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyproof", about = "Prove an issuer modulus is a product of two safe primes")]
struct Cli {
    /// Write a flame-format cpu profile of the whole run to this file.
    #[arg(long, global = true)]
    cpuprofile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a proof from a key pair.
    Buildproof {
        pk_file: PathBuf,
        sk_file: PathBuf,
        proof_file: PathBuf,
    },
    /// Verify a proof against a public key.
    Verify {
        pk_file: PathBuf,
        proof_file: PathBuf,
    },
}

/// Prints step progress to stderr, one line per phase.
struct StderrFollower {
    status: Mutex<(String, usize)>,
    ticks: AtomicUsize,
}

impl StderrFollower {
    fn new() -> Self {
        StderrFollower {
            status: Mutex::new((String::new(), 0)),
            ticks: AtomicUsize::new(0),
        }
    }
}

impl Follower for StderrFollower {
    fn step_start(&self, desc: &str, intermediates: usize) {
        *self.status.lock() = (desc.to_owned(), intermediates);
        self.ticks.store(0, Ordering::SeqCst);
        eprint!("{desc}...");
        let _ = std::io::stderr().flush();
    }

    fn step_done(&self) {
        let (_, limit) = self.status.lock().clone();
        if limit > 0 {
            eprintln!(" {limit}/{limit} done");
        } else {
            eprintln!(" done");
        }
    }

    fn tick(&self) {
        let count = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        let (desc, limit) = self.status.lock().clone();
        if limit > 0 && count % 16 == 0 {
            eprint!("\r{desc}... {count}/{limit}");
            let _ = std::io::stderr().flush();
        }
    }
}

fn init_tracing(cpuprofile: Option<&PathBuf>) -> Result<Option<tracing_flame::FlushGuard<std::io::BufWriter<File>>>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match cpuprofile {
        Some(path) => {
            let (flame, guard) = tracing_flame::FlameLayer::with_file(path)
                .with_context(|| format!("cannot open profile file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .with(flame)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
            Ok(None)
        }
    }
}

fn build_proof(pk_file: &PathBuf, sk_file: &PathBuf, proof_file: &PathBuf) -> Result<()> {
    let pk = PublicKey::from_file(pk_file)?;
    let sk = PrivateKey::from_file(sk_file)?;

    sk.validate_for(&pk)
        .context("private key rejected before proving")?;

    let structure = SafePrimeProofStructure::new(&pk.n);
    let proof = structure
        .build_proof(&sk.p_prime, &sk.q_prime)
        .context("proof construction failed")?;

    let file = File::create(proof_file)
        .with_context(|| format!("error opening proof file {}", proof_file.display()))?;
    serde_json::to_writer(file, &proof).context("error writing proof")?;

    Ok(())
}

fn verify_proof(pk_file: &PathBuf, proof_file: &PathBuf) -> Result<()> {
    let pk = PublicKey::from_file(pk_file)?;

    let data = std::fs::read_to_string(proof_file)
        .with_context(|| format!("error opening proof {}", proof_file.display()))?;
    let proof = serde_json::from_str(&data).context("error reading in proof data")?;

    let structure = SafePrimeProofStructure::new(&pk.n);
    if structure.verify_proof(&proof) {
        println!("Proof is valid");
    } else {
        println!("Proof is INVALID!");
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _flame_guard = init_tracing(cli.cpuprofile.as_ref())?;

    follower::set_follower(Some(Arc::new(StderrFollower::new())));

    match &cli.command {
        Command::Buildproof {
            pk_file,
            sk_file,
            proof_file,
        } => build_proof(pk_file, sk_file, proof_file),
        Command::Verify {
            pk_file,
            proof_file,
        } => verify_proof(pk_file, proof_file),
    }
}
