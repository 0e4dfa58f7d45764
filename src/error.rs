use thiserror::Error;

/// Errors surfaced by provers and key validation.
///
/// Verification never produces an error: a verifier answers `false` on any
/// malformed or untrue proof. The variants here cover prover-side failures
/// and the arithmetic preconditions that would otherwise be programmer
/// errors.
#[derive(Error, Debug)]
pub enum ProofError {
    #[error("private key not amenable to proving")]
    KeyNotAmenable,

    #[error("public and private key do not match")]
    KeyMismatch,

    #[error("failed to generate a safe prime for the proof group")]
    GroupGeneration,

    #[error("moduli passed to crt are not coprime")]
    NonCoprimeModuli,

    #[error("none of the challenge tweaks has a square root")]
    NoSquareRoot,

    #[error("modulus is not invertible mod phi, proof premise does not hold")]
    NotSquareFree,

    #[error("sampled witness fell outside the multiplicative group")]
    WitnessOutsideGroup,

    #[error("hash-derived challenge shares a factor with the modulus")]
    ChallengeOutsideGroup,
}
