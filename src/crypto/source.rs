//! Candidate sources: the seam between the search engine and the keypair primitive.

use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;

use super::Keypair;

/// Errors raised by a keypair primitive.
#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    #[error("failed to seed random number generator: {0}")]
    Entropy(String),

    #[error("key source exhausted")]
    Exhausted,

    #[error("key source failure: {0}")]
    Other(String),
}

/// A freshly generated keypair, already rendered to its textual address.
///
/// Candidates that do not match are dropped by the worker right after the test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub address: String,
    pub secret_key: Vec<u8>,
}

/// Produces one candidate per call. Owned by a single worker thread.
pub trait KeySource: Send {
    fn next_candidate(&mut self) -> Result<Candidate, KeySourceError>;
}

/// Builds one [`KeySource`] per worker when a session starts.
///
/// `worker_id` is advisory: sources may use it to differentiate their streams,
/// but correctness never depends on it.
pub trait KeySourceFactory: Send + Sync + 'static {
    type Source: KeySource + 'static;

    fn create(&self, worker_id: usize) -> Result<Self::Source, KeySourceError>;
}

/// Production factory: random Ed25519 keypairs, base58 addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Keys;

impl KeySourceFactory for Ed25519Keys {
    type Source = Ed25519Source;

    fn create(&self, _worker_id: usize) -> Result<Ed25519Source, KeySourceError> {
        Ed25519Source::from_os_entropy()
    }
}

/// A worker-local CSPRNG producing Ed25519 candidates.
pub struct Ed25519Source {
    rng: StdRng,
}

impl Ed25519Source {
    /// Seeds a fresh generator from the operating system.
    pub fn from_os_entropy() -> Result<Self, KeySourceError> {
        let rng = StdRng::from_rng(OsRng).map_err(|e| KeySourceError::Entropy(e.to_string()))?;
        Ok(Self { rng })
    }

    /// Deterministic source, for tests and reproducible benchmarks only.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl KeySource for Ed25519Source {
    #[inline]
    fn next_candidate(&mut self) -> Result<Candidate, KeySourceError> {
        let keypair = Keypair::generate(&mut self.rng);
        Ok(Candidate {
            address: keypair.address(),
            secret_key: keypair.secret_bytes().to_vec(),
        })
    }
}
