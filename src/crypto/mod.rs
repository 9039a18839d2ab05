//! Cryptographic primitives for Solana key and address generation.
//!
//! This module provides:
//! - Ed25519 keypair generation
//! - Base58 address rendering
//! - The `KeySource` seam workers draw candidates from

mod keypair;
mod source;

pub use keypair::Keypair;
pub use source::{Candidate, Ed25519Keys, Ed25519Source, KeySource, KeySourceError, KeySourceFactory};
