//! # sol_vanity
//!
//! Multi-threaded Solana vanity address generator.
//!
//! ## Architecture
//!
//! - `crypto`: Ed25519 key generation, base58 addresses, the `KeySource` seam
//! - `matcher`: Prefix/suffix matching with a case policy
//! - `worker`: Search workers and the session coordinator
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod worker;

pub use config::Config;
pub use crypto::{Candidate, Ed25519Keys, KeySource, KeySourceError, KeySourceFactory, Keypair};
pub use matcher::{is_match, SearchPattern};
pub use worker::{
    MatchResult, SearchCoordinator, SearchError, SearchEvent, SearchListener, SessionHandle,
    SessionState,
};
