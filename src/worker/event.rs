//! Events flowing from workers to the coordinator and from the coordinator to the caller.

use crossbeam_channel::Sender;

use crate::crypto::Candidate;

use super::SearchError;

/// Message sent by a worker thread to its session's dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// A full batch of non-matching candidates was evaluated.
    Progress { worker_id: usize, attempts: u64 },
    /// A match. `attempts` counts the current partial batch, matching candidate included.
    Complete {
        worker_id: usize,
        attempts: u64,
        candidate: Candidate,
    },
    /// The key source failed; the worker has exited.
    Fault { worker_id: usize, reason: String },
}

/// Result of a successful vanity search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The base58 address
    pub public_key: String,
    /// The 64-byte secret key (seed followed by public key)
    pub secret_key: Vec<u8>,
    /// Candidates evaluated by all workers, the match included
    pub total_attempts: u64,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl MatchResult {
    /// Returns the secret key as a hex string.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(&self.secret_key)
    }
}

/// Event delivered to the caller of a search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Progress { total_attempts: u64 },
    Complete(MatchResult),
    Error(SearchError),
}

impl SearchEvent {
    /// True for `Complete` and `Error`, after which the session delivers nothing else.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchEvent::Progress { .. })
    }
}

/// Receives the events of one session.
///
/// Called from the session's dispatcher thread, never after
/// [`SearchCoordinator::stop`](super::SearchCoordinator::stop) returns.
pub trait SearchListener: Send + 'static {
    fn on_progress(&mut self, total_attempts: u64);

    fn on_complete(&mut self, result: MatchResult);

    fn on_error(&mut self, error: SearchError);
}

/// Forwards events into a channel, for callers that prefer to poll.
impl SearchListener for Sender<SearchEvent> {
    fn on_progress(&mut self, total_attempts: u64) {
        let _ = self.send(SearchEvent::Progress { total_attempts });
    }

    fn on_complete(&mut self, result: MatchResult) {
        let _ = self.send(SearchEvent::Complete(result));
    }

    fn on_error(&mut self, error: SearchError) {
        let _ = self.send(SearchEvent::Error(error));
    }
}
