//! CPU-based search worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::crypto::{KeySource, KeySourceError};
use crate::matcher::SearchPattern;

use super::event::WorkerEvent;

/// Candidates evaluated between two progress reports.
pub const DEFAULT_BATCH_SIZE: u64 = 100;

/// A single sequential search loop. Runs on its own thread.
pub struct SearchWorker<S> {
    /// Worker ID
    id: usize,
    /// The pattern to match against
    pattern: SearchPattern,
    /// Candidate generator owned by this worker
    source: S,
    /// Candidates per progress report
    batch_size: u64,
    /// Channel to the coordinator
    events: Sender<WorkerEvent>,
    /// Shared session stop flag
    stop_flag: Arc<AtomicBool>,
}

impl<S: KeySource> SearchWorker<S> {
    /// Creates a new worker. `batch_size` must be at least 1.
    pub fn new(
        id: usize,
        pattern: SearchPattern,
        source: S,
        batch_size: u64,
        events: Sender<WorkerEvent>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        debug_assert!(batch_size > 0);
        Self {
            id,
            pattern,
            source,
            batch_size,
            events,
            stop_flag,
        }
    }

    /// Runs the worker loop.
    ///
    /// Draws and tests candidates until:
    /// - A match is found (sends `Complete` and returns)
    /// - The key source fails or panics (sends `Fault` and returns)
    /// - The stop flag is set or the coordinator hung up
    pub fn run(mut self) {
        let mut batch: u64 = 0;

        loop {
            // Checked per candidate: one relaxed load is noise next to a key generation.
            if self.stop_flag.load(Ordering::Relaxed) {
                debug!("worker {} stopped", self.id);
                return;
            }

            let next = panic::catch_unwind(AssertUnwindSafe(|| self.source.next_candidate()))
                .unwrap_or_else(|payload| Err(KeySourceError::Other(panic_message(&*payload))));

            let candidate = match next {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!("worker {} key source failed: {}", self.id, e);
                    let _ = self.events.send(WorkerEvent::Fault {
                        worker_id: self.id,
                        reason: e.to_string(),
                    });
                    return;
                }
            };

            if self.pattern.matches(&candidate.address) {
                debug!("worker {} found {}", self.id, candidate.address);
                let _ = self.events.send(WorkerEvent::Complete {
                    worker_id: self.id,
                    attempts: batch + 1,
                    candidate,
                });
                return;
            }

            batch += 1;
            if batch == self.batch_size {
                let progress = WorkerEvent::Progress {
                    worker_id: self.id,
                    attempts: batch,
                };
                if self.events.send(progress).is_err() {
                    return;
                }
                batch = 0;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("panicked: {}", message)
}
