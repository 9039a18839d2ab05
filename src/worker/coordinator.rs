//! Search sessions: worker fan-out, progress aggregation and teardown.
//!
//! Every session owns N worker threads and one dispatcher thread. Workers
//! push [`WorkerEvent`]s into an unbounded channel; the dispatcher is the
//! only consumer, so the running total is only ever written by one thread.
//!
//! Two locks, never held by a caller-facing getter for longer than a read:
//! - `state` guards the lifecycle; a terminal transition happens exactly once.
//! - `listener` is the delivery lock. Every callback runs under it, and `stop`
//!   detaches the listener under it, so no callback can start after `stop`
//!   returns. Listeners may freely read a [`SessionHandle`] from a callback.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};

use crate::crypto::{Candidate, KeySourceFactory};
use crate::matcher::SearchPattern;

use super::cpu::{SearchWorker, DEFAULT_BATCH_SIZE};
use super::event::{MatchResult, SearchListener, WorkerEvent};

/// Errors surfaced by the search engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("worker setup failed: {0}")]
    WorkerSetup(String),

    #[error("all workers failed")]
    AllWorkersFailed,
}

/// Lifecycle of a session. Every state but `Running` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        self != SessionState::Running
    }
}

type Listener = Option<Box<dyn SearchListener>>;

struct Shared {
    id: u64,
    pattern: SearchPattern,
    num_workers: usize,
    start_time: Instant,
    stop_flag: Arc<AtomicBool>,
    state: Mutex<SessionState>,
    total_attempts: AtomicU64,
    result: OnceLock<MatchResult>,
    listener: Mutex<Listener>,
}

/// A panicking listener must not wedge teardown, so poisoned locks are reused.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    /// Moves a running session to `next`. Returns false if it had already ended.
    fn finish(&self, next: SessionState) -> bool {
        let mut state = lock(&self.state);
        if *state != SessionState::Running {
            return false;
        }
        *state = next;
        true
    }

    /// Records the winning match. Returns `None` if the session had already ended.
    ///
    /// Total, result and state change under the state lock, so a reader never
    /// sees `Completed` without a result.
    fn complete(&self, worker_id: usize, attempts: u64, candidate: Candidate) -> Option<MatchResult> {
        let mut state = lock(&self.state);
        if *state != SessionState::Running {
            return None;
        }
        let total = self.total_attempts.fetch_add(attempts, Ordering::AcqRel) + attempts;
        let result = MatchResult {
            public_key: candidate.address,
            secret_key: candidate.secret_key,
            total_attempts: total,
            worker_id,
        };
        let _ = self.result.set(result.clone());
        *state = SessionState::Completed;
        Some(result)
    }

    fn fail(&self, error: SearchError) {
        if !self.finish(SessionState::Failed) {
            return;
        }
        warn!("session {} failed: {}", self.id, error);
        if let Some(mut listener) = lock(&self.listener).take() {
            listener.on_error(error);
        }
    }
}

/// Caller-side view of a session. Cheap to clone; stays readable after teardown.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Aggregate candidates evaluated so far. Never decreases.
    pub fn total_attempts(&self) -> u64 {
        self.shared.total_attempts.load(Ordering::Acquire)
    }

    /// The winning match. Set exactly when the state is `Completed`, including
    /// when `stop` detached the listener before `on_complete` could run.
    pub fn result(&self) -> Option<&MatchResult> {
        self.shared.result.get()
    }

    pub fn pattern(&self) -> &SearchPattern {
        &self.shared.pattern
    }

    pub fn num_workers(&self) -> usize {
        self.shared.num_workers
    }

    /// Returns the elapsed time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.shared.start_time.elapsed()
    }

    /// Returns the current generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Worker threads of one session. Dropping the set stops and joins them.
struct WorkerSet {
    stop_flag: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerSet {
    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerSet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Session {
    shared: Arc<Shared>,
    dispatcher: Option<JoinHandle<()>>,
}

impl Session {
    fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: self.shared.clone(),
        }
    }

    fn shutdown(mut self) {
        if self.shared.finish(SessionState::Cancelled) {
            info!(
                "session {} cancelled after {} attempts",
                self.shared.id,
                self.shared.total_attempts.load(Ordering::Acquire)
            );
        }
        // Waits for an in-flight callback to return.
        lock(&self.shared.listener).take();

        self.shared.stop_flag.store(true, Ordering::Relaxed);
        if let Some(dispatcher) = self.dispatcher.take() {
            if dispatcher.join().is_err() {
                warn!("session {} dispatcher panicked", self.shared.id);
            }
        }
        debug!("session {} torn down", self.shared.id);
    }
}

/// Runs vanity searches on a pool of worker threads, one session at a time.
pub struct SearchCoordinator<F: KeySourceFactory> {
    factory: F,
    batch_size: u64,
    next_id: u64,
    session: Option<Session>,
}

impl<F: KeySourceFactory> SearchCoordinator<F> {
    /// Creates an idle coordinator drawing key sources from `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            batch_size: DEFAULT_BATCH_SIZE,
            next_id: 0,
            session: None,
        }
    }

    /// Sets how many candidates a worker evaluates between progress reports.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Starts a new session, tearing down the previous one first.
    ///
    /// Invalid input is rejected synchronously with no session created. A
    /// worker setup failure is reported through `listener.on_error` and
    /// yields a handle already in [`SessionState::Failed`].
    pub fn start<L: SearchListener>(
        &mut self,
        pattern: SearchPattern,
        num_workers: usize,
        listener: L,
    ) -> Result<SessionHandle, SearchError> {
        if pattern.is_empty() {
            return Err(SearchError::InputInvalid(
                "a prefix or a suffix is required".into(),
            ));
        }
        if num_workers == 0 {
            return Err(SearchError::InputInvalid(
                "at least one worker is required".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SearchError::InputInvalid(
                "batch size must be positive".into(),
            ));
        }

        self.stop_current();

        self.next_id += 1;
        let shared = Arc::new(Shared {
            id: self.next_id,
            pattern,
            num_workers,
            start_time: Instant::now(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(SessionState::Running),
            total_attempts: AtomicU64::new(0),
            result: OnceLock::new(),
            listener: Mutex::new(Some(Box::new(listener))),
        });

        info!(
            "session {} starting: {} worker(s), pattern {}",
            shared.id, num_workers, shared.pattern
        );

        let (event_tx, event_rx) = unbounded();
        let dispatcher = self
            .spawn_workers(&shared, event_tx)
            .and_then(|workers| Self::spawn_dispatcher(&shared, event_rx, workers));

        let dispatcher = match dispatcher {
            Ok(handle) => Some(handle),
            Err(e) => {
                shared.fail(e);
                None
            }
        };

        let session = Session { shared, dispatcher };
        let handle = session.handle();
        self.session = Some(session);
        Ok(handle)
    }

    /// Spawns one thread per worker, each with its own key source.
    ///
    /// On failure every already-started worker is stopped and joined.
    fn spawn_workers(
        &self,
        shared: &Arc<Shared>,
        event_tx: Sender<WorkerEvent>,
    ) -> Result<WorkerSet, SearchError> {
        let mut workers = WorkerSet {
            stop_flag: shared.stop_flag.clone(),
            handles: Vec::with_capacity(shared.num_workers),
        };

        for id in 0..shared.num_workers {
            let source = self
                .factory
                .create(id)
                .map_err(|e| SearchError::WorkerSetup(format!("worker {}: {}", id, e)))?;

            let worker = SearchWorker::new(
                id,
                shared.pattern.clone(),
                source,
                self.batch_size,
                event_tx.clone(),
                shared.stop_flag.clone(),
            );

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run())
                .map_err(|e| SearchError::WorkerSetup(format!("worker {}: {}", id, e)))?;
            workers.handles.push(handle);
        }

        Ok(workers)
    }

    fn spawn_dispatcher(
        shared: &Arc<Shared>,
        event_rx: Receiver<WorkerEvent>,
        workers: WorkerSet,
    ) -> Result<JoinHandle<()>, SearchError> {
        let shared = shared.clone();
        // On spawn failure the closure, and with it the worker set, is dropped and joined.
        thread::Builder::new()
            .name(format!("vanity-dispatch-{}", shared.id))
            .spawn(move || dispatch(shared, event_rx, workers))
            .map_err(|e| SearchError::WorkerSetup(format!("dispatcher: {}", e)))
    }

    /// Stops the session behind `handle`. No-op for stale or finished sessions.
    ///
    /// When this returns, every worker thread of the session has exited and
    /// the listener has been dropped.
    pub fn stop(&mut self, handle: &SessionHandle) {
        if self.session.as_ref().map(|s| s.shared.id) == Some(handle.id()) {
            self.stop_current();
        }
    }

    /// Stops whatever session is live, if any.
    pub fn stop_current(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }

    /// Handle of the current session, if one has not been stopped yet.
    pub fn current(&self) -> Option<SessionHandle> {
        self.session.as_ref().map(Session::handle)
    }

    /// State of the current session; `None` when idle.
    pub fn state(&self) -> Option<SessionState> {
        self.session.as_ref().map(|s| s.shared.state())
    }
}

impl<F: KeySourceFactory> Drop for SearchCoordinator<F> {
    fn drop(&mut self) {
        self.stop_current();
    }
}

/// Dispatcher loop: aggregates worker events and forwards them to the listener.
///
/// Ends once every worker has exited and dropped its sender.
fn dispatch(shared: Arc<Shared>, events: Receiver<WorkerEvent>, mut workers: WorkerSet) {
    let mut live = workers.handles.len();

    for event in events.iter() {
        match event {
            WorkerEvent::Progress { attempts, .. } => {
                let mut listener = lock(&shared.listener);
                if shared.state() != SessionState::Running {
                    continue;
                }
                let total = shared.total_attempts.fetch_add(attempts, Ordering::AcqRel) + attempts;
                if let Some(listener) = listener.as_mut() {
                    listener.on_progress(total);
                }
            }
            WorkerEvent::Complete {
                worker_id,
                attempts,
                candidate,
            } => {
                let Some(result) = shared.complete(worker_id, attempts, candidate) else {
                    debug!(
                        "session {} discarding late match from worker {}",
                        shared.id, worker_id
                    );
                    continue;
                };

                workers.shutdown();
                info!(
                    "session {} matched {} after {} attempts",
                    shared.id, result.public_key, result.total_attempts
                );

                match lock(&shared.listener).take() {
                    Some(mut listener) => listener.on_complete(result),
                    None => debug!(
                        "session {} stopped before its match was delivered",
                        shared.id
                    ),
                }
                break;
            }
            WorkerEvent::Fault { worker_id, reason } => {
                live -= 1;
                warn!(
                    "session {} lost worker {} ({}); {} remaining",
                    shared.id, worker_id, reason, live
                );
                if live == 0 {
                    workers.shutdown();
                    shared.fail(SearchError::AllWorkersFailed);
                    break;
                }
            }
        }
    }

    workers.shutdown();

    // Every sender is gone without a terminal event: workers died without reporting.
    shared.fail(SearchError::AllWorkersFailed);
}
