//! Parallel search execution.
//!
//! This module provides:
//! - `SearchWorker`: one sequential generate-and-test loop per thread
//! - `SearchCoordinator`: session lifecycle, progress aggregation, teardown
//! - The event types exchanged between them and the caller

mod coordinator;
mod cpu;
mod event;

pub use coordinator::{SearchCoordinator, SearchError, SessionHandle, SessionState};
pub use cpu::{SearchWorker, DEFAULT_BATCH_SIZE};
pub use event::{MatchResult, SearchEvent, SearchListener, WorkerEvent};
