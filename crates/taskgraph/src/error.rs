//! Error types for the task-graph runtime.
//!
//! The engine distinguishes two error classes (see the design notes on
//! the cycle controller and worker pool): fatal setup errors, which can
//! only occur while an [`Engine`](crate::engine::Engine) is being built,
//! and logic invariant violations, which indicate a malformed graph or a
//! bug in the engine itself and are reported via `panic!`/`debug_assert!`
//! rather than this error type, since there is no recoverable runtime
//! error path once a cycle is underway.

use thiserror::Error;

/// Failure to bring an [`Engine`](crate::engine::Engine) up.
///
/// These can only happen during construction: allocating the worker
/// pool, spawning its threads, or waiting on the startup barrier. Once
/// `Engine::build` returns `Ok`, the engine cannot produce this error
/// again for the lifetime of that instance.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The OS refused to create a worker thread.
    #[error("failed to spawn worker {worker_id}: {source}")]
    ThreadSpawn {
        /// Index of the worker that failed to start.
        worker_id: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A worker panicked before reaching the startup barrier, or the
    /// barrier was abandoned by a thread that exited early.
    #[error("worker {worker_id} did not report ready before startup completed")]
    ReadinessBarrierAbandoned {
        /// Index of the worker that never arrived.
        worker_id: usize,
    },

    /// Pool size or loop count configuration was out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable explanation.
        reason: &'static str,
    },
}

/// Result alias for fallible engine construction.
pub type SetupResult<T> = Result<T, SetupError>;
