//! Ready Queue (C3): a bounded-wait FIFO of nodes whose predecessors
//! have all completed for the current cycle.
//!
//! Mirrors the `JobQueue` used by the platform's own
//! `ThreadPool` scenario: a `Mutex`-guarded `VecDeque` plus a `Condvar`,
//! with an `active` flag folded into the same guarded state so a single
//! lock acquisition can answer "is there work, or should I stop
//! waiting".

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::node::NodeId;

struct QueueState {
    items: VecDeque<NodeId>,
    active: bool,
}

/// FIFO of ready nodes, shared by every worker and the cycle
/// controller.
///
/// FIFO order is not a correctness requirement -- any node popped has
/// already satisfied I2 -- but it gives the engine fairness and a
/// reproducible interleaving up to the OS thread scheduler.
pub(crate) struct ReadyQueue {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

impl ReadyQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                active: true,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Appends `node` and wakes one waiter. A push racing with a
    /// worker that is about to sleep is harmless: the worker re-checks
    /// the predicate under the same lock before waiting.
    pub(crate) fn push_back(&self, node: NodeId) {
        let mut state = self.state.lock().unwrap();
        state.items.push_back(node);
        drop(state);
        self.condvar.notify_one();
    }

    /// Blocks until a node is ready or the queue has been shut down.
    ///
    /// Returns `None` once shutdown has been observed and the queue is
    /// drained -- the caller should treat that as "go to Exiting".
    pub(crate) fn pop_front_blocking(&self) -> Option<NodeId> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(node) = state.items.pop_front() {
                return Some(node);
            }
            if !state.active {
                return None;
            }
            state = self.condvar.wait(state).unwrap();
        }
    }

    /// Flips `active` off and wakes every waiter (a broadcast, not a
    /// single signal, since every idle worker must notice and exit).
    pub(crate) fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        state.active = false;
        drop(state);
        self.condvar.notify_all();
    }
}
