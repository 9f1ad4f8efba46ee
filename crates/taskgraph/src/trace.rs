//! Execution Trace (C6): a per-cycle append-only log of task
//! start/end markers.
//!
//! A single `Mutex`-guarded `String`, appended to twice per task (once
//! on invocation, once on completion) and cleared by the cycle
//! controller at each restart. This is the buffer that the testable
//! properties P1/P2/P4 (§8 of the design) check against.

use std::sync::Mutex;

use crate::node::Label;

pub(crate) struct ExecutionTrace {
    buf: Mutex<String>,
}

impl ExecutionTrace {
    /// `capacity` should be at least `2 * graph.len()` so a full cycle
    /// never reallocates the buffer.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Mutex::new(String::with_capacity(capacity)),
        }
    }

    /// Appends one marker for `label`. Called once before a task runs
    /// and once after it returns.
    pub(crate) fn append(&self, label: Label) {
        self.buf.lock().unwrap().push(label.0);
    }

    /// Clears the buffer. Called by the cycle controller, never by a
    /// worker mid-cycle.
    pub(crate) fn clear(&self) {
        self.buf.lock().unwrap().clear();
    }

    /// A snapshot of the trace as it stands right now.
    pub(crate) fn snapshot(&self) -> String {
        self.buf.lock().unwrap().clone()
    }
}
