//! The startup readiness barrier from the design notes on
//! condition-variable discipline: every worker must report ready
//! before the initial `push_back(source)` happens, or the push's
//! notification can be missed entirely.
//!
//! Shaped like the platform's own reusable `Barrier` scenario
//! (count + generation under one mutex, one condvar) but asymmetric:
//! only workers call [`mark_ready`](StartupBarrier::mark_ready), and
//! only the constructing thread calls
//! [`wait_all_ready`](StartupBarrier::wait_all_ready) -- there is no
//! "leader" thread here, and the barrier is single-use, so it carries
//! no generation counter.

use std::sync::{Condvar, Mutex};

pub(crate) struct StartupBarrier {
    arrived: Mutex<usize>,
    condvar: Condvar,
    expected: usize,
}

impl StartupBarrier {
    pub(crate) fn new(expected: usize) -> Self {
        Self {
            arrived: Mutex::new(0),
            condvar: Condvar::new(),
            expected,
        }
    }

    /// Called by a worker once it has started its dispatch loop and is
    /// about to wait on the ready queue, so a push racing the barrier
    /// can't be missed: an early push just sits in the queue until the
    /// worker's next predicate check.
    pub(crate) fn mark_ready(&self) {
        let mut arrived = self.arrived.lock().unwrap();
        *arrived += 1;
        if *arrived >= self.expected {
            drop(arrived);
            self.condvar.notify_all();
        }
    }

    /// Called by the thread building the engine; blocks until every
    /// worker has called `mark_ready`.
    pub(crate) fn wait_all_ready(&self) {
        let mut arrived = self.arrived.lock().unwrap();
        while *arrived < self.expected {
            arrived = self.condvar.wait(arrived).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn waits_for_every_worker() {
        let barrier = Arc::new(StartupBarrier::new(3));
        let observed = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let observed = Arc::clone(&observed);
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10));
                    observed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    barrier.mark_ready();
                })
            })
            .collect();

        barrier.wait_all_ready();
        assert_eq!(observed.load(std::sync::atomic::Ordering::SeqCst), 3);

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
