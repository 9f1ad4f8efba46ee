//! The state every worker thread and the cycle controller hold a
//! reference to, per the redesign note in the design notes: one
//! `Engine` value whose lifetime encloses the run, instead of the
//! reference implementation's process-wide globals.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::EngineConfig;
use crate::graph::Graph;
use crate::queue::ReadyQueue;
use crate::trace::ExecutionTrace;

pub(crate) struct CycleCounters {
    /// Immutable once the engine starts.
    pub(crate) loops_target: usize,
    /// Monotonic; incremented when a worker dequeues the source node
    /// (see the open question on where this increment belongs, resolved
    /// in DESIGN.md). An atomic, not a bare `usize`, purely so other
    /// threads (tests, instrumentation) can read it safely -- only one
    /// worker ever writes it per cycle.
    pub(crate) loops_done: AtomicUsize,
}

impl CycleCounters {
    pub(crate) fn new(loops_target: usize) -> Self {
        Self {
            loops_target,
            loops_done: AtomicUsize::new(0),
        }
    }

    pub(crate) fn record_cycle_start(&self) -> usize {
        self.loops_done.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub(crate) struct Shared {
    pub(crate) graph: Graph,
    pub(crate) queue: ReadyQueue,
    pub(crate) trace: ExecutionTrace,
    pub(crate) cycle: CycleCounters,
    pub(crate) config: EngineConfig,
}

impl Shared {
    pub(crate) fn new(graph: Graph, config: EngineConfig) -> Self {
        let trace_capacity = 2 * graph.len();
        let loops_target = config.get_loop_count();
        Self {
            queue: ReadyQueue::new(),
            trace: ExecutionTrace::with_capacity(trace_capacity),
            cycle: CycleCounters::new(loops_target),
            graph,
            config,
        }
    }
}
