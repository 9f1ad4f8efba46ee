//! Worker Pool (C4): the state machine each worker thread runs.
//!
//! States: Idle (blocked on the ready queue) -> Running (executing the
//! task body) -> Publishing (propagating completion to children) ->
//! back to Idle, or Exiting once the queue reports shutdown. All
//! workers are symmetric and interchangeable; there is no work
//! stealing, only the one shared [`crate::queue::ReadyQueue`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::cycle::{self, CycleOutcome};
use crate::shared::Shared;

/// One iteration of the worker state machine, from Idle through
/// Publishing (or Exiting). Returns `false` when the worker should
/// stop looping.
fn step(worker_id: usize, shared: &Shared) -> bool {
    // Idle: block on the ready queue until a node is ready or the
    // engine has shut down.
    let Some(node_id) = shared.queue.pop_front_blocking() else {
        return false;
    };

    // Running.
    let label = shared.graph.label(node_id);
    if shared.config.get_log_runner_task() {
        tracing::debug!(worker = worker_id, node = %label, "dispatching task");
    }

    // The source task increments the loop counter the instant it is
    // dequeued: exactly one task is running at that point in any
    // cycle, so this needs no lock of its own (see DESIGN.md for the
    // reasoning behind placing the increment here rather than inside
    // user task bodies).
    if node_id == shared.graph.source() {
        let started = shared.cycle.record_cycle_start();
        if shared.config.get_log_loops() {
            tracing::info!(loop_number = started, "cycle started");
        }
    }

    shared.trace.append(label);
    let task = shared.graph.task(node_id);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task()));
    shared.trace.append(label);

    if let Err(panic) = outcome {
        tracing::error!(worker = worker_id, node = %label, "task panicked, shutting down engine");
        shared.queue.shutdown();
        panic::resume_unwind(panic);
    }

    // Reset before publishing: see the design notes on reset-then-
    // publish ordering. By the time any child of this node can start,
    // this node must already be ready to accept next-cycle arrivals.
    shared.graph.reset(node_id);

    if node_id == shared.graph.sink() {
        match cycle::on_sink_complete(shared) {
            CycleOutcome::Continue | CycleOutcome::Stop => {}
        }
        return true;
    }

    // Publishing: the sink has no children, so this loop is empty for
    // it anyway, but the sink branch above returns early regardless to
    // keep the state machine's steps explicit.
    for &child in shared.graph.children(node_id) {
        if shared.graph.arrive(child) {
            shared.queue.push_back(child);
        }
    }

    true
}

/// Runs one worker's whole lifetime: report ready, then loop `step`
/// until it returns `false`.
pub(crate) fn run(worker_id: usize, shared: Arc<Shared>, ready: Arc<crate::barrier::StartupBarrier>) {
    if shared.config.get_log_runner_lifecycle() {
        tracing::info!(worker = worker_id, "worker starting");
    }

    ready.mark_ready();

    loop {
        if !step(worker_id, &shared) {
            break;
        }
    }

    if shared.config.get_log_runner_lifecycle() {
        tracing::info!(worker = worker_id, "worker exiting");
    }
}
