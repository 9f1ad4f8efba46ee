//! Cycle Controller (C5): detects cycle completion at the sink, and
//! either re-seeds the source for another pass or shuts the engine
//! down.
//!
//! Per the design notes' cycle-accounting split, `loops_done` is
//! bumped the moment a worker dequeues the *source* (one task running,
//! no contention possible), while the *stop-or-continue* decision is
//! made here, when a worker finishes the *sink*. This keeps the counter
//! race-free without adding a dedicated mutex for it.

use crate::shared::Shared;

/// What the worker that just ran the sink should do next.
pub(crate) enum CycleOutcome {
    /// Another cycle begins: the trace was cleared and the source was
    /// re-enqueued.
    Continue,
    /// `loops_target` cycles have completed: the queue was shut down
    /// and every worker will drain and exit.
    Stop,
}

/// Runs the cycle-boundary protocol. Called by the one worker that just
/// finished executing the sink node, after that worker has already
/// reset the sink's own `satisfied` counter (so I6 holds for every node
/// except the source, which is re-armed implicitly by never having
/// accumulated anything this cycle).
pub(crate) fn on_sink_complete(shared: &Shared) -> CycleOutcome {
    let done = shared
        .cycle
        .loops_done
        .load(std::sync::atomic::Ordering::SeqCst);

    if shared.config.get_log_exec_trace() {
        println!("{}", shared.trace.snapshot());
    }

    if done >= shared.cycle.loops_target {
        if shared.config.get_log_loops() {
            tracing::info!(loops = done, "final cycle complete, stopping runners");
        }
        println!("{done} loops, stop runners");
        shared.queue.shutdown();
        CycleOutcome::Stop
    } else {
        if shared.config.get_log_loops() {
            tracing::info!(loops = done, target = shared.cycle.loops_target, "cycle complete");
        }
        shared.trace.clear();
        shared.queue.push_back(shared.graph.source());
        CycleOutcome::Continue
    }
}
