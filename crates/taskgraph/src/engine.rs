//! Configuration & Lifecycle (C7): construct, run, join, teardown.
//!
//! `Engine::start` performs the whole start-up sequence from the design
//! notes -- build the shared state, spawn `P` workers, wait at the
//! readiness barrier, then push the source -- and hands back a value
//! whose `join` blocks until `loops_target` cycles have run and every
//! worker thread has exited. There is no global mutable state (see the
//! design notes' "global state" redesign note): everything workers
//! touch hangs off one `Arc<Shared>` owned by this `Engine`.

use std::sync::Arc;
use std::thread;

use crate::barrier::StartupBarrier;
use crate::config::EngineConfig;
use crate::error::{SetupError, SetupResult};
use crate::graph::Graph;
use crate::shared::Shared;
use crate::worker;

/// A running (or finished) task-graph engine: the worker pool plus the
/// shared state it dispatches against.
pub struct Engine {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

/// Summary handed back by [`Engine::join`] once every worker has exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Number of cycles completed. Equals `loop_count` from the
    /// [`EngineConfig`] the engine was started with (P5).
    pub loops_done: usize,
    /// The execution trace as the cycle controller last left it.
    ///
    /// On a normal stop the controller does not clear the trace after
    /// the final cycle (only `Continue` clears it), so this is exactly
    /// the last cycle's start/end markers -- useful for asserting P1/P2
    /// without needing a logging sink. On an early shutdown triggered
    /// by a task panic, this is whatever the in-flight cycle had
    /// accumulated.
    pub final_trace: String,
}

impl Engine {
    /// Builds the shared engine state, spawns the worker pool, waits
    /// for every worker to report ready, then seeds the first cycle by
    /// pushing the graph's source node.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidConfig`] if `pool_size` or
    /// `loop_count` is zero, or [`SetupError::ThreadSpawn`] if the OS
    /// refuses to create a worker thread. Once this returns `Ok`, the
    /// engine cannot fail again for the rest of its lifetime.
    pub fn start(graph: Graph, config: EngineConfig) -> SetupResult<Self> {
        let pool_size = config.get_pool_size();
        if pool_size == 0 {
            return Err(SetupError::InvalidConfig {
                reason: "pool_size must be at least 1",
            });
        }
        if config.get_loop_count() == 0 {
            return Err(SetupError::InvalidConfig {
                reason: "loop_count must be at least 1",
            });
        }

        if config.get_print_graph() {
            println!("{}", graph.describe());
        }

        let shared = Arc::new(Shared::new(graph, config));
        let readiness = Arc::new(StartupBarrier::new(pool_size));

        let mut workers = Vec::with_capacity(pool_size);
        for worker_id in 0..pool_size {
            let shared = Arc::clone(&shared);
            let readiness = Arc::clone(&readiness);
            let handle = thread::Builder::new()
                .name(format!("taskgraph-worker-{worker_id}"))
                .spawn(move || worker::run(worker_id, shared, readiness))
                .map_err(|source| SetupError::ThreadSpawn { worker_id, source })?;
            workers.push(handle);
        }

        // Don't push the source until every worker has reported ready:
        // see the design notes on condition-variable discipline.
        readiness.wait_all_ready();
        shared.queue.push_back(shared.graph.source());

        Ok(Self { shared, workers })
    }

    /// Blocks until the configured number of cycles have completed and
    /// every worker thread has exited (P6), then tears down the engine.
    ///
    /// A task panic shuts the engine down early: the panicking worker's
    /// thread terminates via `resume_unwind` and every other worker
    /// observes the resulting queue shutdown and exits too. Such a
    /// thread's `JoinHandle::join()` returns `Err`, which this method
    /// silently absorbs -- the panic was already logged by the worker
    /// that caught it (see [`crate::worker`]).
    #[must_use]
    pub fn join(self) -> RunReport {
        for handle in self.workers {
            let _ = handle.join();
        }

        RunReport {
            loops_done: self
                .shared
                .cycle
                .loops_done
                .load(std::sync::atomic::Ordering::SeqCst),
            final_trace: self.shared.trace.snapshot(),
        }
    }

    /// The current execution trace, as it stands right now.
    ///
    /// Intended for a caller polling mid-run with `log_exec_trace`
    /// disabled; once [`join`](Self::join) returns, the trace reflects
    /// whatever the last cycle left behind (cleared at the next
    /// restart, untouched after the final one).
    #[must_use]
    pub fn trace_snapshot(&self) -> String {
        self.shared.trace.snapshot()
    }

    /// Current `satisfied` counter for `node`, for instrumentation
    /// (scenario S6's `max(satisfied)` sampling) -- not used by the
    /// dispatch loop itself, which never reads this through `Engine`.
    #[must_use]
    pub fn satisfied(&self, node: crate::node::NodeId) -> usize {
        self.shared.graph.satisfied(node)
    }

    /// Current `loops_done`, readable while the engine is still running.
    #[must_use]
    pub fn loops_done(&self) -> usize {
        self.shared
            .cycle
            .loops_done
            .load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn linear_chain() -> Graph {
        let mut builder = GraphBuilder::new();
        let a = builder.new_node('A', || {});
        let m = builder.new_node('a', || {});
        let z = builder.new_node('Z', || {});
        builder.link(a, m);
        builder.link(m, z);
        builder.build().unwrap()
    }

    fn diamond() -> Graph {
        let mut builder = GraphBuilder::new();
        let a = builder.new_node('A', || {});
        let x = builder.new_node('a', || {});
        let y = builder.new_node('b', || {});
        let j = builder.new_node('z', || {});
        let z = builder.new_node('Z', || {});
        builder.link(a, x);
        builder.link(a, y);
        builder.link(x, j);
        builder.link(y, j);
        builder.link(j, z);
        builder.build().unwrap()
    }

    /// B1: P=1, L=1 runs exactly once and terminates.
    #[test]
    fn single_worker_single_loop_terminates() {
        let engine =
            Engine::start(linear_chain(), EngineConfig::new().pool_size(1).loop_count(1)).unwrap();
        let report = engine.join();
        assert_eq!(report.loops_done, 1);
    }

    /// S1: linear chain `A -> a -> Z`, P=1, L=1 -- deterministic trace
    /// equal to a topological linearisation (R2).
    #[test]
    fn linear_chain_trace_is_deterministic() {
        let mut builder = GraphBuilder::new();
        let trace = Arc::new(std::sync::Mutex::new(String::new()));

        let push = |trace: Arc<std::sync::Mutex<String>>, c: char| {
            move || trace.lock().unwrap().push(c)
        };

        let a = builder.new_node('A', push(Arc::clone(&trace), 'A'));
        let m = builder.new_node('a', push(Arc::clone(&trace), 'a'));
        let z = builder.new_node('Z', push(Arc::clone(&trace), 'Z'));
        builder.link(a, m);
        builder.link(m, z);
        let graph = builder.build().unwrap();

        let engine = Engine::start(graph, EngineConfig::new().pool_size(1).loop_count(1)).unwrap();
        let report = engine.join();
        assert_eq!(report.loops_done, 1);
        // each task body runs exactly once, in topological order
        assert_eq!(*trace.lock().unwrap(), "AaZ");
    }

    /// S2/P2: diamond graph, trace length is exactly 2*|nodes| and the
    /// `z` join only ever observes both its parents having completed.
    #[test]
    fn diamond_join_waits_for_both_parents() {
        let ran_before_join = Arc::new(AtomicUsize::new(0));
        let mut builder = GraphBuilder::new();
        let a = builder.new_node('A', || {});
        let before = Arc::clone(&ran_before_join);
        let x = builder.new_node('a', move || {
            before.fetch_add(1, Ordering::SeqCst);
        });
        let before = Arc::clone(&ran_before_join);
        let y = builder.new_node('b', move || {
            before.fetch_add(1, Ordering::SeqCst);
        });
        let ran_before_join_check = Arc::clone(&ran_before_join);
        let j = builder.new_node('z', move || {
            assert_eq!(ran_before_join_check.load(Ordering::SeqCst), 2);
        });
        let z = builder.new_node('Z', || {});
        builder.link(a, x);
        builder.link(a, y);
        builder.link(x, j);
        builder.link(y, j);
        builder.link(j, z);
        let graph = builder.build().unwrap();

        let engine = Engine::start(graph, EngineConfig::new().pool_size(2).loop_count(1)).unwrap();
        let report = engine.join();
        assert_eq!(report.loops_done, 1);
    }

    /// B3: a graph consisting only of source -> sink works and
    /// terminates.
    #[test]
    fn source_directly_to_sink() {
        let mut builder = GraphBuilder::new();
        let a = builder.new_node('A', || {});
        let z = builder.new_node('Z', || {});
        builder.link(a, z);
        let graph = builder.build().unwrap();

        let engine = Engine::start(graph, EngineConfig::new().pool_size(1).loop_count(5)).unwrap();
        assert_eq!(engine.join().loops_done, 5);
    }

    /// P5: total cycles observed equals `loops_target`, across several
    /// loops and a pool bigger than the diamond's inherent parallelism.
    #[test]
    fn multiple_loops_count_matches_target() {
        let engine = Engine::start(diamond(), EngineConfig::new().pool_size(4).loop_count(25)).unwrap();
        assert_eq!(engine.join().loops_done, 25);
    }

    /// B4: zero-duration tasks (the default, no sleeping) do not
    /// deadlock and still produce a complete run.
    #[test]
    fn zero_duration_tasks_do_not_deadlock() {
        let engine = Engine::start(diamond(), EngineConfig::new().pool_size(8).loop_count(50)).unwrap();
        assert_eq!(engine.join().loops_done, 50);
    }

    #[test]
    fn rejects_zero_pool_size() {
        let err = Engine::start(linear_chain(), EngineConfig::new().pool_size(0)).unwrap_err();
        assert!(matches!(err, SetupError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_zero_loop_count() {
        let err =
            Engine::start(linear_chain(), EngineConfig::new().pool_size(1).loop_count(0)).unwrap_err();
        assert!(matches!(err, SetupError::InvalidConfig { .. }));
    }

    /// A panicking task shuts the whole engine down rather than
    /// leaving other workers blocked forever (§6: "log, mark the
    /// engine inactive, broadcast shutdown").
    #[test]
    fn panicking_task_shuts_down_the_engine() {
        let mut builder = GraphBuilder::new();
        let a = builder.new_node('A', || {});
        let boom = builder.new_node('a', || panic!("boom"));
        let z = builder.new_node('Z', || {});
        builder.link(a, boom);
        builder.link(boom, z);
        let graph = builder.build().unwrap();

        let engine =
            Engine::start(graph, EngineConfig::new().pool_size(3).loop_count(100)).unwrap();
        // join() must return -- every worker observes the shutdown and
        // exits, rather than blocking on the ready queue forever.
        let _ = engine.join();
    }
}
