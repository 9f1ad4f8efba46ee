//! A parallel task-graph runtime: a fixed DAG of tasks executed
//! repeatedly across a pool of worker threads, preserving the
//! precedence order encoded by the graph.
//!
//! This crate is the concurrent dispatch engine only: the ready queue,
//! per-node dependency accounting, the worker state machine, and the
//! cycle-boundary protocol that re-arms the whole graph for the next
//! iteration. Task bodies, graph-construction syntax beyond the plain
//! builder in [`graph`], and any CLI/benchmark wrapper are external
//! collaborators (see `DESIGN.md`).
//!
//! # Example
//!
//! ```
//! use taskgraph::{Engine, EngineConfig, GraphBuilder};
//!
//! let mut builder = GraphBuilder::new();
//! let a = builder.new_node('A', || {});
//! let z = builder.new_node('Z', || {});
//! builder.link(a, z);
//! let graph = builder.build().unwrap();
//!
//! let engine = Engine::start(graph, EngineConfig::new().pool_size(2).loop_count(3)).unwrap();
//! let report = engine.join();
//! assert_eq!(report.loops_done, 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

mod barrier;
pub mod config;
mod cycle;
pub mod engine;
pub mod error;
pub mod graph;
pub mod jitter;
pub mod node;
mod queue;
mod shared;
mod trace;
mod worker;

pub use config::EngineConfig;
pub use engine::{Engine, RunReport};
pub use error::{SetupError, SetupResult};
pub use graph::{Graph, GraphBuilder};
pub use node::{Label, NodeId};
