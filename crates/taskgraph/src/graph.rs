//! Task Graph (C1) and Dependency Counters (C2).
//!
//! `GraphBuilder` is the construction-time API: `new_node`, `link` and
//! `find` mutate a plain arena with no synchronization, since graph
//! construction happens single-threaded before any worker is spawned.
//! `build()` freezes that arena into a [`Graph`], which is the only
//! thing workers ever see: its topology never changes again, only each
//! node's `satisfied` counter does, under that node's own mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::SetupError;
use crate::node::{Label, NodeData, NodeId, Task};

/// Construction-time graph builder.
///
/// Not `Send`/`Sync` and not meant to be: build the whole graph on one
/// thread, then hand the frozen [`Graph`] to [`crate::Engine::start`].
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<NodeData>,
    by_label: HashMap<Label, NodeId>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_label: HashMap::new(),
        }
    }

    /// Registers a new node with the given label and task body.
    ///
    /// `required` in-degree starts at 0 and is incremented once per
    /// [`link`](Self::link) call that names this node as a child.
    pub fn new_node(
        &mut self,
        label: impl Into<Label>,
        task: impl Fn() + Send + Sync + 'static,
    ) -> NodeId {
        let label = label.into();
        let id = NodeId(self.nodes.len());
        let task: Task = std::sync::Arc::new(task);
        self.nodes.push(NodeData {
            label,
            task,
            required: 0,
            satisfied: Mutex::new(0),
            children: Vec::new(),
            parents: Vec::new(),
        });
        self.by_label.insert(label, id);
        id
    }

    /// Links `parent -> child`, appending to each node's adjacency list
    /// and incrementing `child.required`.
    ///
    /// The graph is assumed acyclic and well-formed; this is not
    /// validated here (see the design notes on error handling).
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parents.push(parent);
        self.nodes[child.index()].required += 1;
    }

    /// Convenience lookup used only during construction (e.g. wiring up
    /// edges from a textual graph description). Not used in the hot
    /// path.
    #[must_use]
    pub fn find(&self, label: impl Into<Label>) -> Option<NodeId> {
        self.by_label.get(&label.into()).copied()
    }

    /// Freezes the builder into an immutable [`Graph`], locating the
    /// unique source (no parents) and sink (no children).
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidConfig`] if the graph is empty, or
    /// does not have exactly one source and one sink node.
    pub fn build(self) -> Result<Graph, SetupError> {
        if self.nodes.is_empty() {
            return Err(SetupError::InvalidConfig {
                reason: "graph has no nodes",
            });
        }

        let mut sources = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parents.is_empty())
            .map(|(i, _)| NodeId(i));
        let mut sinks = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.children.is_empty())
            .map(|(i, _)| NodeId(i));

        let source = sources.next().ok_or(SetupError::InvalidConfig {
            reason: "graph has no source node (every node has a parent)",
        })?;
        if sources.next().is_some() {
            return Err(SetupError::InvalidConfig {
                reason: "graph has more than one source node",
            });
        }

        let sink = sinks.next().ok_or(SetupError::InvalidConfig {
            reason: "graph has no sink node (every node has a child)",
        })?;
        if sinks.next().is_some() {
            return Err(SetupError::InvalidConfig {
                reason: "graph has more than one sink node",
            });
        }

        Ok(Graph {
            nodes: self.nodes,
            source,
            sink,
        })
    }
}

/// The frozen, shared task graph. Topology is immutable after
/// [`GraphBuilder::build`]; only each node's `satisfied` counter
/// mutates, under that node's own mutex.
pub struct Graph {
    nodes: Vec<NodeData>,
    source: NodeId,
    sink: NodeId,
}

impl Graph {
    /// The unique node with no parents.
    #[must_use]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The unique node with no children.
    #[must_use]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes. Always `false` for a graph that
    /// passed [`GraphBuilder::build`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub(crate) fn label(&self, id: NodeId) -> Label {
        self.nodes[id.index()].label
    }

    pub(crate) fn task(&self, id: NodeId) -> &Task {
        &self.nodes[id.index()].task
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Required in-degree, fixed since construction.
    #[must_use]
    pub fn required(&self, id: NodeId) -> usize {
        self.nodes[id.index()].required
    }

    /// Current `satisfied` count for a node. Exposed for tests and
    /// instrumentation (e.g. scenario S6's `max(satisfied)` sampling);
    /// not used by the dispatch loop itself.
    #[must_use]
    pub fn satisfied(&self, id: NodeId) -> usize {
        *self.nodes[id.index()].satisfied.lock().unwrap()
    }

    /// Arrive: records that one more parent of `child` has completed.
    ///
    /// Returns `true` exactly once per cycle, the moment `satisfied`
    /// reaches `required` -- the caller that receives `true` is the
    /// sole owner of the responsibility to enqueue `child`. The
    /// increment-and-compare happens under `child`'s lock so this holds
    /// even if several parents arrive concurrently (I2, I3).
    pub(crate) fn arrive(&self, child: NodeId) -> bool {
        let data = &self.nodes[child.index()];
        let mut satisfied = data.satisfied.lock().unwrap();
        *satisfied += 1;
        debug_assert!(
            *satisfied <= data.required,
            "node {:?} satisfied ({}) exceeded required ({}): double-linked or cyclic graph",
            data.label,
            *satisfied,
            data.required
        );
        *satisfied == data.required
    }

    /// Reset: zeroes `node`'s `satisfied` counter.
    ///
    /// Must be called by the worker that just executed `node`, before
    /// that worker visits `node`'s children (see the worker state
    /// machine's step ordering) -- this is what makes the node ready to
    /// accept next-cycle arrivals the instant the graph restarts.
    pub(crate) fn reset(&self, node: NodeId) {
        let mut satisfied = self.nodes[node.index()].satisfied.lock().unwrap();
        *satisfied = 0;
    }

    /// Renders the topology as `label -> label, label -> label, ...`,
    /// one edge per entry, for the `print_graph` configuration toggle.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            for &child in &node.children {
                if !out.is_empty() {
                    out.push_str(", ");
                }
                out.push_str(&format!("{} -> {}", node.label, self.nodes[child.index()].label));
            }
        }
        out
    }
}
