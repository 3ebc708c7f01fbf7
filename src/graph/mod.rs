pub mod edge;
pub mod node;

use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::Directed;
use petgraph::algo::kosaraju_scc;
use petgraph::stable_graph::{NodeIndex, StableGraph};

use crate::extract::Dataset;

use edge::EdgeKind;
use node::{FunctionInfo, GraphNode};

/// The in-memory call graph: a directed petgraph StableGraph with O(1) name lookup.
pub struct CallGraph {
    /// The underlying directed graph, parameterised over node and edge kinds.
    pub graph: StableGraph<GraphNode, EdgeKind, Directed>,
    /// Maps names to node indices, in insertion order (functions first, then
    /// unresolved callees in the order they were first called).
    pub name_index: IndexMap<String, NodeIndex>,
}

impl CallGraph {
    /// Create an empty call graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            name_index: IndexMap::new(),
        }
    }

    /// Build the graph for a dataset: one node per function, one per distinct
    /// dangling callee, one `Calls` edge per dataset edge.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut graph = Self::new();
        for name in &dataset.functions {
            let code = dataset.code.get(name).cloned().unwrap_or_default();
            graph.add_function(name.clone(), code);
        }
        for edge in &dataset.calls {
            graph.add_call(&edge.caller, &edge.callee);
        }
        graph
    }

    /// Add a function node. If the name is already present, returns the existing index.
    pub fn add_function(&mut self, name: String, code: String) -> NodeIndex {
        if let Some(&existing) = self.name_index.get(&name) {
            return existing;
        }
        let idx = self.graph.add_node(GraphNode::Function(FunctionInfo {
            name: name.clone(),
            code,
        }));
        self.name_index.insert(name, idx);
        idx
    }

    /// Add a `Calls` edge, creating an `Unresolved` node for an unknown callee
    /// (and for an unknown caller, which a well-formed dataset never has).
    pub fn add_call(&mut self, caller: &str, callee: &str) {
        let from = self.node_or_unresolved(caller);
        let to = self.node_or_unresolved(callee);
        self.graph.add_edge(from, to, EdgeKind::Calls);
    }

    fn node_or_unresolved(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode::Unresolved {
            name: name.to_owned(),
        });
        self.name_index.insert(name.to_owned(), idx);
        idx
    }

    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.name_index.get(name).copied()
    }

    /// Position of a name in `name_index`; used for deterministic ordering.
    pub fn order_of(&self, idx: NodeIndex) -> usize {
        self.name_index
            .get_index_of(self.graph[idx].name())
            .unwrap_or(usize::MAX)
    }

    fn neighbors_sorted(&self, name: &str, dir: Direction) -> Vec<&str> {
        let Some(idx) = self.node(name) else {
            return Vec::new();
        };
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        out.sort_by_key(|&n| self.order_of(n));
        out.dedup();
        out.into_iter().map(|n| self.graph[n].name()).collect()
    }

    /// Functions that call `name`.
    pub fn callers(&self, name: &str) -> Vec<&str> {
        self.neighbors_sorted(name, Direction::Incoming)
    }

    /// Names called by `name`.
    pub fn callees(&self, name: &str) -> Vec<&str> {
        self.neighbors_sorted(name, Direction::Outgoing)
    }

    /// Number of defined functions (excludes unresolved nodes).
    pub fn function_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&i| self.graph[i].is_function())
            .count()
    }

    /// Number of unresolved callee nodes.
    pub fn unresolved_count(&self) -> usize {
        self.graph.node_count() - self.function_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Groups of mutually recursive functions, plus directly self-recursive ones.
    ///
    /// Uses Kosaraju's SCC algorithm. Members are ordered by first appearance,
    /// and groups by their first member.
    pub fn recursive_groups(&self) -> Vec<Vec<&str>> {
        let mut groups: Vec<Vec<NodeIndex>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort_by_key(|&n| self.order_of(n));
                scc
            })
            .collect();
        groups.sort_by_key(|scc| self.order_of(scc[0]));
        groups
            .into_iter()
            .map(|scc| scc.into_iter().map(|n| self.graph[n].name()).collect())
            .collect()
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new()
    }
}
