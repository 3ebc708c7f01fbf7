use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::kosaraju_scc;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::graph::CallGraph;

/// Geometry of the layered layout. Deserialised from the `[layout]` table of
/// `code-flow.toml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub node_width: f64,
    pub node_height: f64,
    /// Horizontal gap between neighbours in a rank.
    pub node_sep: f64,
    /// Vertical gap between ranks.
    pub rank_sep: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: 172.0,
            node_height: 36.0,
            node_sep: 50.0,
            rank_sep: 50.0,
        }
    }
}

/// Centre point of a laid-out node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Rank of every node: the longest call path reaching it from a node without
/// callers.
///
/// Mutually recursive functions share a rank; ranks are computed over the SCC
/// condensation, so cycles cannot make this loop.
pub fn ranks(graph: &CallGraph) -> HashMap<NodeIndex, usize> {
    // kosaraju_scc yields components in reverse topological order.
    let sccs = kosaraju_scc(&graph.graph);

    let mut component: HashMap<NodeIndex, usize> = HashMap::new();
    for (i, scc) in sccs.iter().enumerate() {
        for &n in scc {
            component.insert(n, i);
        }
    }

    let mut scc_rank = vec![0usize; sccs.len()];
    for (i, scc) in sccs.iter().enumerate().rev() {
        let mut rank = 0;
        for &n in scc {
            for pred in graph.graph.neighbors_directed(n, Direction::Incoming) {
                let pc = component[&pred];
                if pc != i {
                    rank = rank.max(scc_rank[pc] + 1);
                }
            }
        }
        scc_rank[i] = rank;
    }

    component
        .into_iter()
        .map(|(n, c)| (n, scc_rank[c]))
        .collect()
}

/// Assign a top-to-bottom position to every node.
///
/// Nodes in the same rank are placed left to right in first-appearance order
/// and centred against the widest rank. All coordinates are non-negative.
pub fn layout(graph: &CallGraph, options: &LayoutOptions) -> HashMap<NodeIndex, Position> {
    let ranks = ranks(graph);

    let mut rows: Vec<Vec<NodeIndex>> = Vec::new();
    for &idx in graph.name_index.values() {
        let Some(&rank) = ranks.get(&idx) else {
            continue;
        };
        if rows.len() <= rank {
            rows.resize_with(rank + 1, Vec::new);
        }
        rows[rank].push(idx);
    }

    let step_x = options.node_width + options.node_sep;
    let step_y = options.node_height + options.rank_sep;
    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);

    let mut positions = HashMap::new();
    for (rank, row) in rows.iter().enumerate() {
        let offset = (widest - row.len()) as f64 * step_x / 2.0;
        for (i, &idx) in row.iter().enumerate() {
            positions.insert(
                idx,
                Position {
                    x: offset + i as f64 * step_x + options.node_width / 2.0,
                    y: rank as f64 * step_y + options.node_height / 2.0,
                },
            );
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    fn rank_of(graph: &CallGraph, ranks: &HashMap<NodeIndex, usize>, name: &str) -> usize {
        ranks[&graph.node(name).expect("node exists")]
    }

    #[test]
    fn test_chain_ranks() {
        let src = "def a():\n    b()\n\ndef b():\n    c()\n\ndef c():\n    pass\n";
        let graph = CallGraph::from_dataset(&extract(src));
        let r = ranks(&graph);
        assert_eq!(rank_of(&graph, &r, "a"), 0);
        assert_eq!(rank_of(&graph, &r, "b"), 1);
        assert_eq!(rank_of(&graph, &r, "c"), 2);
    }

    #[test]
    fn test_longest_path_wins() {
        // a -> c directly and a -> b -> c: c sits below b.
        let src = "def a():\n    b()\n    c()\n\ndef b():\n    c()\n\ndef c():\n    pass\n";
        let graph = CallGraph::from_dataset(&extract(src));
        let r = ranks(&graph);
        assert_eq!(rank_of(&graph, &r, "c"), 2);
    }

    #[test]
    fn test_cycle_terminates_and_shares_rank() {
        let src = "def main():\n    ping()\n\ndef ping():\n    pong()\n\ndef pong():\n    ping()\n";
        let graph = CallGraph::from_dataset(&extract(src));
        let r = ranks(&graph);
        assert_eq!(rank_of(&graph, &r, "main"), 0);
        assert_eq!(rank_of(&graph, &r, "ping"), 1);
        assert_eq!(rank_of(&graph, &r, "pong"), 1);
    }

    #[test]
    fn test_positions_are_distinct_and_non_negative() {
        let src = "def main():\n    a()\n    b()\n\ndef a():\n    pass\n\ndef b():\n    pass\n";
        let graph = CallGraph::from_dataset(&extract(src));
        let opts = LayoutOptions::default();
        let pos = layout(&graph, &opts);
        assert_eq!(pos.len(), 3);

        let main = pos[&graph.node("main").unwrap()];
        let a = pos[&graph.node("a").unwrap()];
        let b = pos[&graph.node("b").unwrap()];
        assert!(main.y < a.y, "callee ranks sit below callers");
        assert_eq!(a.y, b.y);
        assert!(a.x < b.x, "first appearance is leftmost");
        for p in pos.values() {
            assert!(p.x >= 0.0 && p.y >= 0.0);
        }
        assert_eq!(main.y, opts.node_height / 2.0);
    }
}
