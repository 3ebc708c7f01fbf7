use petgraph::Direction;
use serde::Serialize;

use crate::extract::Dataset;
use crate::graph::CallGraph;

/// Aggregated statistics for one extracted dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub functions: usize,
    pub call_edges: usize,
    /// Distinct callee names that are never defined.
    pub unresolved_callees: usize,
    /// Edges whose callee is never defined.
    pub dangling_edges: usize,
    /// Functions no other defined function calls (self-calls do not count).
    pub roots: Vec<String>,
    /// Functions that make no calls at all.
    pub leaves: Vec<String>,
    /// Mutually recursive groups and self-recursive functions.
    pub recursive_groups: Vec<Vec<String>>,
}

/// Compute statistics from a dataset.
pub fn graph_stats(dataset: &Dataset) -> GraphStats {
    let graph = CallGraph::from_dataset(dataset);

    let mut roots = Vec::new();
    let mut leaves = Vec::new();
    for name in &dataset.functions {
        let Some(idx) = graph.node(name) else {
            continue;
        };
        let called = graph
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .any(|caller| caller != idx);
        if !called {
            roots.push(name.clone());
        }
        if graph
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .is_none()
        {
            leaves.push(name.clone());
        }
    }

    let recursive_groups = graph
        .recursive_groups()
        .into_iter()
        .map(|group| group.into_iter().map(str::to_owned).collect())
        .collect();

    GraphStats {
        functions: dataset.functions.len(),
        call_edges: dataset.calls.len(),
        unresolved_callees: graph.unresolved_count(),
        dangling_edges: dataset.dangling_edges().count(),
        roots,
        leaves,
        recursive_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    const SRC: &str = r#"
def main():
    helper()
    print("a")
    print("b")

def helper():
    log()
    even(3)

def even(n):
    return n == 0 or odd(n - 1)

def odd(n):
    return n != 0 and even(n - 1)

def fact(n):
    return 1 if n == 0 else n * fact(n - 1)

def idle():
    pass
"#;

    #[test]
    fn test_counts() {
        let stats = graph_stats(&extract(SRC));
        assert_eq!(stats.functions, 6);
        // main: helper, print; helper: log, even; even: odd; odd: even; fact: fact
        assert_eq!(stats.call_edges, 7);
        assert_eq!(stats.unresolved_callees, 2);
        assert_eq!(stats.dangling_edges, 2);
    }

    #[test]
    fn test_roots_and_leaves() {
        let stats = graph_stats(&extract(SRC));
        assert_eq!(stats.roots, vec!["main", "fact", "idle"]);
        assert_eq!(stats.leaves, vec!["idle"]);
    }

    #[test]
    fn test_recursive_groups() {
        let stats = graph_stats(&extract(SRC));
        assert_eq!(
            stats.recursive_groups,
            vec![
                vec!["even".to_string(), "odd".to_string()],
                vec!["fact".to_string()]
            ]
        );
    }

    #[test]
    fn test_empty_dataset() {
        let stats = graph_stats(&Dataset::default());
        assert_eq!(stats.functions, 0);
        assert_eq!(stats.call_edges, 0);
        assert!(stats.roots.is_empty());
        assert!(stats.recursive_groups.is_empty());
    }
}
