use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;

use crate::graph::CallGraph;
use crate::graph::node::GraphNode;

/// Sanitize a string for use as a DOT node ID or subgraph name.
///
/// Replaces non-alphanumeric characters with `_`. Prepends `n` if the result
/// starts with a digit (DOT IDs must not start with a digit).
pub fn sanitize_dot_id(s: &str) -> String {
    let mut result: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'n');
    }
    if result.is_empty() {
        result = "node".to_string();
    }
    result
}

/// Escape a label for a double-quoted DOT string.
fn escape_dot_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Get the DOT node attributes for a node kind.
fn node_style(node: &GraphNode) -> &'static str {
    match node {
        GraphNode::Function(_) => "shape=box fillcolor=\"#AED6F1\"",
        GraphNode::Unresolved { .. } => "shape=box style=\"filled,dashed\" fillcolor=\"#EAECEE\"",
    }
}

/// Render the selected nodes and edges as DOT.
///
/// Node ids are the sanitized function name plus the petgraph index, so two
/// names that sanitize alike (e.g. `a.b` and `a_b`) cannot collide.
pub fn render_dot(graph: &CallGraph, nodes: &[NodeIndex], edges: &[(NodeIndex, NodeIndex)]) -> String {
    let id = |idx: NodeIndex| format!("{}_{}", sanitize_dot_id(graph.graph[idx].name()), idx.index());

    let mut out = String::new();
    writeln!(out, "digraph call_graph {{").unwrap();
    writeln!(out, "    rankdir=TB;").unwrap();
    writeln!(out, "    node [style=filled fontname=monospace];").unwrap();

    for &idx in nodes {
        let node = &graph.graph[idx];
        writeln!(
            out,
            "    {} [label=\"{}\" {}];",
            id(idx),
            escape_dot_label(node.name()),
            node_style(node)
        )
        .unwrap();
    }

    for &(src, tgt) in edges {
        let style = match graph.graph[tgt] {
            GraphNode::Function(_) => "color=blue",
            GraphNode::Unresolved { .. } => "color=gray style=dashed",
        };
        writeln!(out, "    {} -> {} [{}];", id(src), id(tgt), style).unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}
