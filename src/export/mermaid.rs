use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;

use crate::graph::CallGraph;
use crate::graph::node::GraphNode;

/// Escape a string for safe use in Mermaid node labels (quotes inside labels break the syntax).
fn escape_mermaid_label(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

/// Render the selected nodes and edges as a Mermaid flowchart.
///
/// Defined functions are rounded boxes; unresolved callees are stadium-shaped
/// and reached through dotted arrows.
pub fn render_mermaid(
    graph: &CallGraph,
    nodes: &[NodeIndex],
    edges: &[(NodeIndex, NodeIndex)],
) -> String {
    let mut out = String::new();
    writeln!(out, "flowchart TB").unwrap();

    for &idx in nodes {
        let node_id = format!("n{}", idx.index());
        let node = &graph.graph[idx];
        let label = escape_mermaid_label(node.name());
        let node_def = match node {
            GraphNode::Function(_) => format!("{node_id}(\"{label}\")"),
            GraphNode::Unresolved { .. } => format!("{node_id}([\"{label}\"])"),
        };
        writeln!(out, "    {}", node_def).unwrap();
    }

    for &(src, tgt) in edges {
        let arrow = match graph.graph[tgt] {
            GraphNode::Function(_) => "-->",
            GraphNode::Unresolved { .. } => "-.->",
        };
        writeln!(out, "    n{} {} n{}", src.index(), arrow, tgt.index()).unwrap();
    }

    out
}
