pub mod dot;
pub mod mermaid;
pub mod model;

use std::collections::{HashSet, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::graph::CallGraph;

use model::{ExportFormat, ExportParams, ExportResult};

/// Export the call graph to DOT or Mermaid format.
///
/// Steps:
/// 1. Build the set of visible nodes (unresolved filter, then focus BFS).
/// 2. Collect the edges whose endpoints are both visible.
/// 3. Check scale guards and emit warnings if thresholds are exceeded.
/// 4. Dispatch to the appropriate renderer.
pub fn export_graph(graph: &CallGraph, params: &ExportParams) -> ExportResult {
    let visible = build_visible_nodes(graph, params);

    // name_index order keeps the output stable across runs.
    let nodes: Vec<NodeIndex> = graph
        .name_index
        .values()
        .copied()
        .filter(|idx| visible.contains(idx))
        .collect();

    let edges: Vec<(NodeIndex, NodeIndex)> = graph
        .graph
        .edge_references()
        .map(|e| (e.source(), e.target()))
        .filter(|(s, t)| visible.contains(s) && visible.contains(t))
        .collect();

    let mut warnings: Vec<String> = Vec::new();

    if params.format == ExportFormat::Mermaid && edges.len() > 500 {
        let msg = format!(
            "Large graph: {} edges may render poorly in Mermaid. \
             Consider --focus or --format dot.",
            edges.len()
        );
        tracing::warn!("{msg}");
        warnings.push(msg);
    }

    if nodes.len() > 200 {
        let msg = format!(
            "Large call graph: {} nodes. Consider --focus with a small --depth \
             for better readability.",
            nodes.len()
        );
        tracing::warn!("{msg}");
        warnings.push(msg);
    }

    let content = match params.format {
        ExportFormat::Dot => dot::render_dot(graph, &nodes, &edges),
        ExportFormat::Mermaid => mermaid::render_mermaid(graph, &nodes, &edges),
    };

    ExportResult {
        content,
        node_count: nodes.len(),
        edge_count: edges.len(),
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Determine which nodes are visible given the current filter params.
///
/// 1. Drop unresolved nodes unless `include_unresolved`.
/// 2. With `focus`, keep the matching functions plus everything within
///    `depth` hops of them, following edges in both directions.
fn build_visible_nodes(graph: &CallGraph, params: &ExportParams) -> HashSet<NodeIndex> {
    let candidates: HashSet<NodeIndex> = graph
        .graph
        .node_indices()
        .filter(|&idx| params.include_unresolved || graph.graph[idx].is_function())
        .collect();

    let Some(ref focus) = params.focus else {
        return candidates;
    };

    let seeds: Vec<NodeIndex> = candidates
        .iter()
        .copied()
        .filter(|&idx| graph.graph[idx].is_function() && focus.is_match(graph.graph[idx].name()))
        .collect();

    let mut visible: HashSet<NodeIndex> = seeds.iter().copied().collect();
    let mut queue: VecDeque<(NodeIndex, usize)> = seeds.into_iter().map(|s| (s, 0)).collect();

    while let Some((idx, hops)) = queue.pop_front() {
        if hops >= params.depth {
            continue;
        }
        for next in graph.graph.neighbors_undirected(idx) {
            if candidates.contains(&next) && visible.insert(next) {
                queue.push_back((next, hops + 1));
            }
        }
    }

    visible
}
