//! Renderer-facing shape of a dataset.
//!
//! A [`PresentationGraph`] is what the browser graph view consumes: positioned
//! nodes carrying the function's code, and identified edges. [`validate_graph`]
//! checks that any such graph (built here or received from elsewhere) has no
//! edge pointing at a missing node.

pub mod layout;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::Dataset;
use crate::graph::CallGraph;
use crate::graph::node::GraphNode;
use crate::telemetry::{Event, EventSink};

use layout::{LayoutOptions, Position, layout};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresentationNode {
    pub id: String,
    pub data: NodeData,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresentationEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationGraph {
    pub nodes: Vec<PresentationNode>,
    pub edges: Vec<PresentationEdge>,
}

/// What to do with edges whose callee is not a defined function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DanglingPolicy {
    /// Leave the edge out.
    #[default]
    Drop,
    /// Keep the edge and add a node with empty code for the callee.
    Placeholder,
}

/// Deserialised from the `[present]` table of `code-flow.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentOptions {
    pub dangling: DanglingPolicy,
    pub layout: LayoutOptions,
}

/// Reshape a dataset into a positioned presentation graph.
///
/// Node ids and labels are function names. Edge ids are `e1, e2, …` in
/// dataset order, counting only the edges that are kept.
pub fn present(dataset: &Dataset, options: &PresentOptions) -> PresentationGraph {
    let mut graph = CallGraph::new();
    for name in &dataset.functions {
        let code = dataset.code.get(name).cloned().unwrap_or_default();
        graph.add_function(name.clone(), code);
    }

    let mut kept = Vec::new();
    for edge in &dataset.calls {
        let resolved = dataset.contains_function(&edge.callee);
        if resolved || options.dangling == DanglingPolicy::Placeholder {
            graph.add_call(&edge.caller, &edge.callee);
            kept.push(edge);
        }
    }

    let positions = layout(&graph, &options.layout);

    let nodes = graph
        .name_index
        .iter()
        .map(|(name, &idx)| {
            let code = match &graph.graph[idx] {
                GraphNode::Function(info) => info.code.clone(),
                GraphNode::Unresolved { .. } => String::new(),
            };
            PresentationNode {
                id: name.clone(),
                data: NodeData {
                    label: name.clone(),
                    code,
                },
                position: positions
                    .get(&idx)
                    .copied()
                    .unwrap_or(Position { x: 0.0, y: 0.0 }),
            }
        })
        .collect();

    let edges = kept
        .into_iter()
        .enumerate()
        .map(|(i, edge)| PresentationEdge {
            id: format!("e{}", i + 1),
            source: edge.caller.clone(),
            target: edge.callee.clone(),
        })
        .collect();

    PresentationGraph { nodes, edges }
}

impl PresentationGraph {
    /// Typed counterpart of [`validate_graph`].
    pub fn validate(&self, sink: &impl EventSink) -> bool {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let endpoints = self
            .edges
            .iter()
            .map(|e| Ok::<_, String>((e.id.as_str(), e.source.as_str(), e.target.as_str())));
        report(check_references(&ids, endpoints), sink)
    }
}

/// Check that every edge of a presentation graph references an existing node id.
///
/// Accepts any JSON value. Returns `false` (and records
/// [`Event::ValidationFailed`] with the reason) when `nodes` or `edges` is
/// missing or not an array, a node lacks a string `id`, an edge lacks a string
/// `source`/`target`, or an endpoint names no node. Never panics.
pub fn validate_graph(graph: &Value, sink: &impl EventSink) -> bool {
    report(check_value(graph), sink)
}

fn report(result: Result<(), String>, sink: &impl EventSink) -> bool {
    match result {
        Ok(()) => true,
        Err(reason) => {
            sink.record(&Event::ValidationFailed { reason });
            false
        }
    }
}

fn check_value(graph: &Value) -> Result<(), String> {
    let nodes = graph
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or("`nodes` is missing or not an array")?;
    let edges = graph
        .get("edges")
        .and_then(Value::as_array)
        .ok_or("`edges` is missing or not an array")?;

    let mut ids: HashSet<&str> = HashSet::new();
    for (i, node) in nodes.iter().enumerate() {
        let id = node
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("node #{i} has no string `id`"))?;
        ids.insert(id);
    }

    let endpoints = edges.iter().enumerate().map(|(i, edge)| {
        let field = |key: &str| {
            edge.get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| format!("edge #{i} has no string `{key}`"))
        };
        let id = edge.get("id").and_then(Value::as_str).unwrap_or("");
        Ok::<_, String>((id, field("source")?, field("target")?))
    });

    check_references(&ids, endpoints)
}

fn check_references<'a>(
    ids: &HashSet<&str>,
    edges: impl Iterator<Item = Result<(&'a str, &'a str, &'a str), String>>,
) -> Result<(), String> {
    for (i, edge) in edges.enumerate() {
        let (id, source, target) = edge?;
        let label = if id.is_empty() {
            format!("#{i}")
        } else {
            format!("`{id}`")
        };
        if !ids.contains(source) {
            return Err(format!("edge {label} source `{source}` is not a node id"));
        }
        if !ids.contains(target) {
            return Err(format!("edge {label} target `{target}` is not a node id"));
        }
    }
    Ok(())
}
