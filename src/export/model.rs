use regex::Regex;

/// Output format for graph export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum ExportFormat {
    /// Graphviz DOT format (default). Suitable for large graphs and tooling.
    Dot,
    /// Mermaid flowchart format. Best for small-to-medium graphs in markdown.
    Mermaid,
}

/// Parameters controlling a graph export operation.
pub struct ExportParams {
    /// Output format: DOT or Mermaid.
    pub format: ExportFormat,
    /// Export only functions matching this pattern and their N-hop neighborhood.
    pub focus: Option<Regex>,
    /// Hop depth for the focus neighborhood BFS (default: 1).
    pub depth: usize,
    /// Include nodes for callees that are never defined (builtins, imports).
    pub include_unresolved: bool,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: ExportFormat::Dot,
            focus: None,
            depth: 1,
            include_unresolved: false,
        }
    }
}

/// Result of a graph export operation.
pub struct ExportResult {
    /// The rendered graph content (DOT or Mermaid text).
    pub content: String,
    /// Number of nodes in the exported graph.
    pub node_count: usize,
    /// Number of edges in the exported graph.
    pub edge_count: usize,
    /// Advisory warnings (e.g. scale guard messages). Already logged by export_graph.
    pub warnings: Vec<String>,
}
