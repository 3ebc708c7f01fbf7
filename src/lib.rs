//! Static call-graph extraction for Python source.
//!
//! [`extract`] turns one source unit into a [`Dataset`]: the defined function
//! names, the exact source snippet of each, and the `(caller, callee)` pairs
//! found in their bodies. The dataset can then be reshaped for a graph view
//! ([`present`]), checked ([`validate_graph`]), exported as DOT or Mermaid
//! ([`export_graph`]) or summarised ([`graph_stats`]).

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod graph;
pub mod index;
pub mod output;
pub mod parser;
pub mod present;
pub mod stats;
pub mod telemetry;
pub mod walker;

pub use error::{ExtractError, SyntaxError};
pub use export::export_graph;
pub use extract::{CallEdge, CallGraphBuilder, Dataset, DuplicatePolicy, ExtractOptions, extract};
pub use graph::CallGraph;
pub use index::index_project;
pub use present::{PresentationGraph, present, validate_graph};
pub use stats::graph_stats;
pub use walker::walk_project;
