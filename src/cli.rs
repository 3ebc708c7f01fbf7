use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::export::model::ExportFormat;
use crate::extract::DuplicatePolicy;

/// A static call-graph extractor for Python source.
///
/// code-flow finds every function definition in a file, records which names
/// each one calls, and renders the result as a dataset, a positioned graph
/// for a browser view, or DOT/Mermaid text.
#[derive(Parser, Debug)]
#[command(
    name = "code-flow",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for dataset and stats results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact one-line-per-result format (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract functions, call edges and snippets from a Python file.
    ///
    /// Input that does not parse yields an empty dataset and a logged error.
    Extract {
        /// Python source file, or `-` for stdin.
        file: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,

        /// How calls are attributed when several definitions share a name.
        /// Overrides `[extract] duplicates` in code-flow.toml.
        #[arg(long, value_enum)]
        duplicates: Option<DuplicatePolicy>,
    },

    /// Emit the positioned presentation graph (nodes with code, edges) as JSON.
    Graph {
        /// Python source file, or `-` for stdin.
        file: PathBuf,

        /// Keep calls to undefined names as placeholder nodes instead of dropping them.
        #[arg(long)]
        keep_dangling: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that every edge of a presentation graph JSON references an existing node.
    ///
    /// Exits with status 1 when the graph is invalid.
    Validate {
        /// Graph JSON file, or `-` for stdin.
        file: PathBuf,
    },

    /// Export the call graph as Graphviz DOT or a Mermaid flowchart.
    Export {
        /// Python source file, or `-` for stdin.
        file: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Dot)]
        format: ExportFormat,

        /// Only export functions matching this regex and their neighborhood.
        #[arg(long)]
        focus: Option<String>,

        /// Hop depth of the focus neighborhood.
        #[arg(long, default_value_t = 1)]
        depth: usize,

        /// Include nodes for called names that are never defined.
        #[arg(long)]
        unresolved: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Call graph statistics: counts, roots, leaves, recursion.
    Stats {
        /// Python source file, or `-` for stdin.
        file: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Index a project directory, extracting every Python file in parallel.
    Index {
        /// Path to the project root to index.
        path: PathBuf,

        /// Print each discovered file path during indexing.
        #[arg(long)]
        verbose: bool,

        /// Output results as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
}
