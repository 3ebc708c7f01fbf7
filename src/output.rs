use std::io::IsTerminal;

use crate::cli::OutputFormat;
use crate::extract::Dataset;
use crate::index::{FileReport, IndexSummary};
use crate::stats::GraphStats;

fn bold(s: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[1m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

/// Render a dataset according to the selected output format.
pub fn render_dataset(dataset: &Dataset, format: &OutputFormat, use_color: bool) -> String {
    let mut out = String::new();
    match format {
        OutputFormat::Compact => {
            for name in &dataset.functions {
                out.push_str(&format!("def {name}\n"));
            }
            for edge in &dataset.calls {
                out.push_str(&format!("call {} -> {}\n", edge.caller, edge.callee));
            }
            out.push_str(&format!(
                "{} functions, {} calls\n",
                dataset.functions.len(),
                dataset.calls.len()
            ));
        }

        OutputFormat::Table => {
            // Column widths: auto-sized to data.
            let caller_w = dataset
                .calls
                .iter()
                .map(|e| e.caller.len())
                .chain(dataset.functions.iter().map(String::len))
                .max()
                .unwrap_or(6)
                .max(6);

            let header = format!("{:<caller_w$}  {:>5}  CALLEES", "CALLER", "LINES");
            out.push_str(&bold(&header, use_color));
            out.push('\n');
            out.push_str(&"-".repeat(caller_w + 16));
            out.push('\n');

            for name in &dataset.functions {
                let lines = dataset.code.get(name).map(|c| c.lines().count()).unwrap_or(0);
                let callees: Vec<&str> = dataset.callees_of(name).collect();
                let callees = if callees.is_empty() {
                    "-".to_string()
                } else {
                    callees.join(", ")
                };
                out.push_str(&format!("{name:<caller_w$}  {lines:>5}  {callees}\n"));
            }
        }

        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(dataset).unwrap_or_default());
            out.push('\n');
        }
    }
    out
}

/// Print a dataset to stdout.
pub fn print_dataset(dataset: &Dataset, format: &OutputFormat) {
    print!(
        "{}",
        render_dataset(dataset, format, std::io::stdout().is_terminal())
    );
}

/// Render call graph statistics according to the selected output format.
pub fn render_stats(stats: &GraphStats, format: &OutputFormat, use_color: bool) -> String {
    let mut out = String::new();
    let groups = || {
        stats
            .recursive_groups
            .iter()
            .map(|g| g.join(","))
            .collect::<Vec<_>>()
            .join(" ")
    };

    match format {
        OutputFormat::Compact => {
            out.push_str(&format!(
                "functions {} calls {} unresolved {} dangling {}\n",
                stats.functions, stats.call_edges, stats.unresolved_callees, stats.dangling_edges,
            ));
            out.push_str(&format!("roots {}\n", stats.roots.join(" ")));
            out.push_str(&format!("leaves {}\n", stats.leaves.join(" ")));
            out.push_str(&format!("recursive {}\n", groups()));
        }

        OutputFormat::Table => {
            out.push_str(&bold("=== Call Graph Overview ===", use_color));
            out.push('\n');
            out.push_str(&format!("Functions:   {}\n", stats.functions));
            out.push_str(&format!("Call edges:  {}\n", stats.call_edges));
            out.push_str(&format!("Unresolved:  {}\n", stats.unresolved_callees));
            out.push_str(&format!("Dangling:    {}\n", stats.dangling_edges));
            out.push('\n');
            out.push_str(&bold("--- Shape ---", use_color));
            out.push('\n');
            out.push_str(&format!("  Roots:     {}\n", stats.roots.join(", ")));
            out.push_str(&format!("  Leaves:    {}\n", stats.leaves.join(", ")));
            out.push_str(&format!("  Recursive: {}\n", stats.recursive_groups.len()));
            for group in &stats.recursive_groups {
                out.push_str(&format!("    {}\n", group.join(" <-> ")));
            }
        }

        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(stats).unwrap_or_default());
            out.push('\n');
        }
    }
    out
}

/// Print call graph statistics to stdout.
pub fn print_stats(stats: &GraphStats, format: &OutputFormat) {
    print!(
        "{}",
        render_stats(stats, format, std::io::stdout().is_terminal())
    );
}

/// Print a summary of the indexing run.
///
/// - `json = true`: emit a pretty-printed JSON object to stdout, with a
///   per-file breakdown.
/// - `json = false`: emit a cargo-style human-readable summary to stdout.
///
/// If any file failed, a warning line is written to **stderr** so that the
/// stdout stream remains clean for downstream JSON consumers.
pub fn print_summary(summary: &IndexSummary, reports: &[FileReport], json: bool) {
    if json {
        let files: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| match &r.outcome {
                Ok(dataset) => serde_json::json!({
                    "path": r.path.to_string_lossy(),
                    "functions": dataset.functions.len(),
                    "calls": dataset.calls.len(),
                }),
                Err(reason) => serde_json::json!({
                    "path": r.path.to_string_lossy(),
                    "error": reason,
                }),
            })
            .collect();
        let value = serde_json::json!({
            "summary": summary,
            "files": files,
        });
        match serde_json::to_string_pretty(&value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error serialising summary: {}", e),
        }
        return;
    }

    println!(
        "Indexed {} files in {:.2}s",
        summary.files, summary.elapsed_secs
    );
    println!(
        "  {} functions, {} call edges",
        summary.functions, summary.calls
    );

    if summary.failed > 0 {
        eprintln!("  {} files skipped (read or parse errors)", summary.failed);
    }
}
