use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;

use code_flow::cli::{Cli, Commands};
use code_flow::config::CodeFlowConfig;
use code_flow::export::model::ExportParams;
use code_flow::extract::{CallGraphBuilder, ExtractOptions};
use code_flow::graph::CallGraph;
use code_flow::output;
use code_flow::parser::PythonFrontend;
use code_flow::present::DanglingPolicy;
use code_flow::telemetry::{TracingSink, init_tracing};
use code_flow::{export_graph, graph_stats, index_project, present, validate_graph, walk_project};

/// Stand-in path meaning "read from stdin".
const STDIN: &str = "-";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Extract {
            file,
            format,
            duplicates,
        } => {
            let config = CodeFlowConfig::load(&config_dir(&file));
            let mut options = config.extract;
            if let Some(policy) = duplicates {
                options.duplicates = policy;
            }
            let dataset = builder(options).extract(&read_input(&file)?);
            output::print_dataset(&dataset, &format);
        }

        Commands::Graph {
            file,
            keep_dangling,
            output,
        } => {
            let config = CodeFlowConfig::load(&config_dir(&file));
            let mut options = config.present_options();
            if keep_dangling {
                options.dangling = DanglingPolicy::Placeholder;
            }
            let dataset = builder(config.extract).extract(&read_input(&file)?);
            let graph = present(&dataset, &options);
            let json = serde_json::to_string_pretty(&graph).context("failed to serialise graph")?;
            write_output(&json, output.as_deref())?;
        }

        Commands::Validate { file } => {
            let text = read_input(&file)?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            if validate_graph(&value, &TracingSink) {
                println!("valid");
            } else {
                eprintln!("invalid graph: {}", file.display());
                std::process::exit(1);
            }
        }

        Commands::Export {
            file,
            format,
            focus,
            depth,
            unresolved,
            output,
        } => {
            let config = CodeFlowConfig::load(&config_dir(&file));
            let focus = focus
                .map(|pattern| {
                    Regex::new(&pattern).with_context(|| format!("invalid --focus pattern `{pattern}`"))
                })
                .transpose()?;
            let dataset = builder(config.extract).extract(&read_input(&file)?);
            let graph = CallGraph::from_dataset(&dataset);
            let params = ExportParams {
                format,
                focus,
                depth,
                include_unresolved: unresolved,
            };
            let result = export_graph(&graph, &params);
            write_output(&result.content, output.as_deref())?;
        }

        Commands::Stats { file, format } => {
            let config = CodeFlowConfig::load(&config_dir(&file));
            let dataset = builder(config.extract).extract(&read_input(&file)?);
            output::print_stats(&graph_stats(&dataset), &format);
        }

        Commands::Index {
            path,
            verbose,
            json,
        } => {
            let config = CodeFlowConfig::load(&path);
            let files = walk_project(&path, &config, verbose)?;
            let (reports, summary) = index_project(&files, &builder(config.extract));
            output::print_summary(&summary, &reports, json);
        }
    }

    Ok(())
}

fn builder(options: ExtractOptions) -> CallGraphBuilder {
    CallGraphBuilder::new(PythonFrontend, TracingSink).with_options(options)
}

/// Directory whose `code-flow.toml` applies to `file`.
fn config_dir(file: &Path) -> PathBuf {
    if file.as_os_str() == STDIN {
        return PathBuf::from(".");
    }
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == STDIN {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin as UTF-8")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
