use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::extract::{CallGraphBuilder, Dataset};
use crate::parser::Frontend;
use crate::telemetry::EventSink;

/// Outcome of extracting one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// The dataset, or a one-line reason the file was skipped.
    pub outcome: Result<Dataset, String>,
}

impl FileReport {
    pub fn is_parsed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate statistics produced by an indexing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub files: usize,
    pub parsed: usize,
    /// Files skipped due to read, size or syntax errors.
    pub failed: usize,
    pub functions: usize,
    pub calls: usize,
    /// Wall-clock time for the indexing run in seconds.
    pub elapsed_secs: f64,
}

/// Extract every file in parallel with a shared builder.
///
/// Reports come back in the order of `files`. A file that cannot be read as
/// UTF-8 or fails extraction is reported, logged and counted as failed; it
/// never aborts the run.
pub fn index_project<F, S>(
    files: &[PathBuf],
    builder: &CallGraphBuilder<F, S>,
) -> (Vec<FileReport>, IndexSummary)
where
    F: Frontend + Sync,
    S: EventSink + Sync,
{
    let start = Instant::now();

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| FileReport {
            path: path.clone(),
            outcome: extract_file(path, builder),
        })
        .collect();

    let mut summary = IndexSummary {
        files: reports.len(),
        parsed: 0,
        failed: 0,
        functions: 0,
        calls: 0,
        elapsed_secs: 0.0,
    };
    for report in &reports {
        match &report.outcome {
            Ok(dataset) => {
                summary.parsed += 1;
                summary.functions += dataset.functions.len();
                summary.calls += dataset.calls.len();
            }
            Err(reason) => {
                summary.failed += 1;
                tracing::warn!(path = %report.path.display(), "skipped: {reason}");
            }
        }
    }
    summary.elapsed_secs = start.elapsed().as_secs_f64();

    (reports, summary)
}

fn extract_file<F: Frontend, S: EventSink>(
    path: &Path,
    builder: &CallGraphBuilder<F, S>,
) -> Result<Dataset, String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    builder.try_extract(&source).map_err(|e| e.to_string())
}
