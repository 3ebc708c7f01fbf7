use std::path::{Path, PathBuf};

use crate::config::CodeFlowConfig;
use crate::parser::languages::language_for_extension;

/// Directory names that never contain project sources.
const HARD_EXCLUDED_DIRS: &[&str] = &["__pycache__", ".venv", "venv", ".tox"];

/// Walk a project directory and collect Python source files.
///
/// Respects `.gitignore` rules, always excludes virtualenvs and bytecode
/// caches, and applies any additional exclusions from `config.exclude`.
/// Paths come back sorted so indexing order is stable.
///
/// When `verbose` is true, each discovered file path is printed to stderr.
pub fn walk_project(
    root: &Path,
    config: &CodeFlowConfig,
    verbose: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .filter_entry(|entry| {
            !entry
                .file_name()
                .to_str()
                .is_some_and(|name| HARD_EXCLUDED_DIRS.contains(&name))
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if is_excluded_by_config(rel, config) {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if language_for_extension(ext).is_none() {
            continue;
        }

        if verbose {
            eprintln!("{}", path.display());
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Returns true if `path` matches any exclusion pattern from config, either
/// as a whole relative path or through any single component.
fn is_excluded_by_config(path: &Path, config: &CodeFlowConfig) -> bool {
    let Some(patterns) = &config.exclude else {
        return false;
    };

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        let Ok(matcher) = glob::Pattern::new(pattern) else {
            tracing::warn!("ignoring invalid exclude pattern `{pattern}`");
            continue;
        };
        if matcher.matches(&path_str) {
            return true;
        }
        if path
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|s| matcher.matches(s))
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walk_project_returns_only_python_files() {
        let dir = tmp();
        fs::write(dir.path().join("main.py"), "def main(): pass\n").unwrap();
        fs::write(dir.path().join("stubs.pyi"), "def f() -> int: ...\n").unwrap();
        fs::write(dir.path().join("README.md"), "# Hello").unwrap();
        fs::write(dir.path().join("lib.rs"), "fn main() {}").unwrap();

        let files = walk_project(dir.path(), &CodeFlowConfig::default(), false).unwrap();
        assert_eq!(names(&files, dir.path()), vec!["main.py", "stubs.pyi"]);
    }

    #[test]
    fn test_hard_excluded_dirs() {
        let dir = tmp();
        for sub in ["__pycache__", ".venv/lib", "venv", ".tox/py3", "pkg"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("mod.py"), "def f(): pass\n").unwrap();
        }

        let files = walk_project(dir.path(), &CodeFlowConfig::default(), false).unwrap();
        assert_eq!(names(&files, dir.path()), vec!["pkg/mod.py"]);
    }

    #[test]
    fn test_respects_gitignore() {
        let dir = tmp();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        fs::create_dir_all(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("generated/out.py"), "def g(): pass\n").unwrap();
        fs::write(dir.path().join("app.py"), "def a(): pass\n").unwrap();

        let files = walk_project(dir.path(), &CodeFlowConfig::default(), false).unwrap();
        assert_eq!(names(&files, dir.path()), vec!["app.py"]);
    }

    #[test]
    fn test_respects_exclude_patterns() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/x.py"), "def x(): pass\n").unwrap();
        fs::write(dir.path().join("api_pb2.py"), "def y(): pass\n").unwrap();
        fs::write(dir.path().join("app.py"), "def a(): pass\n").unwrap();

        let config = CodeFlowConfig {
            exclude: Some(vec!["build".to_string(), "*_pb2.py".to_string()]),
            ..CodeFlowConfig::default()
        };
        let files = walk_project(dir.path(), &config, false).unwrap();
        assert_eq!(names(&files, dir.path()), vec!["app.py"]);
    }

    #[test]
    fn test_not_a_directory() {
        let dir = tmp();
        let file = dir.path().join("a.py");
        fs::write(&file, "").unwrap();
        assert!(walk_project(&file, &CodeFlowConfig::default(), false).is_err());
    }
}
