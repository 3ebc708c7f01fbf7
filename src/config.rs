use std::path::Path;

use serde::Deserialize;

use crate::extract::ExtractOptions;
use crate::present::layout::LayoutOptions;
use crate::present::{DanglingPolicy, PresentOptions};

/// File name looked up in the project (or input file) directory.
pub const CONFIG_FILE: &str = "code-flow.toml";

/// The `[present]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PresentSection {
    pub dangling: DanglingPolicy,
}

/// Configuration loaded from `code-flow.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeFlowConfig {
    /// Additional path patterns to exclude from indexing (beyond .gitignore and virtualenvs).
    pub exclude: Option<Vec<String>>,
    pub extract: ExtractOptions,
    pub layout: LayoutOptions,
    pub present: PresentSection,
}

impl CodeFlowConfig {
    /// Load configuration from `code-flow.toml` in the given directory.
    ///
    /// Returns a default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => {
                    tracing::debug!(path = %config_path.display(), "loaded config");
                    config
                }
                Err(err) => {
                    tracing::warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Presentation options assembled from `[present]` and `[layout]`.
    pub fn present_options(&self) -> PresentOptions {
        PresentOptions {
            dangling: self.present.dangling,
            layout: self.layout.clone(),
        }
    }
}
