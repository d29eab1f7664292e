//! Rendering of the generated documents for `--dry-run`.

use anyhow::Result;
use certgen_core::DocumentSet;
use clap::ValueEnum;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON, as written to disk
    #[default]
    Json,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    /// Render the full document set.
    pub fn render(self, docs: &DocumentSet) -> Result<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(docs)?,
            Self::Yaml => serde_yaml::to_string(docs)?,
        })
    }
}
