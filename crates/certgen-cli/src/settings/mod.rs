//! Tool settings.
//!
//! Settings describe how this machine runs the toolchain, not the cluster.
//! They live in an optional TOML file in the platform config directory.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used for documents when none is configured.
pub const DEFAULT_JSON_DIR: &str = "json";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Tool settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// cfssl binary to run when `--cfssl` is not given.
    pub cfssl: Option<PathBuf>,

    /// Subdirectory of the output directory that receives the documents.
    pub json_dir: Option<String>,

    /// Limit for a single cfssl invocation, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Get the default settings file path.
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("io", "etcd", "etcd-certgen")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from the default location.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        if let Some(dir) = &settings.json_dir {
            if dir.is_empty() || Path::new(dir).is_absolute() {
                anyhow::bail!("json_dir must be a relative directory name, got {dir:?}");
            }
        }
        Ok(settings)
    }

    /// Document subdirectory.
    pub fn json_dir(&self) -> &str {
        self.json_dir.as_deref().unwrap_or(DEFAULT_JSON_DIR)
    }

    /// Per-invocation cfssl timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}
