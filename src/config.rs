// ⚙️ Configuration
// JSON file, every field optional. No file means defaults.

use crate::entities::CourseRegistry;
use crate::source::DEFAULT_MIN_TOKEN_CHARS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding terms and scans
    pub database_path: PathBuf,

    /// Course catalogue JSON; the built-in catalogue when None
    pub registry_path: Option<PathBuf>,

    /// Shortest string kept from OCR dumps
    pub min_token_chars: usize,

    /// tracing-subscriber filter used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("sgpa.db"),
            registry_path: None,
            min_token_chars: DEFAULT_MIN_TOKEN_CHARS,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => AppConfig::from_file(p),
            None => Ok(AppConfig::default()),
        }
    }

    /// Course registry this configuration points at
    pub fn course_registry(&self) -> Result<CourseRegistry> {
        match &self.registry_path {
            Some(path) => CourseRegistry::from_file(path),
            None => Ok(CourseRegistry::new()),
        }
    }
}
