use crate::warehouse::StatementOverrides;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub song_data_dir: Option<String>,
    pub log_data_dir: Option<String>,
    pub db_path: Option<String>,
    pub duration_tolerance: Option<f64>,
    pub dry_run: Option<bool>,

    // SQL statement overrides
    pub statements: Option<StatementOverrides>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
