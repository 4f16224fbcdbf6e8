mod file_config;

pub use file_config::FileConfig;

use crate::pipeline::LoadPlan;
use crate::warehouse::Statements;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SONG_DATA_DIR: &str = "data/song_data";
pub const DEFAULT_LOG_DATA_DIR: &str = "data/log_data";
pub const DEFAULT_DB_PATH: &str = "songplays.db";
pub const DEFAULT_DURATION_TOLERANCE: f64 = 0.001;

/// CLI arguments that can be used for config resolution.
/// Unset values fall back to the TOML file, then to the defaults above.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub song_data_dir: Option<PathBuf>,
    pub log_data_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub duration_tolerance: Option<f64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub db_path: PathBuf,
    pub duration_tolerance: f64,
    pub dry_run: bool,
    pub statements: Statements,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let song_data_dir = file
            .song_data_dir
            .map(PathBuf::from)
            .or_else(|| cli.song_data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SONG_DATA_DIR));
        ensure_dir_if_present(&song_data_dir, "song_data_dir")?;

        let log_data_dir = file
            .log_data_dir
            .map(PathBuf::from)
            .or_else(|| cli.log_data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DATA_DIR));
        ensure_dir_if_present(&log_data_dir, "log_data_dir")?;

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let duration_tolerance = file
            .duration_tolerance
            .or(cli.duration_tolerance)
            .unwrap_or(DEFAULT_DURATION_TOLERANCE);
        if !duration_tolerance.is_finite() || duration_tolerance < 0.0 {
            bail!(
                "duration_tolerance must be a non-negative number, got {}",
                duration_tolerance
            );
        }

        let dry_run = file.dry_run.unwrap_or(cli.dry_run);

        let statements = Statements::with_overrides(file.statements.unwrap_or_default());

        Ok(Self {
            song_data_dir,
            log_data_dir,
            db_path,
            duration_tolerance,
            dry_run,
            statements,
        })
    }

    pub fn load_plan(&self) -> LoadPlan {
        LoadPlan {
            song_data_dir: self.song_data_dir.clone(),
            log_data_dir: self.log_data_dir.clone(),
            duration_tolerance: self.duration_tolerance,
        }
    }
}

/// A data root may be absent (nothing to load) but must not be a file.
fn ensure_dir_if_present(path: &Path, name: &str) -> Result<()> {
    if path.exists() && !path.is_dir() {
        bail!("{} is not a directory: {:?}", name, path);
    }
    Ok(())
}
