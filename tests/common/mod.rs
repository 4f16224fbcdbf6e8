//! Common test infrastructure
//!
//! Builds song and log data trees in a temporary directory and runs the
//! load against a file-backed SQLite warehouse, the way the binary does.
//! Tests should only import from this module, not from internal submodules.

mod fixtures;

pub use fixtures::*;

use rusqlite::Connection;
use songplays_etl::pipeline::{run_load, LoadPlan, RunReport};
use songplays_etl::warehouse::{SqliteWarehouseStore, Statements};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// A scratch workspace: `song_data/`, `log_data/` and `warehouse.db`.
pub struct TestWorkspace {
    // Held for its Drop; the paths below live inside it
    _dir: TempDir,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub db_path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let song_data = dir.path().join("song_data");
        let log_data = dir.path().join("log_data");
        std::fs::create_dir_all(&song_data).expect("Failed to create song_data");
        std::fs::create_dir_all(&log_data).expect("Failed to create log_data");
        let db_path = dir.path().join("warehouse.db");
        Self {
            _dir: dir,
            song_data,
            log_data,
            db_path,
        }
    }

    /// Write a song file at `relative` below `song_data/`, nesting as needed.
    pub fn add_song_file(&self, relative: &str, content: &str) {
        write_nested(&self.song_data, relative, content);
    }

    /// Write a log file with one JSON event per line.
    pub fn add_log_file(&self, relative: &str, events: &[serde_json::Value]) {
        let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
        write_nested(&self.log_data, relative, &lines.join("\n"));
    }

    pub fn plan(&self) -> LoadPlan {
        LoadPlan {
            song_data_dir: self.song_data.clone(),
            log_data_dir: self.log_data.clone(),
            duration_tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Run a full load against the workspace database.
    pub fn run(&self) -> RunReport {
        let mut store = SqliteWarehouseStore::new(&self.db_path, Statements::default())
            .expect("Failed to open warehouse");
        run_load(&mut store, &self.plan())
    }

    /// A raw connection for inspecting what the load stored.
    pub fn connection(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open warehouse for inspection")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .expect("count query failed")
    }
}

fn write_nested(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    std::fs::write(path, content).expect("Failed to write fixture file");
}
