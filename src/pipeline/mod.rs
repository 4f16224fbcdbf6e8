//! The load pipeline: discover files, transform them, write the rows.

mod discover;
mod driver;
mod processors;
mod report;
mod writer;

pub use discover::discover_json_files;
pub use driver::process_data;
pub use processors::{FileProcessor, LogFileProcessor, SongFileProcessor};
pub use report::{FileReport, RunReport};
pub use writer::RowWriter;

use crate::warehouse::WarehouseStore;
use std::path::PathBuf;
use tracing::{info, warn};

/// Inputs of a full load.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub duration_tolerance: f64,
}

/// Load every song file, then every log file. Plays resolve only against
/// songs already loaded.
pub fn run_load(store: &mut dyn WarehouseStore, plan: &LoadPlan) -> RunReport {
    info!("Loading song data from {}", plan.song_data_dir.display());
    let mut report = process_data(store, &plan.song_data_dir, &SongFileProcessor);
    log_counts(store, "song data");

    info!("Loading log data from {}", plan.log_data_dir.display());
    let log_processor = LogFileProcessor {
        duration_tolerance: plan.duration_tolerance,
    };
    report.merge(process_data(store, &plan.log_data_dir, &log_processor));
    log_counts(store, "log data");

    report
}

fn log_counts(store: &mut dyn WarehouseStore, phase: &str) {
    match store.counts() {
        Ok(counts) => info!("After {}: {}", phase, counts),
        Err(e) => warn!("Could not count rows after {}: {:#}", phase, e),
    }
}
