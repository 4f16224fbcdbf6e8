use super::discover::discover_json_files;
use super::processors::FileProcessor;
use super::report::RunReport;
use super::writer::RowWriter;
use crate::warehouse::WarehouseStore;
use std::path::Path;
use tracing::{error, info};

/// Run `processor` over every JSON file below `root`, one unit of work per
/// file, in path order.
///
/// Failures of single files are logged and counted; nothing propagates.
pub fn process_data(
    store: &mut dyn WarehouseStore,
    root: &Path,
    processor: &dyn FileProcessor,
) -> RunReport {
    let files = discover_json_files(root);
    let num_files = files.len();
    info!("{} files found in {}", num_files, root.display());

    let mut report = RunReport {
        files_found: num_files,
        ..Default::default()
    };

    for (i, path) in files.iter().enumerate() {
        process_file(store, path, processor, &mut report);
        info!("{}/{} files processed.", i + 1, num_files);
    }

    report
}

/// One unit of work: begin, process, then commit or roll back.
fn process_file(
    store: &mut dyn WarehouseStore,
    path: &Path,
    processor: &dyn FileProcessor,
    report: &mut RunReport,
) {
    if let Err(e) = store.begin() {
        error!("Could not start unit of work for {:?}: {:#}", path, e);
        report.files_failed += 1;
        return;
    }

    let mut writer = RowWriter::new(store);
    let outcome = processor.process(&mut writer, path);
    let file_report = writer.into_report();

    let failure = match outcome {
        Ok(()) => match store.commit() {
            Ok(()) => {
                report.files_committed += 1;
                report.absorb(file_report);
                return;
            }
            Err(e) => format!("Failed to commit {:?}: {:#}", path, e),
        },
        Err(e) => format!("Skipping {} file {:?}: {}", processor.name(), path, e),
    };

    error!("{}", failure);
    if let Err(e) = store.rollback() {
        error!("Failed to roll back {:?}: {:#}", path, e);
    }
    report.files_failed += 1;
}
