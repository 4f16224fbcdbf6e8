//! Per-file processing: read a file, transform it, write its rows.

use super::writer::RowWriter;
use crate::transform::{
    derive_play_rows, parse_log_file, parse_song_file, EventError, TransformError,
};
use crate::warehouse::{TargetTable, WarehouseRow};
use std::path::Path;
use tracing::{error, warn};

/// Turns one input file into warehouse writes.
pub trait FileProcessor {
    /// Short name used in progress lines.
    fn name(&self) -> &'static str;

    /// Process the file at `path`, writing through `writer`.
    ///
    /// An `Err` means the file was rejected as a whole before any row was
    /// written.
    fn process(&self, writer: &mut RowWriter<'_>, path: &Path) -> Result<(), TransformError>;
}

fn read_file(path: &Path) -> Result<String, TransformError> {
    std::fs::read_to_string(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads `songs` and `artists` from song metadata files.
pub struct SongFileProcessor;

impl FileProcessor for SongFileProcessor {
    fn name(&self) -> &'static str {
        "song"
    }

    fn process(&self, writer: &mut RowWriter<'_>, path: &Path) -> Result<(), TransformError> {
        let rows = parse_song_file(&read_file(path)?)?;

        if rows.ignored_records > 0 {
            warn!(
                "{:?} holds {} records after the first one, they are not loaded",
                path, rows.ignored_records
            );
            writer.report_mut().records_ignored += rows.ignored_records;
        }

        writer.write(&WarehouseRow::Song(rows.song));
        writer.write(&WarehouseRow::Artist(rows.artist));
        Ok(())
    }
}

/// Loads `time`, `users` and `songplays` from event log files.
pub struct LogFileProcessor {
    /// Largest duration difference, in seconds, still matching a song.
    pub duration_tolerance: f64,
}

impl FileProcessor for LogFileProcessor {
    fn name(&self) -> &'static str {
        "log"
    }

    fn process(&self, writer: &mut RowWriter<'_>, path: &Path) -> Result<(), TransformError> {
        let events = parse_log_file(&read_file(path)?)?;
        writer.report_mut().events_skipped += events.skipped;

        for (line, event) in events.plays {
            let rows = match derive_play_rows(&event) {
                Ok(rows) => rows,
                Err(e) => {
                    error!("Skipping event at {:?} line {}: {}", path, line, e);
                    writer.report_mut().events_rejected += 1;
                    continue;
                }
            };

            // Each kind is written regardless of how the others went
            writer.write(&WarehouseRow::Time(rows.time));

            match rows.user {
                Ok(user) => {
                    writer.write(&WarehouseRow::User(user));
                }
                Err(e) => reject_row(writer, TargetTable::Users, path, line, &e),
            }

            match rows.songplay {
                Ok(candidate) => {
                    let songplay = writer.resolve(candidate, self.duration_tolerance);
                    writer.write(&WarehouseRow::Songplay(songplay));
                }
                Err(e) => reject_row(writer, TargetTable::Songplays, path, line, &e),
            }
        }
        Ok(())
    }
}

fn reject_row(
    writer: &mut RowWriter<'_>,
    table: TargetTable,
    path: &Path,
    line: usize,
    e: &EventError,
) {
    error!(
        table = %table,
        "No {} row for event at {:?} line {}: {}",
        table,
        path,
        line,
        e
    );
    writer.report_mut().record_rejected(table);
}
