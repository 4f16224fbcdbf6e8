//! Applies derived rows to a `WarehouseStore`.
//!
//! Every write and lookup failure is caught here, logged with its table and
//! row, and turned into a counter. Nothing propagates to the caller.

use super::report::FileReport;
use crate::transform::SongplayCandidate;
use crate::warehouse::{SongplayFact, WarehouseRow, WarehouseStore};
use tracing::{debug, error};

pub struct RowWriter<'a> {
    store: &'a mut dyn WarehouseStore,
    report: FileReport,
}

impl<'a> RowWriter<'a> {
    pub fn new(store: &'a mut dyn WarehouseStore) -> Self {
        Self {
            store,
            report: FileReport::default(),
        }
    }

    /// Apply one row. Returns whether the store accepted it.
    pub fn write(&mut self, row: &WarehouseRow) -> bool {
        let result = match row {
            WarehouseRow::Song(song) => self.store.insert_song(song),
            WarehouseRow::Artist(artist) => self.store.insert_artist(artist),
            WarehouseRow::Time(time) => self.store.insert_time(time),
            WarehouseRow::User(user) => self.store.upsert_user(user),
            WarehouseRow::Songplay(songplay) => self.store.insert_songplay(songplay),
        };

        let table = row.table();
        match result {
            Ok(()) => {
                self.report.record_write(table, true);
                true
            }
            Err(e) => {
                let row_json = serde_json::to_string(row)
                    .unwrap_or_else(|_| format!("{:?}", row));
                error!(
                    table = %table,
                    key = %row.key(),
                    row = %row_json,
                    "Failed to write {} row: {:#}",
                    table,
                    e
                );
                self.report.record_write(table, false);
                false
            }
        }
    }

    /// Match a candidate against the song catalog and build the fact.
    ///
    /// A failed lookup counts as no match.
    pub fn resolve(&mut self, candidate: SongplayCandidate, tolerance: f64) -> SongplayFact {
        let found = match candidate.lookup_key() {
            None => None,
            Some((title, artist, length)) => {
                match self.store.find_song(title, artist, length, tolerance) {
                    Ok(found) => found,
                    Err(e) => {
                        error!(
                            song = title,
                            artist = artist,
                            length = length,
                            "Song lookup failed, writing play unresolved: {:#}",
                            e
                        );
                        None
                    }
                }
            }
        };

        if found.is_none() {
            debug!(
                song = ?candidate.song,
                artist = ?candidate.artist,
                "No catalog match for play"
            );
            self.report.unresolved_plays += 1;
        }
        candidate.resolve(found)
    }

    pub fn report_mut(&mut self) -> &mut FileReport {
        &mut self.report
    }

    pub fn into_report(self) -> FileReport {
        self.report
    }
}
