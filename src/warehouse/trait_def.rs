//! WarehouseStore trait definition.
//!
//! The storage port used by the pipeline. It is passed explicitly as
//! `&mut dyn WarehouseStore`, so the SQLite backend and the in-memory one are
//! interchangeable.

use super::models::*;
use anyhow::Result;

pub trait WarehouseStore {
    // =========================================================================
    // Units of Work
    // =========================================================================

    /// Start the unit of work for one input file.
    fn begin(&mut self) -> Result<()>;

    /// Make every write since `begin` durable.
    fn commit(&mut self) -> Result<()>;

    /// Discard every write since `begin`. A no-op outside a unit of work.
    fn rollback(&mut self) -> Result<()>;

    // =========================================================================
    // Dimension Writes
    // =========================================================================

    /// Insert a song, ignoring it when `song_id` already exists.
    fn insert_song(&mut self, song: &SongRecord) -> Result<()>;

    /// Insert an artist, ignoring it when `artist_id` already exists.
    fn insert_artist(&mut self, artist: &ArtistRecord) -> Result<()>;

    /// Insert a time row, ignoring it when `start_time` already exists.
    fn insert_time(&mut self, time: &TimeRecord) -> Result<()>;

    /// Insert a user, or overwrite its `level` when `user_id` already exists.
    fn upsert_user(&mut self, user: &UserRecord) -> Result<()>;

    // =========================================================================
    // Fact Writes
    // =========================================================================

    /// Append a songplay. Never deduplicated.
    fn insert_songplay(&mut self, songplay: &SongplayFact) -> Result<()>;

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Find the song whose title, artist name and duration match a play.
    ///
    /// Durations match within `tolerance` seconds; among several matches the
    /// closest duration wins, then the lowest `song_id`.
    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        length: f64,
        tolerance: f64,
    ) -> Result<Option<SongMatch>>;

    /// Count the committed and pending rows of every table.
    fn counts(&mut self) -> Result<TableCounts>;
}
