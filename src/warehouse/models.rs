//! Row models for the songplays star schema.
//!
//! Each struct maps one-to-one to a table row. They are produced by the
//! transforms in `crate::transform` and consumed by a `WarehouseStore`.

use serde::Serialize;
use std::fmt;

// =============================================================================
// Target tables
// =============================================================================

/// Tables of the star schema. Used to tag rows and error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TargetTable {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl TargetTable {
    pub const ALL: [TargetTable; 5] = [
        TargetTable::Songs,
        TargetTable::Artists,
        TargetTable::Users,
        TargetTable::Time,
        TargetTable::Songplays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetTable::Songs => "songs",
            TargetTable::Artists => "artists",
            TargetTable::Users => "users",
            TargetTable::Time => "time",
            TargetTable::Songplays => "songplays",
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Dimension rows
// =============================================================================

/// Song dimension row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    /// Release year, 0 when unknown.
    pub year: i32,
    /// Duration in seconds.
    pub duration: f64,
}

/// Artist dimension row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Time dimension row, keyed by `start_time`.
///
/// `weekday` counts from Monday = 0 to Sunday = 6, `week` is the ISO-8601
/// week number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeRecord {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

/// User dimension row. `level` is overwritten on conflict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
}

// =============================================================================
// Fact rows
// =============================================================================

/// A `(song_id, artist_id)` pair resolved from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

/// Songplay fact row. Appended as-is, never deduplicated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SongplayFact {
    pub start_time: String,
    pub user_id: String,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongplayFact {
    pub fn is_resolved(&self) -> bool {
        self.song_id.is_some() && self.artist_id.is_some()
    }
}

// =============================================================================
// Tagged rows
// =============================================================================

/// Any row the writer knows how to apply.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum WarehouseRow {
    Song(SongRecord),
    Artist(ArtistRecord),
    Time(TimeRecord),
    User(UserRecord),
    Songplay(SongplayFact),
}

impl WarehouseRow {
    pub fn table(&self) -> TargetTable {
        match self {
            WarehouseRow::Song(_) => TargetTable::Songs,
            WarehouseRow::Artist(_) => TargetTable::Artists,
            WarehouseRow::Time(_) => TargetTable::Time,
            WarehouseRow::User(_) => TargetTable::Users,
            WarehouseRow::Songplay(_) => TargetTable::Songplays,
        }
    }

    /// Short human identifier for log lines.
    pub fn key(&self) -> String {
        match self {
            WarehouseRow::Song(s) => s.song_id.clone(),
            WarehouseRow::Artist(a) => a.artist_id.clone(),
            WarehouseRow::Time(t) => t.start_time.clone(),
            WarehouseRow::User(u) => u.user_id.clone(),
            WarehouseRow::Songplay(p) => format!("{}@{}", p.user_id, p.start_time),
        }
    }
}

/// Row counts per table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub time: usize,
    pub songplays: usize,
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} songs, {} artists, {} users, {} time, {} songplays",
            self.songs, self.artists, self.users, self.time, self.songplays
        )
    }
}
