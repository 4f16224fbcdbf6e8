//! SQL statements used by `SqliteWarehouseStore`.
//!
//! The statement text is configuration: any of them can be replaced from the
//! `[statements]` table of the config file, as long as the positional
//! parameters keep the order documented on each field.

use serde::Deserialize;

pub const SONG_TABLE_INSERT: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(song_id) DO NOTHING";

pub const ARTIST_TABLE_INSERT: &str =
    "INSERT INTO artists (artist_id, name, location, latitude, longitude)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(artist_id) DO NOTHING";

pub const TIME_TABLE_INSERT: &str =
    "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(start_time) DO NOTHING";

pub const USER_TABLE_INSERT: &str =
    "INSERT INTO users (user_id, first_name, last_name, gender, level)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(user_id) DO UPDATE SET level = excluded.level";

pub const SONGPLAY_TABLE_INSERT: &str = "INSERT INTO songplays
     (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

pub const SONG_SELECT: &str = "SELECT s.song_id, s.artist_id
     FROM songs s JOIN artists a ON s.artist_id = a.artist_id
     WHERE TRIM(s.title) = TRIM(?1)
       AND TRIM(a.name) = TRIM(?2)
       AND ABS(s.duration - ?3) <= ?4
     ORDER BY ABS(s.duration - ?3), s.song_id
     LIMIT 1";

/// The six statements the store executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statements {
    /// `(song_id, title, artist_id, year, duration)`
    pub song_insert: String,
    /// `(artist_id, name, location, latitude, longitude)`
    pub artist_insert: String,
    /// `(start_time, hour, day, week, month, year, weekday)`
    pub time_insert: String,
    /// `(user_id, first_name, last_name, gender, level)`
    pub user_insert: String,
    /// `(start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)`
    pub songplay_insert: String,
    /// `(title, artist_name, length, tolerance)` returning `(song_id, artist_id)`
    pub song_select: String,
}

impl Default for Statements {
    fn default() -> Self {
        Self {
            song_insert: SONG_TABLE_INSERT.to_string(),
            artist_insert: ARTIST_TABLE_INSERT.to_string(),
            time_insert: TIME_TABLE_INSERT.to_string(),
            user_insert: USER_TABLE_INSERT.to_string(),
            songplay_insert: SONGPLAY_TABLE_INSERT.to_string(),
            song_select: SONG_SELECT.to_string(),
        }
    }
}

/// Optional per-statement overrides, as read from the config file.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StatementOverrides {
    pub song_insert: Option<String>,
    pub artist_insert: Option<String>,
    pub time_insert: Option<String>,
    pub user_insert: Option<String>,
    pub songplay_insert: Option<String>,
    pub song_select: Option<String>,
}

impl Statements {
    pub fn with_overrides(overrides: StatementOverrides) -> Self {
        let defaults = Self::default();
        Self {
            song_insert: overrides.song_insert.unwrap_or(defaults.song_insert),
            artist_insert: overrides.artist_insert.unwrap_or(defaults.artist_insert),
            time_insert: overrides.time_insert.unwrap_or(defaults.time_insert),
            user_insert: overrides.user_insert.unwrap_or(defaults.user_insert),
            songplay_insert: overrides
                .songplay_insert
                .unwrap_or(defaults.songplay_insert),
            song_select: overrides.song_select.unwrap_or(defaults.song_select),
        }
    }
}
