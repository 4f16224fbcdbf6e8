//! Pure transforms from input files to warehouse rows.
//!
//! Nothing in here touches storage; the pipeline applies the rows.

mod error;
mod event_log;
mod song;
mod time;

pub use error::{EventError, TransformError};
pub use event_log::{
    derive_play_rows, is_play, parse_log_file, LogFileEvents, PlayRows, RawPlay, RawUser,
    SongplayCandidate, PLAY_PAGE,
};
pub use song::{parse_song_file, SongFileRows};
pub use time::{derive_time_record, START_TIME_FORMAT};

/// `None` for empty or whitespace-only strings.
pub(crate) fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
