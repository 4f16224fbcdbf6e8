//! Event log files.
//!
//! A log file is newline-delimited JSON, one application event per line.
//! Only `NextSong` events are plays; every other page is dropped before any
//! row is derived. Each play yields a time row, a user row and a songplay
//! candidate that still has to be resolved against the song catalog.
//!
//! The three are derived independently. Only the time row depends on `ts`
//! alone, so a bad `ts` is the only thing that loses the whole event.

use super::error::{EventError, TransformError};
use super::non_blank;
use super::time::derive_time_record;
use crate::warehouse::{SongMatch, SongplayFact, TimeRecord, UserRecord};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// The `page` value of a play event.
pub const PLAY_PAGE: &str = "NextSong";

#[derive(Debug, Deserialize)]
struct RawTimestamp {
    #[serde(deserialize_with = "deserialize_loose_int")]
    ts: i64,
}

/// The user fields of a raw event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// The play fields of a raw event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlay {
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_loose_opt_int")]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
}

impl LooseInt {
    fn into_i64<E: de::Error>(self) -> Result<i64, E> {
        match self {
            LooseInt::Int(n) => Ok(n),
            // 2^63 as f64; anything at or past it does not fit
            LooseInt::Float(f) if f.fract() == 0.0 && f.abs() < 9.223_372_036_854_776e18 => {
                Ok(f as i64)
            }
            LooseInt::Float(f) => Err(E::custom(format!("expected an integer, got {}", f))),
        }
    }
}

/// Integers sometimes come out of the upstream exporter as `1541990258796.0`.
fn deserialize_loose_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    LooseInt::deserialize(deserializer)?.into_i64()
}

fn deserialize_loose_opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LooseInt>::deserialize(deserializer)?
        .map(LooseInt::into_i64)
        .transpose()
}

/// User ids show up both as strings and as numbers; empty strings mean
/// "logged out".
fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<LooseId>::deserialize(deserializer)? {
        None => None,
        Some(LooseId::Text(s)) => non_blank(s.trim().to_string()),
        Some(LooseId::Number(n)) => Some(n.to_string()),
    })
}

/// The play events of one log file, in file order.
#[derive(Debug, Default)]
pub struct LogFileEvents {
    /// `(line number, event)` of every `NextSong` event.
    pub plays: Vec<(usize, Value)>,
    /// Events dropped because they are not plays.
    pub skipped: usize,
}

/// Parse every line of a log file and keep the play events.
///
/// A line that is not valid JSON makes the whole file unusable.
pub fn parse_log_file(content: &str) -> Result<LogFileEvents, TransformError> {
    let mut events = LogFileEvents::default();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|source| TransformError::Json {
            line: index + 1,
            source,
        })?;
        if is_play(&value) {
            events.plays.push((index + 1, value));
        } else {
            events.skipped += 1;
        }
    }
    Ok(events)
}

pub fn is_play(event: &Value) -> bool {
    event.get("page").and_then(Value::as_str) == Some(PLAY_PAGE)
}

/// A songplay fact that has not been matched against the catalog yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayCandidate {
    pub start_time: String,
    pub user_id: String,
    pub level: String,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongplayCandidate {
    /// The `(title, artist, length)` triple to look up, if the event has one.
    pub fn lookup_key(&self) -> Option<(&str, &str, f64)> {
        match (&self.song, &self.artist, self.length) {
            (Some(song), Some(artist), Some(length)) => {
                Some((song.as_str(), artist.as_str(), length))
            }
            _ => None,
        }
    }

    pub fn resolve(self, found: Option<SongMatch>) -> SongplayFact {
        let (song_id, artist_id) = match found {
            Some(m) => (Some(m.song_id), Some(m.artist_id)),
            None => (None, None),
        };
        SongplayFact {
            start_time: self.start_time,
            user_id: self.user_id,
            level: self.level,
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location,
            user_agent: self.user_agent,
        }
    }
}

/// Everything derived from one play event.
///
/// The user row and the songplay fail independently of each other.
#[derive(Debug)]
pub struct PlayRows {
    pub time: TimeRecord,
    pub user: Result<UserRecord, EventError>,
    pub songplay: Result<SongplayCandidate, EventError>,
}

/// Derive the rows of one play event.
///
/// Fails only when no time row can be derived from `ts`.
pub fn derive_play_rows(event: &Value) -> Result<PlayRows, EventError> {
    let RawTimestamp { ts } = RawTimestamp::deserialize(event)?;
    let time = derive_time_record(ts)?;

    let user = RawUser::deserialize(event)
        .map_err(EventError::from)
        .and_then(derive_user);
    let songplay = RawPlay::deserialize(event)
        .map_err(EventError::from)
        .and_then(|play| derive_songplay(play, &time));

    Ok(PlayRows {
        time,
        user,
        songplay,
    })
}

fn derive_user(raw: RawUser) -> Result<UserRecord, EventError> {
    Ok(UserRecord {
        user_id: raw.user_id.ok_or(EventError::MissingField("userId"))?,
        first_name: raw.first_name,
        last_name: raw.last_name,
        gender: raw.gender,
        level: raw
            .level
            .and_then(non_blank)
            .ok_or(EventError::MissingField("level"))?,
    })
}

fn derive_songplay(raw: RawPlay, time: &TimeRecord) -> Result<SongplayCandidate, EventError> {
    Ok(SongplayCandidate {
        start_time: time.start_time.clone(),
        user_id: raw.user_id.ok_or(EventError::MissingField("userId"))?,
        level: raw
            .level
            .and_then(non_blank)
            .ok_or(EventError::MissingField("level"))?,
        song: raw.song.and_then(non_blank),
        artist: raw.artist.and_then(non_blank),
        length: raw.length,
        session_id: raw.session_id.ok_or(EventError::MissingField("sessionId"))?,
        location: raw.location.and_then(non_blank),
        user_agent: raw.user_agent.and_then(non_blank),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kenya_play() -> Value {
        json!({
            "artist": "Kadja Nin",
            "auth": "Logged In",
            "firstName": "Ryan",
            "gender": "M",
            "itemInSession": 0,
            "lastName": "Smith",
            "length": 145.8,
            "level": "free",
            "location": "San Jose-Sunnyvale-Santa Clara, CA",
            "method": "PUT",
            "page": "NextSong",
            "registration": 1541016707796.0,
            "sessionId": 583,
            "song": "Kenya",
            "status": 200,
            "ts": 1541990258796i64,
            "userAgent": "Mozilla/5.0",
            "userId": "26"
        })
    }

    #[test]
    fn keeps_only_play_events() {
        let home = json!({
            "page": "Home",
            "ts": 1541990217796i64,
            "userId": "26",
            "sessionId": 583
        });
        let content = format!("{}\n\n{}\n{}\n", home, kenya_play(), home);

        let events = parse_log_file(&content).unwrap();
        assert_eq!(events.plays.len(), 1);
        assert_eq!(events.plays[0].0, 3);
        assert_eq!(events.skipped, 2);
    }

    #[test]
    fn malformed_line_fails_the_file() {
        let content = format!("{}\n{{not json\n", kenya_play());
        assert!(matches!(
            parse_log_file(&content),
            Err(TransformError::Json { line: 2, .. })
        ));
    }

    #[test]
    fn derives_time_user_and_songplay() {
        let rows = derive_play_rows(&kenya_play()).unwrap();

        assert_eq!(rows.time.start_time, "2018-11-12 02:37:38.796");
        assert_eq!(
            rows.user.unwrap(),
            UserRecord {
                user_id: "26".to_owned(),
                first_name: Some("Ryan".to_owned()),
                last_name: Some("Smith".to_owned()),
                gender: Some("M".to_owned()),
                level: "free".to_owned(),
            }
        );
        let songplay = rows.songplay.unwrap();
        assert_eq!(songplay.start_time, rows.time.start_time);
        assert_eq!(songplay.session_id, 583);
        assert_eq!(songplay.lookup_key(), Some(("Kenya", "Kadja Nin", 145.8)));
    }

    #[test]
    fn numeric_user_id_is_accepted() {
        let mut event = kenya_play();
        event["userId"] = json!(26);
        assert_eq!(derive_play_rows(&event).unwrap().user.unwrap().user_id, "26");
    }

    #[test]
    fn integral_float_timestamp_is_accepted() {
        let mut event = kenya_play();
        event["ts"] = json!(1541990258796.0);
        event["sessionId"] = json!(583.0);

        let rows = derive_play_rows(&event).unwrap();
        assert_eq!(rows.time.start_time, "2018-11-12 02:37:38.796");
        assert_eq!(rows.songplay.unwrap().session_id, 583);
    }

    #[test]
    fn rejects_invalid_timestamp() {
        for ts in [json!("yesterday"), json!(1541990258796.5), Value::Null] {
            let mut event = kenya_play();
            event["ts"] = ts;
            assert!(matches!(
                derive_play_rows(&event),
                Err(EventError::Malformed(_))
            ));
        }
    }

    #[test]
    fn logged_out_user_still_yields_time() {
        let mut event = kenya_play();
        event["userId"] = json!("");

        let rows = derive_play_rows(&event).unwrap();
        assert_eq!(rows.time.start_time, "2018-11-12 02:37:38.796");
        assert!(matches!(rows.user, Err(EventError::MissingField("userId"))));
        assert!(matches!(
            rows.songplay,
            Err(EventError::MissingField("userId"))
        ));
    }

    #[test]
    fn missing_session_only_affects_the_songplay() {
        let mut event = kenya_play();
        event.as_object_mut().unwrap().remove("sessionId");

        let rows = derive_play_rows(&event).unwrap();
        assert!(rows.user.is_ok());
        assert!(matches!(
            rows.songplay,
            Err(EventError::MissingField("sessionId"))
        ));
    }

    #[test]
    fn mistyped_user_field_only_affects_the_user() {
        let mut event = kenya_play();
        event["firstName"] = json!(42);

        let rows = derive_play_rows(&event).unwrap();
        assert!(matches!(rows.user, Err(EventError::Malformed(_))));
        assert!(rows.songplay.is_ok());
    }

    #[test]
    fn resolve_fills_or_clears_ids() {
        let candidate = derive_play_rows(&kenya_play()).unwrap().songplay.unwrap();

        let unresolved = candidate.clone().resolve(None);
        assert_eq!(unresolved.song_id, None);
        assert_eq!(unresolved.artist_id, None);
        assert_eq!(unresolved.user_agent.as_deref(), Some("Mozilla/5.0"));

        let resolved = candidate.resolve(Some(SongMatch {
            song_id: "SOSVHAP12AB017D5FD".to_owned(),
            artist_id: "AR1AWYK1187FB5E30F".to_owned(),
        }));
        assert!(resolved.is_resolved());
    }

    #[test]
    fn play_without_song_has_no_lookup_key() {
        let mut event = kenya_play();
        event["song"] = Value::Null;
        let rows = derive_play_rows(&event).unwrap();
        assert_eq!(rows.songplay.unwrap().lookup_key(), None);
    }
}
