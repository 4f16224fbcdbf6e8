//! Song metadata files.
//!
//! A song file carries one JSON object describing a song and its artist.
//! Only the first record of a file is used; any later ones are counted and
//! reported by the caller.

use super::error::TransformError;
use super::non_blank;
use crate::warehouse::{ArtistRecord, SongRecord};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SongFileEntry {
    song_id: String,
    title: String,
    artist_id: String,
    artist_name: String,
    #[serde(default)]
    year: Option<i32>,
    duration: f64,
    #[serde(default)]
    artist_location: Option<String>,
    #[serde(default)]
    artist_latitude: Option<f64>,
    #[serde(default)]
    artist_longitude: Option<f64>,
}

/// Rows derived from one song file.
#[derive(Debug, Clone, PartialEq)]
pub struct SongFileRows {
    pub song: SongRecord,
    pub artist: ArtistRecord,
    /// Records after the first one, which are not loaded.
    pub ignored_records: usize,
}

pub fn parse_song_file(content: &str) -> Result<SongFileRows, TransformError> {
    let mut records = serde_json::Deserializer::from_str(content).into_iter::<Value>();

    let first = match records.next() {
        None => return Err(TransformError::Empty),
        Some(Err(source)) => {
            return Err(TransformError::Json {
                line: source.line(),
                source,
            })
        }
        Some(Ok(value)) => value,
    };

    let mut ignored_records = 0;
    for record in records {
        record.map_err(|source| TransformError::Json {
            line: source.line(),
            source,
        })?;
        ignored_records += 1;
    }

    let entry: SongFileEntry =
        serde_json::from_value(first).map_err(TransformError::InvalidRecord)?;

    let song_id = non_blank(entry.song_id).ok_or(TransformError::MissingField("song_id"))?;
    let artist_id = non_blank(entry.artist_id).ok_or(TransformError::MissingField("artist_id"))?;

    Ok(SongFileRows {
        song: SongRecord {
            song_id,
            title: entry.title,
            artist_id: artist_id.clone(),
            year: entry.year.unwrap_or(0),
            duration: entry.duration,
        },
        artist: ArtistRecord {
            artist_id,
            name: entry.artist_name,
            location: entry.artist_location.and_then(non_blank),
            latitude: entry.artist_latitude,
            longitude: entry.artist_longitude,
        },
        ignored_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KENYA: &str = r#"{"num_songs": 1, "artist_id": "AR1AWYK1187FB5E30F", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "Kadja Nin", "song_id": "SOSVHAP12AB017D5FD", "title": "Kenya", "duration": 145.8, "year": 2000}"#;

    #[test]
    fn parses_song_and_artist() {
        let rows = parse_song_file(KENYA).unwrap();

        assert_eq!(
            rows.song,
            SongRecord {
                song_id: "SOSVHAP12AB017D5FD".to_owned(),
                title: "Kenya".to_owned(),
                artist_id: "AR1AWYK1187FB5E30F".to_owned(),
                year: 2000,
                duration: 145.8,
            }
        );
        assert_eq!(
            rows.artist,
            ArtistRecord {
                artist_id: "AR1AWYK1187FB5E30F".to_owned(),
                name: "Kadja Nin".to_owned(),
                location: None,
                latitude: None,
                longitude: None,
            }
        );
        assert_eq!(rows.ignored_records, 0);
    }

    #[test]
    fn keeps_artist_coordinates() {
        let content = r#"{"artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": 35.14968, "artist_longitude": -90.04892, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;
        let rows = parse_song_file(content).unwrap();

        assert_eq!(rows.song.year, 0);
        assert_eq!(rows.artist.location.as_deref(), Some("California - LA"));
        assert_eq!(rows.artist.latitude, Some(35.14968));
        assert_eq!(rows.artist.longitude, Some(-90.04892));
    }

    #[test]
    fn takes_first_record_only() {
        let second = KENYA.replace("SOSVHAP12AB017D5FD", "SOOTHER");
        let content = format!("{}\n{}\n", KENYA, second);
        let rows = parse_song_file(&content).unwrap();

        assert_eq!(rows.song.song_id, "SOSVHAP12AB017D5FD");
        assert_eq!(rows.ignored_records, 1);
    }

    #[test]
    fn missing_year_means_unknown() {
        let content = KENYA.replace(", \"year\": 2000", "");
        assert_eq!(parse_song_file(&content).unwrap().song.year, 0);
    }

    #[test]
    fn rejects_missing_required_field() {
        let content = KENYA.replace("\"title\": \"Kenya\", ", "");
        assert!(matches!(
            parse_song_file(&content),
            Err(TransformError::InvalidRecord(_))
        ));
    }

    #[test]
    fn rejects_blank_song_id() {
        let content = KENYA.replace("SOSVHAP12AB017D5FD", " ");
        assert!(matches!(
            parse_song_file(&content),
            Err(TransformError::MissingField("song_id"))
        ));
    }

    #[test]
    fn rejects_malformed_and_empty_files() {
        assert!(matches!(
            parse_song_file("{\"song_id\": "),
            Err(TransformError::Json { .. })
        ));
        assert!(matches!(
            parse_song_file("  \n"),
            Err(TransformError::Empty)
        ));
    }
}
